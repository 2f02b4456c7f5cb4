use clap::Parser;
use tracing::debug;
use yao_relay::{init_tracing, run_server, CliFields, RelayError, RelayProperties};

#[tokio::main]
async fn main() -> Result<(), RelayError> {
    let cli_fields = CliFields::parse();
    let config = RelayProperties::new(&cli_fields)?;

    init_tracing(&config)?;

    debug!("Relay config loaded: \n{}", config);

    run_server(&config).await
}
