use std::str::FromStr;

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

use crate::{
    config::{LogFormat, RelayProperties},
    RelayError,
};

fn format_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let f = fmt::layer().with_thread_ids(true).with_thread_names(true);
    match format {
        LogFormat::Compact => f.compact().boxed(),
        LogFormat::Json => f.json().boxed(),
    }
}

/// Installs the global tracing subscriber.
pub fn init_tracing(config: &RelayProperties) -> Result<(), RelayError> {
    let directives = match &config.log.filter {
        Some(filter) => filter.clone(),
        None => {
            let level = Level::from_str(&config.log.level)
                .map_err(|err| RelayError::Tracing(err.to_string()))?;
            format!("yao_relay={level},yao_common={level}")
        }
    };
    let filter_layer = EnvFilter::builder()
        .parse(directives)
        .map_err(|err| RelayError::Tracing(err.to_string()))?;

    Registry::default()
        .with(filter_layer)
        .with(format_layer(config.log.format))
        .try_init()
        .map_err(|err| RelayError::Tracing(err.to_string()))?;

    Ok(())
}
