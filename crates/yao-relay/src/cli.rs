use clap::Parser;

/// Fields loaded from the command line when launching the relay.
#[derive(Clone, Debug, Default, Parser)]
#[clap(name = "yao-relay", about = "Mailbox relay for two-party garbled circuit sessions")]
pub struct CliFields {
    /// Configuration file location
    #[clap(long)]
    pub config_file: Option<String>,

    /// Port to listen on
    #[clap(long)]
    pub port: Option<u16>,

    /// Log verbosity level
    #[clap(long)]
    pub log_level: Option<String>,
}
