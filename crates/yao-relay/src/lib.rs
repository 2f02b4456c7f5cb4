//! Relay service for two-party garbled circuit sessions.
//!
//! The relay assigns the garbler and evaluator roles, stores and forwards
//! tagged mailbox values between the parties and serves correlated
//! randomness for oblivious transfer. It never interprets mailbox values.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

mod cli;
mod config;
mod error;
pub mod mailbox;
mod relay_tracing;
mod server;
pub mod session;
mod util;

pub use cli::CliFields;
pub use config::{LogFormat, LogProperties, RelayProperties};
pub use error::RelayError;
pub use relay_tracing::init_tracing;
pub use server::{run_server, Relay, RelayHandle, SHUTDOWN_REASON};
pub use session::{Phase, Session, SessionError};
pub use util::parse_config_file;
