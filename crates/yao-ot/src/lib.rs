//! Oblivious transfer over the relay.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

mod error;
pub mod relay;

use async_trait::async_trait;

pub use error::OTError;
pub use yao_ot_core::TransferId;

/// Output the sender receives from the OT functionality.
#[derive(Debug)]
pub struct OTSenderOutput {
    /// Transfer id.
    pub id: TransferId,
}

/// Oblivious transfer sender.
#[async_trait]
pub trait OTSender<T> {
    /// Error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends one of two messages.
    ///
    /// # Arguments
    ///
    /// * `id` - Transfer id, shared with the receiver.
    /// * `msgs` - Messages to send.
    async fn send_ot(&self, id: TransferId, msgs: [T; 2]) -> Result<OTSenderOutput, Self::Error>;
}

/// Output the receiver receives from the OT functionality.
#[derive(Debug)]
pub struct OTReceiverOutput<T> {
    /// Transfer id.
    pub id: TransferId,
    /// Chosen message.
    pub msg: T,
}

/// Oblivious transfer receiver.
#[async_trait]
pub trait OTReceiver<T, U> {
    /// Error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Receives the chosen message.
    ///
    /// # Arguments
    ///
    /// * `id` - Transfer id, shared with the sender.
    /// * `choice` - OT choice.
    async fn receive_ot(&self, id: TransferId, choice: T) -> Result<OTReceiverOutput<U>, Self::Error>;
}
