//! Relay-assisted oblivious transfer.
//!
//! See [`yao_ot_core`] for the protocol.

use async_trait::async_trait;
use tracing::instrument;
use yao_common::{OtRandomness, Rendezvous};
use yao_core::Label;
use yao_ot_core::{mask, unmask, TransferId};

use crate::{OTError, OTReceiver, OTReceiverOutput, OTSender, OTSenderOutput};

/// Relay-assisted OT sender.
#[derive(Debug, Clone)]
pub struct Sender {
    transport: Rendezvous,
}

impl Sender {
    /// Creates a new sender.
    pub fn new(transport: Rendezvous) -> Self {
        Self { transport }
    }

    /// Sends one of two byte strings of equal length.
    #[instrument(level = "debug", skip_all, fields(id = %id), err)]
    pub async fn send_bytes(&self, id: &TransferId, msgs: [&[u8]; 2]) -> Result<(), OTError> {
        if msgs[0].len() != msgs[1].len() {
            return Err(OTError::length(format!(
                "messages have different lengths: {} and {}",
                msgs[0].len(),
                msgs[1].len()
            )));
        }

        let pads = match self.transport.oblv(id.as_str(), msgs[0].len()).await? {
            OtRandomness::Sender { pads } => pads,
            OtRandomness::Receiver { .. } => {
                return Err(OTError::randomness(format!(
                    "sender of {id} got receiver randomness"
                )))
            }
        };

        let flip: bool = self.transport.fetch(&id.flip_tag()).await?;
        let masked = mask(msgs, &pads, flip)?;
        self.transport.publish(&id.masked_tag(), &masked).await?;

        Ok(())
    }
}

#[async_trait]
impl OTSender<Label> for Sender {
    type Error = OTError;

    async fn send_ot(&self, id: TransferId, msgs: [Label; 2]) -> Result<OTSenderOutput, Self::Error> {
        let [zero, one] = msgs.map(|msg| msg.to_bytes());
        self.send_bytes(&id, [&zero, &one]).await?;

        Ok(OTSenderOutput { id })
    }
}

/// Relay-assisted OT receiver.
#[derive(Debug, Clone)]
pub struct Receiver {
    transport: Rendezvous,
}

impl Receiver {
    /// Creates a new receiver.
    pub fn new(transport: Rendezvous) -> Self {
        Self { transport }
    }

    /// Receives the chosen byte string of length `len`.
    #[instrument(level = "debug", skip_all, fields(id = %id), err)]
    pub async fn receive_bytes(
        &self,
        id: &TransferId,
        choice: bool,
        len: usize,
    ) -> Result<Vec<u8>, OTError> {
        let (d, pad) = match self.transport.oblv(id.as_str(), len).await? {
            OtRandomness::Receiver { choice, pad } => (choice, pad),
            OtRandomness::Sender { .. } => {
                return Err(OTError::randomness(format!(
                    "receiver of {id} got sender randomness"
                )))
            }
        };

        self.transport.publish(&id.flip_tag(), &(choice ^ d)).await?;
        let masked: [Vec<u8>; 2] = self.transport.fetch(&id.masked_tag()).await?;

        Ok(unmask(&masked, choice, &pad)?)
    }
}

#[async_trait]
impl OTReceiver<bool, Label> for Receiver {
    type Error = OTError;

    async fn receive_ot(
        &self,
        id: TransferId,
        choice: bool,
    ) -> Result<OTReceiverOutput<Label>, Self::Error> {
        let bytes = self.receive_bytes(&id, choice, Label::LEN).await?;
        let msg = Label::from_bytes(&bytes)?;

        Ok(OTReceiverOutput { id, msg })
    }
}
