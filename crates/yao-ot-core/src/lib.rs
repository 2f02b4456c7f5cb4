//! Core components of the relay-assisted oblivious transfer.
//!
//! A relay hands the sender a pair of random pads `(r0, r1)` and the receiver
//! a random bit `d` together with `r_d`. The receiver with choice `b` sends
//! `e = b ^ d` to the sender, which replies with both messages masked by the
//! pads, swapped when `e` is set. The receiver unmasks its message with `r_d`.
//!
//! The relay learns nothing about the messages, but a relay which colludes
//! with either party breaks the transfer.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]

mod cache;
mod transfer;
#[cfg(any(test, feature = "test-utils"))]
pub mod test;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use cache::{PadCache, PadPair};
pub use transfer::{mask, unmask, OTCoreError};

/// A transfer id.
///
/// Both parties derive the same id for a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId(String);

impl TransferId {
    /// Creates a new transfer id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Mailbox tag of the receiver's flip bit `e = b ^ d`.
    pub fn flip_tag(&self) -> String {
        format!("{}:flip", self.0)
    }

    /// Mailbox tag of the sender's masked messages.
    pub fn masked_tag(&self) -> String {
        format!("{}:masked", self.0)
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
