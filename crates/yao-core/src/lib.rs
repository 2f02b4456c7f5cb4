//! Core types for Yao garbled circuits.
//!
//! Provides wire labels with a point-and-permute bit, the global offset used
//! for free-XOR, and the cipher used to encrypt garbled rows.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]

pub mod cipher;
pub mod label;

pub use cipher::{GateCipher, HashCipher};
pub use label::{Delta, Label, LabelError};
