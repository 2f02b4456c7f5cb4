//! Core components of a Yao garbled circuit protocol.
//!
//! Garbling uses free-XOR: every wire carries two labels which differ by a
//! global offset, so XOR and INV gates need no ciphertext. AND gates are
//! garbled into four encrypted rows ordered by the point-and-permute bits of
//! their input labels.
//!
//! Nothing in this crate performs I/O.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]

pub(crate) mod circuit;
mod evaluator;
mod generator;

pub use circuit::{EncryptedGate, GarbledCircuit, GarbledGate};
pub use evaluator::{Evaluator, EvaluatorError};
pub use generator::{GarbledGateIter, Generator, GeneratorError, WireLabels};
