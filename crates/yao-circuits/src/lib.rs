//! Boolean circuits for garbling.
//!
//! Circuits are made of XOR, AND and INV gates and are loaded from the
//! Bristol format.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]

mod circuit;
pub mod components;
mod parse;

pub use circuit::{Circuit, CircuitError};
pub use components::{Gate, GateType};
pub use parse::ParseError;
