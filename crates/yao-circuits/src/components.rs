//! Circuit components.

use serde::{Deserialize, Serialize};

/// A binary gate.
///
/// Wires are referenced by their index in the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gate {
    /// XOR gate.
    Xor {
        /// First input wire.
        x: usize,
        /// Second input wire.
        y: usize,
        /// Output wire.
        z: usize,
    },
    /// AND gate.
    And {
        /// First input wire.
        x: usize,
        /// Second input wire.
        y: usize,
        /// Output wire.
        z: usize,
    },
    /// Inverter gate.
    Inv {
        /// Input wire.
        x: usize,
        /// Output wire.
        z: usize,
    },
}

impl Gate {
    /// Returns the type of the gate.
    pub fn gate_type(&self) -> GateType {
        match self {
            Gate::Xor { .. } => GateType::Xor,
            Gate::And { .. } => GateType::And,
            Gate::Inv { .. } => GateType::Inv,
        }
    }

    /// Returns the first input wire.
    pub fn x(&self) -> usize {
        match self {
            Gate::Xor { x, .. } | Gate::And { x, .. } | Gate::Inv { x, .. } => *x,
        }
    }

    /// Returns the second input wire, if the gate has one.
    pub fn y(&self) -> Option<usize> {
        match self {
            Gate::Xor { y, .. } | Gate::And { y, .. } => Some(*y),
            Gate::Inv { .. } => None,
        }
    }

    /// Returns the output wire.
    pub fn z(&self) -> usize {
        match self {
            Gate::Xor { z, .. } | Gate::And { z, .. } | Gate::Inv { z, .. } => *z,
        }
    }

    /// Returns the input wires of the gate.
    pub fn inputs(&self) -> impl Iterator<Item = usize> {
        std::iter::once(self.x()).chain(self.y())
    }
}

/// Type of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum GateType {
    Xor,
    And,
    Inv,
}
