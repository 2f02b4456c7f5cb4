use std::ops::Index;

use serde::{Deserialize, Serialize};
use yao_circuits::GateType;
use yao_core::Label;

/// A garbled circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarbledCircuit {
    /// Garbled gates, in circuit order.
    pub gates: Vec<GarbledGate>,
}

/// Encrypted truth table of an AND gate.
///
/// Row `2 * p(a) + p(b)` holds the output label encrypted under the input
/// labels `a` and `b`, where `p` is the pointer bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedGate([Label; 4]);

impl EncryptedGate {
    pub(crate) fn new(rows: [Label; 4]) -> Self {
        Self(rows)
    }

    /// Returns the rows of the table.
    pub fn rows(&self) -> &[Label; 4] {
        &self.0
    }

    /// Returns a mutable reference to the rows of the table.
    pub fn rows_mut(&mut self) -> &mut [Label; 4] {
        &mut self.0
    }
}

impl Index<usize> for EncryptedGate {
    type Output = Label;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// A garbled gate.
///
/// XOR and INV gates are free and carry no ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GarbledGate {
    /// Free XOR gate.
    Xor,
    /// Free inverter.
    Inv,
    /// AND gate with its encrypted table.
    And(EncryptedGate),
}

impl GarbledGate {
    /// Returns the type of the gate.
    pub fn gate_type(&self) -> GateType {
        match self {
            GarbledGate::Xor => GateType::Xor,
            GarbledGate::Inv => GateType::Inv,
            GarbledGate::And(_) => GateType::And,
        }
    }

    /// Returns `true` if the gate carries no ciphertext.
    pub fn is_free(&self) -> bool {
        !matches!(self, GarbledGate::And(_))
    }
}
