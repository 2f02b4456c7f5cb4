use std::{collections::BTreeMap, ops::Range};

use yao_circuits::{Circuit, Gate, GateType};
use yao_core::{GateCipher, HashCipher, Label};

use crate::circuit::{EncryptedGate, GarbledGate};

/// Errors that can occur during garbled circuit evaluation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum EvaluatorError {
    #[error("invalid input wire: {0}")]
    InvalidInput(usize),
    #[error("no active label for wire {0}")]
    MissingLabel(usize),
    #[error("invalid gate id {gid}, circuit has {count} gates")]
    InvalidGate { gid: usize, count: usize },
    #[error("gate {gid} is {expected:?} but its garbled gate is {actual:?}")]
    GateMismatch {
        gid: usize,
        expected: GateType,
        actual: GateType,
    },
    #[error("garbled table has {actual} gates, circuit has {expected}")]
    TableLength { expected: usize, actual: usize },
}

/// Decrypts the output label of an AND gate.
///
/// The row is selected by the pointer bits of the input labels, the cipher
/// does not tell whether the right row was used.
#[inline]
pub(crate) fn and_gate<C: GateCipher>(
    cipher: &C,
    x: &Label,
    y: &Label,
    gate: &EncryptedGate,
    gid: usize,
) -> Label {
    let row = 2 * x.pointer() as usize + y.pointer() as usize;
    cipher.decrypt(x, y, gid, &gate[row])
}

/// Garbled circuit evaluator.
#[derive(Debug)]
pub struct Evaluator<'a, C = HashCipher> {
    circ: &'a Circuit,
    cipher: C,
    /// Active label of each wire, if known.
    active: Vec<Option<Label>>,
}

impl<'a> Evaluator<'a> {
    /// Creates a new evaluator.
    ///
    /// # Arguments
    ///
    /// * `circ` - The circuit to evaluate.
    /// * `inputs` - Active labels of the input wires.
    pub fn new(
        circ: &'a Circuit,
        inputs: impl IntoIterator<Item = (usize, Label)>,
    ) -> Result<Self, EvaluatorError> {
        Self::with_cipher(circ, inputs, HashCipher)
    }
}

impl<'a, C: GateCipher> Evaluator<'a, C> {
    /// Creates a new evaluator using the provided cipher.
    pub fn with_cipher(
        circ: &'a Circuit,
        inputs: impl IntoIterator<Item = (usize, Label)>,
        cipher: C,
    ) -> Result<Self, EvaluatorError> {
        let mut active = vec![None; circ.wire_count()];
        for (wire, label) in inputs {
            if !circ.inputs().contains(&wire) {
                return Err(EvaluatorError::InvalidInput(wire));
            }
            active[wire] = Some(label);
        }

        Ok(Self {
            circ,
            cipher,
            active,
        })
    }

    fn get(&self, wire: usize) -> Result<Label, EvaluatorError> {
        self.active
            .get(wire)
            .copied()
            .flatten()
            .ok_or(EvaluatorError::MissingLabel(wire))
    }

    /// Returns the active label of a wire, if it is known.
    pub fn active_label(&self, wire: usize) -> Option<Label> {
        self.active.get(wire).copied().flatten()
    }

    /// Evaluates a single gate.
    pub fn evaluate_gate(&mut self, gid: usize, garbled: &GarbledGate) -> Result<(), EvaluatorError> {
        let gate = *self
            .circ
            .gates()
            .get(gid)
            .ok_or(EvaluatorError::InvalidGate {
                gid,
                count: self.circ.gates().len(),
            })?;

        let z = match (gate, garbled) {
            (Gate::Xor { x, y, .. }, GarbledGate::Xor) => self.get(x)? ^ self.get(y)?,
            (Gate::Inv { x, .. }, GarbledGate::Inv) => self.get(x)?,
            (Gate::And { x, y, .. }, GarbledGate::And(table)) => {
                and_gate(&self.cipher, &self.get(x)?, &self.get(y)?, table, gid)
            }
            _ => {
                return Err(EvaluatorError::GateMismatch {
                    gid,
                    expected: gate.gate_type(),
                    actual: garbled.gate_type(),
                })
            }
        };

        self.active[gate.z()] = Some(z);

        Ok(())
    }

    /// Evaluates the gates in `range`.
    ///
    /// `table` is the garbled table of the whole circuit.
    pub fn evaluate(
        &mut self,
        range: Range<usize>,
        table: &[GarbledGate],
    ) -> Result<(), EvaluatorError> {
        if table.len() != self.circ.gates().len() {
            return Err(EvaluatorError::TableLength {
                expected: self.circ.gates().len(),
                actual: table.len(),
            });
        }

        for gid in range {
            let garbled = table.get(gid).ok_or(EvaluatorError::InvalidGate {
                gid,
                count: table.len(),
            })?;
            self.evaluate_gate(gid, garbled)?;
        }

        Ok(())
    }

    /// Returns the active labels of the output wires.
    pub fn outputs(&self) -> Result<BTreeMap<usize, Label>, EvaluatorError> {
        self.circ
            .outputs()
            .iter()
            .map(|wire| self.get(*wire).map(|label| (*wire, label)))
            .collect()
    }
}
