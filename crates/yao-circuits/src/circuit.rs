use serde::{Deserialize, Serialize};

use crate::components::{Gate, GateType};

/// An error that can occur when building or evaluating a circuit.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CircuitError {
    #[error("wire {wire} out of range, circuit has {wire_count} wires")]
    WireOutOfRange { wire: usize, wire_count: usize },
    #[error("wire {wire} is read by gate {gid} before it is set")]
    UninitializedWire { gid: usize, wire: usize },
    #[error("output wire {0} is never set")]
    UninitializedOutput(usize),
    #[error("circuit has an odd number of inputs: {0}")]
    OddInputCount(usize),
    #[error("invalid number of inputs: expected {0}, got {1}")]
    InvalidInputCount(usize, usize),
}

/// A binary circuit.
///
/// The first half of [`Circuit::inputs`] belongs to the garbler, the second
/// half to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    name: Option<String>,
    wire_count: usize,
    inputs: Vec<usize>,
    outputs: Vec<usize>,
    gates: Vec<Gate>,
    and_count: usize,
    xor_count: usize,
}

impl Circuit {
    /// Creates a new circuit.
    ///
    /// # Arguments
    ///
    /// * `name` - An optional name of the circuit, usually its file stem.
    /// * `wire_count` - Total number of wires.
    /// * `inputs` - Input wires, garbler inputs first.
    /// * `outputs` - Output wires, in output order.
    /// * `gates` - Gates in topological order.
    pub fn new(
        name: Option<String>,
        wire_count: usize,
        inputs: Vec<usize>,
        outputs: Vec<usize>,
        gates: Vec<Gate>,
    ) -> Result<Self, CircuitError> {
        if inputs.len() % 2 != 0 {
            return Err(CircuitError::OddInputCount(inputs.len()));
        }

        let check = |wire: usize| {
            if wire >= wire_count {
                Err(CircuitError::WireOutOfRange { wire, wire_count })
            } else {
                Ok(wire)
            }
        };

        let mut set = vec![false; wire_count];
        for wire in &inputs {
            set[check(*wire)?] = true;
        }

        let mut and_count = 0;
        let mut xor_count = 0;
        for (gid, gate) in gates.iter().enumerate() {
            for wire in gate.inputs() {
                if !set[check(wire)?] {
                    return Err(CircuitError::UninitializedWire { gid, wire });
                }
            }
            set[check(gate.z())?] = true;

            match gate.gate_type() {
                GateType::And => and_count += 1,
                GateType::Xor => xor_count += 1,
                GateType::Inv => {}
            }
        }

        for wire in &outputs {
            if !set[check(*wire)?] {
                return Err(CircuitError::UninitializedOutput(*wire));
            }
        }

        Ok(Self {
            name,
            wire_count,
            inputs,
            outputs,
            gates,
            and_count,
            xor_count,
        })
    }

    /// Returns the name of the circuit.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the total number of wires.
    pub fn wire_count(&self) -> usize {
        self.wire_count
    }

    /// Returns the input wires.
    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }

    /// Returns the input wires supplied by the garbler.
    pub fn garbler_inputs(&self) -> &[usize] {
        &self.inputs[..self.inputs.len() / 2]
    }

    /// Returns the input wires supplied by the evaluator.
    pub fn evaluator_inputs(&self) -> &[usize] {
        &self.inputs[self.inputs.len() / 2..]
    }

    /// Returns the output wires.
    pub fn outputs(&self) -> &[usize] {
        &self.outputs
    }

    /// Returns the gates.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Returns the number of AND gates.
    pub fn and_count(&self) -> usize {
        self.and_count
    }

    /// Returns the number of XOR gates.
    pub fn xor_count(&self) -> usize {
        self.xor_count
    }

    /// Evaluates the circuit in plaintext.
    ///
    /// # Arguments
    ///
    /// * `values` - One bit per input wire, garbler inputs first.
    pub fn evaluate(&self, values: &[bool]) -> Result<Vec<bool>, CircuitError> {
        if values.len() != self.inputs.len() {
            return Err(CircuitError::InvalidInputCount(
                self.inputs.len(),
                values.len(),
            ));
        }

        // Wires are checked to be set before use in `Circuit::new`.
        let mut wires = vec![false; self.wire_count];
        for (wire, value) in self.inputs.iter().zip(values) {
            wires[*wire] = *value;
        }

        for gate in &self.gates {
            match *gate {
                Gate::Xor { x, y, z } => wires[z] = wires[x] ^ wires[y],
                Gate::And { x, y, z } => wires[z] = wires[x] & wires[y],
                Gate::Inv { x, z } => wires[z] = !wires[x],
            }
        }

        Ok(self.outputs.iter().map(|wire| wires[*wire]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_adder() -> Circuit {
        Circuit::new(
            None,
            4,
            vec![0, 1],
            vec![2, 3],
            vec![Gate::Xor { x: 0, y: 1, z: 2 }, Gate::And { x: 0, y: 1, z: 3 }],
        )
        .unwrap()
    }

    #[test]
    fn test_evaluate() {
        let circ = half_adder();

        assert_eq!(circ.evaluate(&[true, true]).unwrap(), vec![false, true]);
        assert_eq!(circ.evaluate(&[true, false]).unwrap(), vec![true, false]);
        assert_eq!(
            circ.evaluate(&[true]),
            Err(CircuitError::InvalidInputCount(2, 1))
        );
    }

    #[test]
    fn test_input_halves() {
        let circ = half_adder();

        assert_eq!(circ.garbler_inputs(), &[0]);
        assert_eq!(circ.evaluator_inputs(), &[1]);
        assert_eq!(circ.and_count(), 1);
        assert_eq!(circ.xor_count(), 1);
    }

    #[test]
    fn test_uninitialized_wire() {
        let err = Circuit::new(
            None,
            4,
            vec![0, 1],
            vec![3],
            vec![Gate::And { x: 0, y: 2, z: 3 }],
        )
        .unwrap_err();

        assert_eq!(err, CircuitError::UninitializedWire { gid: 0, wire: 2 });
    }

    #[test]
    fn test_wire_out_of_range() {
        let err = Circuit::new(None, 2, vec![0, 1], vec![1], vec![Gate::Inv { x: 0, z: 2 }])
            .unwrap_err();

        assert_eq!(
            err,
            CircuitError::WireOutOfRange {
                wire: 2,
                wire_count: 2
            }
        );
    }

    #[test]
    fn test_odd_inputs() {
        let err = Circuit::new(None, 3, vec![0, 1, 2], vec![2], vec![]).unwrap_err();

        assert_eq!(err, CircuitError::OddInputCount(3));
    }
}
