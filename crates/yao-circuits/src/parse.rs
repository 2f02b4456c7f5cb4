//! Bristol circuit format.
//!
//! Both the classic header
//!
//! ```text
//! <gates> <wires>
//! <n1> <n2> <nout>
//! ```
//!
//! and the Bristol Fashion header
//!
//! ```text
//! <gates> <wires>
//! <niv> <n_1> ... <n_niv>
//! <nov> <m_1> ... <m_nov>
//! ```
//!
//! are accepted. Input wires are the first wires of the circuit, output wires
//! the last.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{
    components::{Gate, GateType},
    Circuit, CircuitError,
};

static GATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<input_count>\d+)\s+(?P<output_count>\d+)\s+(?P<wires>\d+(?:\s+\d+)*)\s+(?P<gate>[A-Za-z]+)$",
    )
    .expect("gate pattern is valid")
});

/// An error that can occur when parsing a circuit.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ParseError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    ParseIntError(#[from] std::num::ParseIntError),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("invalid gate on line {line}: {reason}")]
    InvalidGate { line: usize, reason: String },
    #[error("unsupported gate type: {0}")]
    UnsupportedGateType(String),
    #[error("gate count mismatch: header declares {expected}, found {actual}")]
    GateCount { expected: usize, actual: usize },
    #[error(transparent)]
    CircuitError(#[from] CircuitError),
}

impl Circuit {
    /// Loads a circuit in Bristol format from a file.
    ///
    /// The file stem becomes the name of the circuit.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());

        Self::parse_str(name, &text)
    }

    /// Parses a circuit in Bristol format.
    pub fn parse_str(name: Option<String>, text: &str) -> Result<Self, ParseError> {
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();

        let header_len = lines
            .iter()
            .position(|(_, line)| is_gate_line(line))
            .unwrap_or(lines.len());

        let header: Vec<Vec<usize>> = lines[..header_len]
            .iter()
            .map(|(_, line)| parse_numbers(line))
            .collect::<Result<_, _>>()?;

        let (gate_count, wire_count, input_count, output_count) = match header.as_slice() {
            [counts, io] if counts.len() == 2 && io.len() == 3 => (
                counts[0],
                counts[1],
                sum_counts(&io[..2], "inputs")?,
                io[2],
            ),
            [counts, inputs, outputs] if counts.len() == 2 => (
                counts[0],
                counts[1],
                sum_declared(inputs, "inputs")?,
                sum_declared(outputs, "outputs")?,
            ),
            _ => {
                return Err(ParseError::InvalidHeader(format!(
                    "expected 2 or 3 header lines, found {header_len}"
                )))
            }
        };

        if input_count > wire_count || output_count > wire_count {
            return Err(ParseError::InvalidHeader(format!(
                "{input_count} inputs and {output_count} outputs do not fit in {wire_count} wires"
            )));
        }

        let gates = lines[header_len..]
            .iter()
            .map(|(line, text)| {
                let captures = GATE_PATTERN
                    .captures(text)
                    .ok_or_else(|| ParseError::InvalidGate {
                        line: *line,
                        reason: format!("malformed gate: {text}"),
                    })?;
                UncheckedGate::parse(captures)?.check(*line)
            })
            .collect::<Result<Vec<_>, _>>()?;

        if gates.len() != gate_count {
            return Err(ParseError::GateCount {
                expected: gate_count,
                actual: gates.len(),
            });
        }

        // Every wire is either an input or the output of a gate.
        let max_wires = input_count.checked_add(gate_count);
        if max_wires.map_or(true, |max_wires| wire_count > max_wires) {
            return Err(ParseError::InvalidHeader(format!(
                "{wire_count} wires but only {input_count} inputs and {gate_count} gates"
            )));
        }

        Ok(Circuit::new(
            name,
            wire_count,
            (0..input_count).collect(),
            (wire_count - output_count..wire_count).collect(),
            gates,
        )?)
    }
}

fn is_gate_line(line: &str) -> bool {
    line.split_whitespace()
        .last()
        .map(|token| token.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false)
}

fn parse_numbers(line: &str) -> Result<Vec<usize>, ParseError> {
    Ok(line
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<Vec<usize>, _>>()?)
}

/// Sums a Bristol Fashion count line `<n> <v_1> ... <v_n>`.
fn sum_declared(line: &[usize], what: &str) -> Result<usize, ParseError> {
    match line.split_first() {
        Some((n, values)) if *n == values.len() => sum_counts(values, what),
        _ => Err(ParseError::InvalidHeader(format!(
            "malformed {what} line: {line:?}"
        ))),
    }
}

fn sum_counts(values: &[usize], what: &str) -> Result<usize, ParseError> {
    values
        .iter()
        .try_fold(0usize, |acc, n| acc.checked_add(*n))
        .ok_or_else(|| ParseError::InvalidHeader(format!("{what} count overflows: {values:?}")))
}

struct UncheckedGate {
    input_count: usize,
    output_count: usize,
    wires: Vec<usize>,
    gate_type: GateType,
}

impl UncheckedGate {
    fn parse(captures: Captures) -> Result<Self, ParseError> {
        let input_count: usize = captures["input_count"].parse()?;
        let output_count: usize = captures["output_count"].parse()?;
        let wires = parse_numbers(&captures["wires"])?;
        let gate_type = &captures["gate"];

        let gate_type = match gate_type {
            "XOR" => GateType::Xor,
            "AND" => GateType::And,
            "INV" | "NOT" => GateType::Inv,
            _ => return Err(ParseError::UnsupportedGateType(gate_type.to_string())),
        };

        Ok(Self {
            input_count,
            output_count,
            wires,
            gate_type,
        })
    }

    fn check(self, line: usize) -> Result<Gate, ParseError> {
        let arity = match self.gate_type {
            GateType::Xor | GateType::And => 2,
            GateType::Inv => 1,
        };

        if self.input_count != arity || self.output_count != 1 {
            return Err(ParseError::InvalidGate {
                line,
                reason: format!(
                    "{:?} gate takes {arity} inputs and 1 output, got {} and {}",
                    self.gate_type, self.input_count, self.output_count
                ),
            });
        }

        match (self.gate_type, self.wires.as_slice()) {
            (GateType::Xor, &[x, y, z]) => Ok(Gate::Xor { x, y, z }),
            (GateType::And, &[x, y, z]) => Ok(Gate::And { x, y, z }),
            (GateType::Inv, &[x, z]) => Ok(Gate::Inv { x, z }),
            _ => Err(ParseError::InvalidGate {
                line,
                reason: format!(
                    "expected {} wires, got {}",
                    arity + 1,
                    self.wires.len()
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const ADDER2: &str = include_str!("../circuits/adder2.txt");

    #[test]
    fn test_parse_classic() {
        let circ = Circuit::parse_str(None, "1 3\n1 1 1\n\n2 1 0 1 2 AND\n").unwrap();

        assert_eq!(circ.wire_count(), 3);
        assert_eq!(circ.inputs(), &[0, 1]);
        assert_eq!(circ.outputs(), &[2]);
        assert_eq!(circ.gates(), &[Gate::And { x: 0, y: 1, z: 2 }]);
    }

    #[test]
    fn test_parse_fashion_matches_classic() {
        let classic = Circuit::parse_str(None, ADDER2).unwrap();
        let fashion = Circuit::parse_str(
            None,
            &ADDER2.replacen("2 2 3", "2 2 2\n1 3", 1),
        )
        .unwrap();

        assert_eq!(classic, fashion);
    }

    #[test]
    fn test_parse_adder() {
        let circ = Circuit::parse_str(Some("adder2".to_string()), ADDER2).unwrap();

        assert_eq!(circ.name(), Some("adder2"));
        assert_eq!(circ.gates().len(), 9);
        assert_eq!(circ.and_count(), 3);
        assert_eq!(circ.xor_count(), 4);
        assert_eq!(circ.garbler_inputs(), &[0, 1]);
        assert_eq!(circ.evaluator_inputs(), &[2, 3]);
        assert_eq!(circ.outputs(), &[10, 11, 12]);

        for a in 0..4u8 {
            for b in 0..4u8 {
                let bits = [a & 1, a >> 1, b & 1, b >> 1].map(|bit| bit == 1);
                let out = circ.evaluate(&bits).unwrap();
                let sum = out
                    .iter()
                    .enumerate()
                    .fold(0, |acc, (i, bit)| acc | ((*bit as u8) << i));

                assert_eq!(sum, a + b);
            }
        }
    }

    #[test]
    fn test_parse_not_alias() {
        let circ = Circuit::parse_str(None, "2 4\n1 1 2\n\n1 1 0 2 NOT\n1 1 1 3 INV\n").unwrap();

        assert_eq!(
            circ.gates(),
            &[Gate::Inv { x: 0, z: 2 }, Gate::Inv { x: 1, z: 3 }]
        );
    }

    #[rstest]
    #[case::gate_count("2 3\n1 1 1\n\n2 1 0 1 2 AND\n")]
    #[case::header("1 3\n\n2 1 0 1 2 AND\n")]
    #[case::fashion_header("1 3\n2 1\n1 1\n\n2 1 0 1 2 AND\n")]
    #[case::input_overflow("1 3\n18446744073709551615 1 1\n\n2 1 0 1 2 AND\n")]
    #[case::fashion_input_overflow("1 3\n2 18446744073709551615 1\n1 1\n\n2 1 0 1 2 AND\n")]
    #[case::fashion_output_overflow("1 3\n2 1 1\n2 18446744073709551615 1\n\n2 1 0 1 2 AND\n")]
    #[case::unused_wires("1 18446744073709551615\n1 1 1\n\n2 1 0 1 2 AND\n")]
    fn test_parse_invalid_header(#[case] text: &str) {
        assert!(matches!(
            Circuit::parse_str(None, text),
            Err(ParseError::InvalidHeader(_)) | Err(ParseError::GateCount { .. })
        ));
    }

    #[test]
    fn test_parse_unsupported_gate() {
        let err = Circuit::parse_str(None, "1 3\n1 1 1\n\n2 1 0 1 2 OR\n").unwrap_err();

        assert!(matches!(err, ParseError::UnsupportedGateType(gate) if gate == "OR"));
    }

    #[rstest]
    #[case::arity("1 3\n1 1 1\n\n1 1 0 2 AND\n")]
    #[case::wire_count("1 3\n1 1 1\n\n2 1 0 2 XOR\n")]
    #[case::malformed("1 3\n1 1 1\n\n2 1 0 x 2 XOR\n")]
    fn test_parse_invalid_gate(#[case] text: &str) {
        assert!(matches!(
            Circuit::parse_str(None, text),
            Err(ParseError::InvalidGate { line: 4, .. })
        ));
    }

    #[test]
    fn test_parse_wire_out_of_range() {
        let err = Circuit::parse_str(None, "1 3\n1 1 1\n\n2 1 0 7 2 AND\n").unwrap_err();

        assert!(matches!(
            err,
            ParseError::CircuitError(CircuitError::WireOutOfRange { wire: 7, .. })
        ));
    }

    #[test]
    fn test_parse_odd_inputs() {
        let err = Circuit::parse_str(None, "1 4\n2 1 1\n\n2 1 0 1 3 AND\n").unwrap_err();

        assert!(matches!(
            err,
            ParseError::CircuitError(CircuitError::OddInputCount(3))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Circuit::load("circuits/does-not-exist.txt"),
            Err(ParseError::IOError(_))
        ));
    }
}
