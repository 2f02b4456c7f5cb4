use std::{collections::BTreeMap, ops::Range};

use rand::{CryptoRng, Rng};
use yao_circuits::{Circuit, Gate};
use yao_core::{Delta, GateCipher, HashCipher, Label};

use crate::circuit::{EncryptedGate, GarbledGate};

/// Errors that can occur during garbled circuit generation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum GeneratorError {
    #[error("no labels for wire {0}")]
    MissingLabels(usize),
    #[error("invalid gate id {gid}, circuit has {count} gates")]
    InvalidGate { gid: usize, count: usize },
    #[error("no label provided for output wire {0}")]
    MissingOutput(usize),
    #[error("label for output wire {0} matches neither of its labels")]
    UnknownOutputLabel(usize),
}

/// Computes the encrypted table of an AND gate.
#[inline]
pub(crate) fn and_gate<C: GateCipher>(
    cipher: &C,
    x: &[Label; 2],
    y: &[Label; 2],
    z: &[Label; 2],
    gid: usize,
) -> EncryptedGate {
    let mut rows = [Label::ZERO; 4];
    for a in 0..2 {
        for b in 0..2 {
            let (ka, kb) = (&x[a], &y[b]);
            let row = 2 * ka.pointer() as usize + kb.pointer() as usize;
            rows[row] = cipher.encrypt(ka, kb, gid, &z[a & b]);
        }
    }

    EncryptedGate::new(rows)
}

/// The labels of every wire of a circuit.
///
/// Satisfies `label(w, 1) = label(w, 0) ^ delta` for every wire `w`, and the
/// two labels of a wire always carry opposite pointer bits.
#[derive(Clone)]
pub struct WireLabels {
    delta: Delta,
    labels: Vec<Option<[Label; 2]>>,
}

opaque_debug::implement!(WireLabels);

impl WireLabels {
    /// Generates labels for every wire of a circuit.
    ///
    /// Inputs and AND outputs get fresh random labels, XOR outputs are the
    /// XOR of their inputs and INV outputs swap the labels of their input.
    pub fn generate<R: Rng + CryptoRng + ?Sized>(
        circ: &Circuit,
        rng: &mut R,
    ) -> Result<Self, GeneratorError> {
        let delta = Delta::random(rng);
        let mut labels = Self {
            delta,
            labels: vec![None; circ.wire_count()],
        };

        for wire in circ.inputs() {
            let low = Label::random(rng);
            labels.labels[*wire] = Some([low, low ^ delta]);
        }

        for gate in circ.gates() {
            let pair = match *gate {
                Gate::Xor { x, y, .. } => {
                    let low = labels.pair(x)?[0] ^ labels.pair(y)?[0];
                    [low, low ^ delta]
                }
                Gate::And { .. } => {
                    let low = Label::random(rng);
                    [low, low ^ delta]
                }
                Gate::Inv { x, .. } => {
                    let [low, high] = *labels.pair(x)?;
                    [high, low]
                }
            };
            labels.labels[gate.z()] = Some(pair);
        }

        Ok(labels)
    }

    /// Returns the global offset.
    pub fn delta(&self) -> Delta {
        self.delta
    }

    /// Returns the labels of a wire.
    pub fn pair(&self, wire: usize) -> Result<&[Label; 2], GeneratorError> {
        self.labels
            .get(wire)
            .and_then(Option::as_ref)
            .ok_or(GeneratorError::MissingLabels(wire))
    }

    /// Returns the label encoding `bit` on a wire.
    pub fn label(&self, wire: usize, bit: bool) -> Result<Label, GeneratorError> {
        self.pair(wire).map(|pair| pair[bit as usize])
    }

    /// Returns an iterator over the wires which have labels.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Label; 2])> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(wire, pair)| pair.as_ref().map(|pair| (wire, pair)))
    }

    /// Decodes the label of a wire to the bit it encodes.
    ///
    /// Labels are compared by payload, the pointer bit is ignored.
    pub fn decode(&self, wire: usize, label: &Label) -> Result<bool, GeneratorError> {
        let [low, high] = self.pair(wire)?;
        if label.payload_eq(low) {
            Ok(false)
        } else if label.payload_eq(high) {
            Ok(true)
        } else {
            Err(GeneratorError::UnknownOutputLabel(wire))
        }
    }

    /// Decodes the output labels reported by the evaluator, in output order.
    pub fn decode_outputs(
        &self,
        circ: &Circuit,
        outputs: &BTreeMap<usize, Label>,
    ) -> Result<Vec<bool>, GeneratorError> {
        circ.outputs()
            .iter()
            .map(|wire| {
                let label = outputs
                    .get(wire)
                    .ok_or(GeneratorError::MissingOutput(*wire))?;
                self.decode(*wire, label)
            })
            .collect()
    }
}

/// Garbled circuit generator.
#[derive(Debug)]
pub struct Generator<'a, C = HashCipher> {
    circ: &'a Circuit,
    labels: &'a WireLabels,
    cipher: C,
}

impl<'a> Generator<'a> {
    /// Creates a new generator.
    pub fn new(circ: &'a Circuit, labels: &'a WireLabels) -> Self {
        Self::with_cipher(circ, labels, HashCipher)
    }
}

impl<'a, C: GateCipher> Generator<'a, C> {
    /// Creates a new generator using the provided cipher.
    pub fn with_cipher(circ: &'a Circuit, labels: &'a WireLabels, cipher: C) -> Self {
        Self {
            circ,
            labels,
            cipher,
        }
    }

    /// Garbles a single gate.
    pub fn garble_gate(&self, gid: usize) -> Result<GarbledGate, GeneratorError> {
        let gate = self
            .circ
            .gates()
            .get(gid)
            .ok_or(GeneratorError::InvalidGate {
                gid,
                count: self.circ.gates().len(),
            })?;

        Ok(match *gate {
            Gate::Xor { .. } => GarbledGate::Xor,
            Gate::Inv { .. } => GarbledGate::Inv,
            Gate::And { x, y, z } => GarbledGate::And(and_gate(
                &self.cipher,
                self.labels.pair(x)?,
                self.labels.pair(y)?,
                self.labels.pair(z)?,
                gid,
            )),
        })
    }

    /// Returns an iterator over the garbled gates in `range`.
    pub fn garble(&self, range: Range<usize>) -> GarbledGateIter<'_, 'a, C> {
        GarbledGateIter {
            generator: self,
            range,
        }
    }

    /// Garbles every gate of the circuit.
    pub fn garble_all(&self) -> Result<Vec<GarbledGate>, GeneratorError> {
        self.garble(0..self.circ.gates().len()).collect()
    }
}

/// Iterator over garbled gates.
///
/// Returned by [`Generator::garble`].
#[derive(Debug)]
pub struct GarbledGateIter<'g, 'a, C> {
    generator: &'g Generator<'a, C>,
    range: Range<usize>,
}

impl<'g, 'a, C: GateCipher> Iterator for GarbledGateIter<'g, 'a, C> {
    type Item = Result<GarbledGate, GeneratorError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.range
            .next()
            .map(|gid| self.generator.garble_gate(gid))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}
