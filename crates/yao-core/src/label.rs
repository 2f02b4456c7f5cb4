//! Wire labels.

use core::{
    fmt,
    ops::{BitXor, BitXorAssign},
    str::FromStr,
};

use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};

/// Errors that can occur when decoding a label.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum LabelError {
    #[error("invalid label length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid pointer byte: {0}")]
    InvalidPointer(u8),
    #[error("invalid label encoding: {0}")]
    InvalidEncoding(String),
}

/// A wire label.
///
/// A label is a 128-bit payload paired with a single pointer bit. The pointer
/// bit is the point-and-permute bit: the two labels of a wire always carry
/// opposite pointers, so an evaluator holding one label can select a garbled
/// row without learning which truth value it stands for.
///
/// XOR acts on the payload and the pointer together.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Label {
    payload: [u8; 16],
    pointer: bool,
}

impl Label {
    /// Length of the payload in bits.
    pub const BITS: usize = 128;
    /// Length of the payload in bytes.
    pub const PAYLOAD_LEN: usize = Self::BITS / 8;
    /// Length of the canonical byte encoding, payload followed by a pointer
    /// byte.
    pub const LEN: usize = Self::PAYLOAD_LEN + 1;
    /// The all-zero label with pointer `0`.
    pub const ZERO: Self = Self {
        payload: [0; 16],
        pointer: false,
    };

    const POINTER_MARKER: &'static str = ":p";

    /// Creates a new label.
    #[inline]
    pub fn new(payload: [u8; 16], pointer: bool) -> Self {
        Self { payload, pointer }
    }

    /// Generates a random label.
    #[inline]
    pub fn random<R: Rng + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.gen(), rng.gen())
    }

    /// Returns the payload.
    #[inline]
    pub fn payload(&self) -> &[u8; 16] {
        &self.payload
    }

    /// Returns the pointer bit.
    #[inline]
    pub fn pointer(&self) -> bool {
        self.pointer
    }

    /// Returns the label with its pointer bit replaced.
    #[inline]
    pub fn with_pointer(mut self, pointer: bool) -> Self {
        self.pointer = pointer;
        self
    }

    /// Sets the pointer bit.
    #[inline]
    pub fn set_pointer(&mut self, pointer: bool) {
        self.pointer = pointer;
    }

    /// Returns the canonical byte encoding of the label.
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut bytes = [0u8; Self::LEN];
        bytes[..Self::PAYLOAD_LEN].copy_from_slice(&self.payload);
        bytes[Self::PAYLOAD_LEN] = self.pointer as u8;
        bytes
    }

    /// Decodes a label from its canonical byte encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LabelError> {
        if bytes.len() != Self::LEN {
            return Err(LabelError::InvalidLength {
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }

        let pointer = match bytes[Self::PAYLOAD_LEN] {
            0 => false,
            1 => true,
            byte => return Err(LabelError::InvalidPointer(byte)),
        };

        let mut payload = [0u8; 16];
        payload.copy_from_slice(&bytes[..Self::PAYLOAD_LEN]);

        Ok(Self::new(payload, pointer))
    }

    /// Returns `true` if both labels have the same payload, ignoring the
    /// pointer bit.
    #[inline]
    pub fn payload_eq(&self, other: &Self) -> bool {
        self.payload == other.payload
    }
}

impl BitXor for Label {
    type Output = Self;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Self {
            payload: std::array::from_fn(|i| self.payload[i] ^ rhs.payload[i]),
            pointer: self.pointer ^ rhs.pointer,
        }
    }
}

impl BitXor<&Label> for &Label {
    type Output = Label;

    #[inline]
    fn bitxor(self, rhs: &Label) -> Self::Output {
        *self ^ *rhs
    }
}

impl BitXor<Delta> for Label {
    type Output = Self;

    #[inline]
    fn bitxor(self, rhs: Delta) -> Self::Output {
        self ^ rhs.0
    }
}

impl BitXorAssign for Label {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            hex::encode(self.payload),
            Self::POINTER_MARKER,
            self.pointer as u8
        )
    }
}

impl FromStr for Label {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (payload, pointer) = s
            .rsplit_once(Self::POINTER_MARKER)
            .ok_or_else(|| LabelError::InvalidEncoding(format!("missing pointer marker: {s}")))?;

        let pointer = match pointer {
            "0" => false,
            "1" => true,
            other => {
                return Err(LabelError::InvalidEncoding(format!(
                    "invalid pointer: {other}"
                )))
            }
        };

        let mut bytes = [0u8; 16];
        hex::decode_to_slice(payload, &mut bytes)
            .map_err(|err| LabelError::InvalidEncoding(err.to_string()))?;

        Ok(Self::new(bytes, pointer))
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for Label {
    type Error = LabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Global offset of a garbled circuit.
///
/// The pointer bit of the offset is always set, so XORing a label with the
/// offset flips its pointer.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Delta(Label);

opaque_debug::implement!(Delta);

impl Delta {
    /// Creates a new offset, forcing its pointer bit to `1`.
    #[inline]
    pub fn new(label: Label) -> Self {
        Self(label.with_pointer(true))
    }

    /// Generates a random offset.
    #[inline]
    pub fn random<R: Rng + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self::new(Label::random(rng))
    }

    /// Returns the offset as a label.
    #[inline]
    pub fn as_label(&self) -> &Label {
        &self.0
    }

    /// Returns the offset as a label.
    #[inline]
    pub fn into_inner(self) -> Label {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::*;

    #[fixture]
    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    #[rstest]
    fn test_label_xor(mut rng: StdRng) {
        let a = Label::random(&mut rng);
        let b = Label::random(&mut rng);

        let c = a ^ b;

        assert_eq!(c ^ b, a);
        assert_eq!(c.pointer(), a.pointer() ^ b.pointer());
        assert_eq!(a ^ a, Label::ZERO);
    }

    #[rstest]
    fn test_delta_flips_pointer(mut rng: StdRng) {
        let delta = Delta::random(&mut rng);
        let label = Label::random(&mut rng);

        assert!(delta.as_label().pointer());
        assert_eq!((label ^ delta).pointer(), !label.pointer());
        assert_eq!(label ^ delta ^ delta, label);
    }

    #[rstest]
    fn test_label_string(mut rng: StdRng) {
        let label = Label::random(&mut rng);
        let s = label.to_string();

        assert_eq!(s.len(), 35);
        assert!(s.ends_with(&format!(":p{}", label.pointer() as u8)));
        assert_eq!(s.parse::<Label>().unwrap(), label);
    }

    #[rstest]
    fn test_label_strings_differ_only_in_marker(mut rng: StdRng) {
        let label = Label::random(&mut rng);
        let flipped = label.with_pointer(!label.pointer());

        let (a, b) = (label.to_string(), flipped.to_string());

        assert_ne!(a, b);
        assert_eq!(&a[..a.len() - 3], &b[..b.len() - 3]);
        assert!(label.payload_eq(&flipped));
    }

    #[rstest]
    #[case::no_marker("00112233445566778899aabbccddeeff")]
    #[case::bad_pointer("00112233445566778899aabbccddeeff:p2")]
    #[case::short_payload("0011:p1")]
    #[case::not_hex("zz112233445566778899aabbccddeeff:p0")]
    fn test_label_string_invalid(#[case] s: &str) {
        assert!(matches!(
            s.parse::<Label>(),
            Err(LabelError::InvalidEncoding(_))
        ));
    }

    #[rstest]
    fn test_label_bytes(mut rng: StdRng) {
        let label = Label::random(&mut rng);
        let bytes = label.to_bytes();

        assert_eq!(bytes[16], label.pointer() as u8);
        assert_eq!(Label::from_bytes(&bytes).unwrap(), label);

        let mut bad = bytes;
        bad[16] = 7;
        assert_eq!(Label::from_bytes(&bad), Err(LabelError::InvalidPointer(7)));
        assert_eq!(
            Label::from_bytes(&bytes[..3]),
            Err(LabelError::InvalidLength {
                expected: 17,
                actual: 3
            })
        );
    }

    #[rstest]
    fn test_label_serde_is_canonical_string(mut rng: StdRng) {
        let label = Label::random(&mut rng);

        let bytes = bincode::serialize(&label).unwrap();
        let decoded: String = bincode::deserialize(&bytes).unwrap();

        assert_eq!(decoded, label.to_string());
        assert_eq!(bincode::deserialize::<Label>(&bytes).unwrap(), label);
    }
}
