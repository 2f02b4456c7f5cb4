/// Errors that can occur in the relay-assisted OT.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum OTCoreError {
    #[error("message length {actual} does not match pad length {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

fn xor(a: &[u8], b: &[u8]) -> Result<Vec<u8>, OTCoreError> {
    if a.len() != b.len() {
        return Err(OTCoreError::LengthMismatch {
            expected: b.len(),
            actual: a.len(),
        });
    }

    Ok(a.iter().zip(b).map(|(a, b)| a ^ b).collect())
}

/// Masks both messages of the sender.
///
/// Returns `[m0 ^ r0, m1 ^ r1]`, or `[m0 ^ r1, m1 ^ r0]` when `flip` is set.
///
/// # Arguments
///
/// * `msgs` - The messages `m0` and `m1`.
/// * `pads` - The pads `r0` and `r1` from the relay.
/// * `flip` - The receiver's flip bit `e = b ^ d`.
pub fn mask(msgs: [&[u8]; 2], pads: &[Vec<u8>; 2], flip: bool) -> Result<[Vec<u8>; 2], OTCoreError> {
    let [m0, m1] = msgs;
    let (p0, p1) = if flip {
        (&pads[1], &pads[0])
    } else {
        (&pads[0], &pads[1])
    };

    Ok([xor(m0, p0)?, xor(m1, p1)?])
}

/// Unmasks the chosen message.
///
/// # Arguments
///
/// * `masked` - The masked messages from the sender.
/// * `choice` - The receiver's choice bit `b`.
/// * `pad` - The pad `r_d` from the relay.
pub fn unmask(masked: &[Vec<u8>; 2], choice: bool, pad: &[u8]) -> Result<Vec<u8>, OTCoreError> {
    xor(&masked[choice as usize], pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;
    use rstest::*;

    use crate::{test::assert_ot, PadPair};

    #[rstest]
    #[case(false, false)]
    #[case(false, true)]
    #[case(true, false)]
    #[case(true, true)]
    fn test_transfer(#[case] choice: bool, #[case] d: bool) {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let pads = PadPair::random(&mut rng, 17);
        let msgs = [vec![0xaa; 17], vec![0x55; 17]];

        let masked = mask([&msgs[0], &msgs[1]], pads.pads(), choice ^ d).unwrap();
        let received = unmask(&masked, choice, &pads.pads()[d as usize]).unwrap();

        assert_ot(&[choice], &[msgs], &[received]);
    }

    #[test]
    fn test_masked_messages_hide_both() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let pads = PadPair::random(&mut rng, 8);
        let msgs = [vec![1; 8], vec![2; 8]];

        let masked = mask([&msgs[0], &msgs[1]], pads.pads(), false).unwrap();

        assert_ne!(masked[0], msgs[0]);
        assert_ne!(masked[1], msgs[1]);
    }

    #[test]
    fn test_length_mismatch() {
        let pads = PadPair::new(vec![0; 4], vec![0; 4]);

        assert_eq!(
            mask([&[1u8, 2][..], &[3, 4, 5, 6][..]], pads.pads(), false),
            Err(OTCoreError::LengthMismatch {
                expected: 4,
                actual: 2
            })
        );
        assert!(unmask(&[vec![0; 4], vec![0; 3]], true, &[0; 4]).is_err());
    }
}
