use std::collections::HashMap;

use rand::{CryptoRng, Rng};
use yao_common::OtRandomness;

/// A pair of random pads `(r0, r1)` of equal length.
#[derive(Clone, PartialEq, Eq)]
pub struct PadPair {
    pads: [Vec<u8>; 2],
}

opaque_debug::implement!(PadPair);

impl PadPair {
    /// Creates a new pad pair.
    pub fn new(r0: Vec<u8>, r1: Vec<u8>) -> Self {
        Self { pads: [r0, r1] }
    }

    /// Draws fresh random pads of `length` bytes.
    pub fn random<R: Rng + CryptoRng + ?Sized>(rng: &mut R, length: usize) -> Self {
        let mut pad = || {
            let mut bytes = vec![0u8; length];
            rng.fill_bytes(&mut bytes);
            bytes
        };
        let r0 = pad();
        let r1 = pad();

        Self::new(r0, r1)
    }

    /// Returns the pads.
    pub fn pads(&self) -> &[Vec<u8>; 2] {
        &self.pads
    }

    /// Returns the length of each pad.
    pub fn len(&self) -> usize {
        self.pads[0].len()
    }

    /// Returns `true` if the pads are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Randomness handed to the sender: both pads.
    pub fn sender(&self) -> OtRandomness {
        OtRandomness::Sender {
            pads: self.pads.clone(),
        }
    }

    /// Randomness handed to the receiver: `d` and `r_d`.
    pub fn receiver(&self, choice: bool) -> OtRandomness {
        OtRandomness::Receiver {
            choice,
            pad: self.pads[choice as usize].clone(),
        }
    }
}

/// Pads of transfers for which one party has requested randomness.
///
/// The first request for a transfer draws fresh pads and keeps them. The
/// second request gets the same pads and removes the entry, so a third
/// request starts a new transfer.
#[derive(Debug, Default)]
pub struct PadCache {
    entries: HashMap<String, PadPair>,
}

impl PadCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pads of transfer `msg_id`.
    ///
    /// `length` is only used when fresh pads are drawn.
    pub fn draw<R: Rng + CryptoRng + ?Sized>(
        &mut self,
        msg_id: &str,
        length: usize,
        rng: &mut R,
    ) -> PadPair {
        match self.entries.remove(msg_id) {
            Some(pads) => pads,
            None => {
                let pads = PadPair::random(rng, length);
                self.entries.insert(msg_id.to_string(), pads.clone());
                pads
            }
        }
    }

    /// Returns `true` if the transfer has drawn pads which the second party
    /// has not collected yet.
    pub fn is_pending(&self, msg_id: &str) -> bool {
        self.entries.contains_key(msg_id)
    }

    /// Returns the number of pending transfers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no transfer is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every pending transfer.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn test_cache_lifecycle() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let mut cache = PadCache::new();

        let first = cache.draw("ot/Wire0", 17, &mut rng);
        assert_eq!(first.len(), 17);
        assert!(cache.is_pending("ot/Wire0"));

        let second = cache.draw("ot/Wire0", 17, &mut rng);
        assert_eq!(first, second);
        assert!(!cache.is_pending("ot/Wire0"));
        assert!(cache.is_empty());

        let third = cache.draw("ot/Wire0", 17, &mut rng);
        assert_ne!(first, third);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_keeps_first_length() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let mut cache = PadCache::new();

        let first = cache.draw("a", 4, &mut rng);
        let second = cache.draw("a", 8, &mut rng);

        assert_eq!(second.len(), 4);
        assert_eq!(first, second);
    }

    #[test]
    fn test_randomness() {
        let pads = PadPair::new(vec![1, 2], vec![3, 4]);

        assert_eq!(
            pads.sender(),
            OtRandomness::Sender {
                pads: [vec![1, 2], vec![3, 4]]
            }
        );
        assert_eq!(
            pads.receiver(true),
            OtRandomness::Receiver {
                choice: true,
                pad: vec![3, 4]
            }
        );
    }
}
