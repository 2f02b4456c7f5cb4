//! Gate cipher.

use once_cell::sync::Lazy;

use crate::Label;

const CONTEXT: &str = "yao-core gate cipher v1";

/// Key used by [`HashCipher`], derived once from a fixed context string.
static CIPHER_KEY: Lazy<[u8; 32]> = Lazy::new(|| blake3::derive_key(CONTEXT, &[]));

/// A cipher which encrypts a label under a pair of key labels and a gate
/// index.
///
/// Decryption with a wrong key pair does not fail, it yields an unrelated
/// label.
pub trait GateCipher {
    /// Computes the pad for the key pair `(a, b)` of gate `gid`.
    fn pad(&self, a: &Label, b: &Label, gid: usize) -> Label;

    /// Encrypts `plaintext` under the key labels `a` and `b`.
    #[inline]
    fn encrypt(&self, a: &Label, b: &Label, gid: usize, plaintext: &Label) -> Label {
        *plaintext ^ self.pad(a, b, gid)
    }

    /// Decrypts `ciphertext` under the key labels `a` and `b`.
    #[inline]
    fn decrypt(&self, a: &Label, b: &Label, gid: usize, ciphertext: &Label) -> Label {
        *ciphertext ^ self.pad(a, b, gid)
    }
}

impl<C: GateCipher + ?Sized> GateCipher for &C {
    #[inline]
    fn pad(&self, a: &Label, b: &Label, gid: usize) -> Label {
        (**self).pad(a, b, gid)
    }
}

/// Gate cipher built on keyed BLAKE3.
///
/// The pad is `H(gid || a || b)` truncated to a payload and a pointer bit.
/// Both key labels are hashed together, including their pointer bits.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashCipher;

impl GateCipher for HashCipher {
    fn pad(&self, a: &Label, b: &Label, gid: usize) -> Label {
        let mut hasher = blake3::Hasher::new_keyed(&CIPHER_KEY);
        hasher.update(&(gid as u64).to_le_bytes());
        hasher.update(&a.to_bytes());
        hasher.update(&b.to_bytes());

        let mut out = [0u8; Label::LEN];
        hasher.finalize_xof().fill(&mut out);

        let mut payload = [0u8; Label::PAYLOAD_LEN];
        payload.copy_from_slice(&out[..Label::PAYLOAD_LEN]);

        Label::new(payload, out[Label::PAYLOAD_LEN] & 1 == 1)
    }
}
