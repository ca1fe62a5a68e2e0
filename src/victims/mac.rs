use std::fmt;
use std::marker::PhantomData;

use crate::hash::Hasher;
use crate::oracle::{MacOracle, VerifyOracle};

/// Authenticates messages with the secret-prefix MAC `H(key ‖ message)`.
pub struct KeyedMacVictim<H> {
    key: Vec<u8>,
    hasher: PhantomData<fn() -> H>,
}

impl<H> KeyedMacVictim<H> {
    pub fn new(key: &[u8]) -> Self {
        Self {
            key: key.to_vec(),
            hasher: PhantomData,
        }
    }
}

impl<H> fmt::Debug for KeyedMacVictim<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedMacVictim")
            .field("key_len", &self.key.len())
            .finish_non_exhaustive()
    }
}

impl<H, const N: usize> MacOracle<N> for KeyedMacVictim<H>
where
    H: Hasher<N>,
{
    fn mac(&self, message: &[u8]) -> [u8; N] {
        let mut hasher = H::default();
        hasher.update(&self.key);
        hasher.update_and_digest(message)
    }
}

impl<H, const N: usize> VerifyOracle<N> for KeyedMacVictim<H>
where
    H: Hasher<N>,
{
    fn verify(&self, message: &[u8], mac: &[u8; N]) -> bool {
        MacOracle::<N>::mac(self, message) == *mac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::hash::{Sha1, Sha256};

    #[test]
    fn mac_is_hash_of_key_then_message() {
        let victim = KeyedMacVictim::<Sha1>::new(b"key");

        let mac: [u8; 20] = victim.mac(b"message");

        assert_eq!(mac, Sha1::digest_message(b"keymessage"));
    }

    #[test]
    fn verify_rejects_tampered_message_and_mac() {
        let victim = KeyedMacVictim::<Sha256>::new(b"key");
        let mac: [u8; 32] = victim.mac(b"message");
        let mut tampered = mac;
        tampered[0] ^= 1;

        assert!(victim.verify(b"message", &mac));
        assert!(!victim.verify(b"messagf", &mac));
        assert!(!victim.verify(b"message", &tampered));
    }

    #[test]
    fn debug_does_not_print_key() {
        let victim = KeyedMacVictim::<Sha1>::new(b"hunter2");

        assert_eq!(format!("{victim:?}"), "KeyedMacVictim { key_len: 7, .. }");
    }
}
