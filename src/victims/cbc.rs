use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::modes::{decrypt_cbc, encrypt_cbc, AesCipher, AES_BLOCK_SIZE};
use crate::oracle::{CiphertextSource, PaddingOracle};
use crate::{is_pkcs7_padded, Error, Result};

/// A server that hands out one of its messages, encrypted under AES-CBC with
/// a fresh IV, and leaks whether submitted ciphertexts are validly padded.
#[derive(Debug)]
pub struct CbcPaddingVictim {
    cipher: AesCipher,
    messages: Vec<Vec<u8>>,
    rng: Mutex<StdRng>,
}

impl CbcPaddingVictim {
    /// `seed` drives which message is drawn and the IVs, so runs are
    /// repeatable.
    pub fn new(key: &[u8], messages: Vec<Vec<u8>>, seed: u64) -> Result<Self> {
        if messages.is_empty() {
            return Err(Error::InvalidLength {
                what: "message list",
                expected: 1,
                actual: 0,
            });
        }
        Ok(Self {
            cipher: AesCipher::new(key)?,
            messages,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        })
    }
}

impl CiphertextSource for CbcPaddingVictim {
    fn draw(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let (index, iv) = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            let index = rng.gen_range(0..self.messages.len());
            let iv: [u8; AES_BLOCK_SIZE] = rng.gen();
            (index, iv)
        };
        let ciphertext = encrypt_cbc(&self.cipher, &iv, &self.messages[index])?;
        Ok((iv.to_vec(), ciphertext))
    }
}

impl PaddingOracle for CbcPaddingVictim {
    fn is_valid_padding(&self, ciphertext: &[u8], iv: &[u8]) -> bool {
        match decrypt_cbc(&self.cipher, iv, ciphertext) {
            Ok(plaintext) => is_pkcs7_padded(&plaintext, AES_BLOCK_SIZE),
            Err(_) => false,
        }
    }
}
