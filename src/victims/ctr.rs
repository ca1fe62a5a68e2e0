use rand::RngCore;

use crate::modes::{edit_ctr, encrypt_ctr, AesCipher, CTR_NONCE_SIZE};
use crate::oracle::CtrEditOracle;
use crate::Result;

/// Encrypts with AES-CTR under a fixed key and nonce, and lets anyone
/// overwrite parts of a ciphertext's plaintext without knowing the key.
#[derive(Debug)]
pub struct CtrEditVictim {
    cipher: AesCipher,
    nonce: [u8; CTR_NONCE_SIZE],
}

impl CtrEditVictim {
    pub fn new(key: &[u8]) -> Result<Self> {
        let mut nonce = [0u8; CTR_NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);
        Ok(Self {
            cipher: AesCipher::new(key)?,
            nonce,
        })
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        encrypt_ctr(&self.cipher, &self.nonce, plaintext)
    }
}

impl CtrEditOracle for CtrEditVictim {
    fn edit(&self, ciphertext: &[u8], offset: usize, new_plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut edited = ciphertext.to_vec();
        edit_ctr(&self.cipher, &self.nonce, &mut edited, offset, new_plaintext)?;
        Ok(edited)
    }
}
