use std::fmt;

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};

use crate::modes::AES_BLOCK_SIZE;
use crate::{Error, Result};

/// The AES block primitive, keyed with a 128, 192 or 256 bit key.
#[derive(Clone)]
pub struct AesCipher {
    inner: Inner,
}

#[derive(Clone)]
enum Inner {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl AesCipher {
    pub fn new(key: &[u8]) -> Result<Self> {
        let inner = match key.len() {
            16 => Inner::Aes128(Aes128::new(GenericArray::from_slice(key))),
            24 => Inner::Aes192(Aes192::new(GenericArray::from_slice(key))),
            32 => Inner::Aes256(Aes256::new(GenericArray::from_slice(key))),
            n => return Err(Error::InvalidKeyLength(n)),
        };
        Ok(Self { inner })
    }

    pub fn encrypt_block(&self, block: &mut [u8; AES_BLOCK_SIZE]) {
        let block = GenericArray::from_mut_slice(block);
        match &self.inner {
            Inner::Aes128(c) => c.encrypt_block(block),
            Inner::Aes192(c) => c.encrypt_block(block),
            Inner::Aes256(c) => c.encrypt_block(block),
        }
    }

    pub fn decrypt_block(&self, block: &mut [u8; AES_BLOCK_SIZE]) {
        let block = GenericArray::from_mut_slice(block);
        match &self.inner {
            Inner::Aes128(c) => c.decrypt_block(block),
            Inner::Aes192(c) => c.decrypt_block(block),
            Inner::Aes256(c) => c.decrypt_block(block),
        }
    }

    pub fn key_bits(&self) -> usize {
        match self.inner {
            Inner::Aes128(_) => 128,
            Inner::Aes192(_) => 192,
            Inner::Aes256(_) => 256,
        }
    }
}

// Never print round keys.
impl fmt::Debug for AesCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCipher")
            .field("key_bits", &self.key_bits())
            .finish_non_exhaustive()
    }
}
