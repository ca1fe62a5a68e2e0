use std::sync::Mutex;

use rand::{Rng, RngCore};

use crate::modes::{encrypt_cbc, encrypt_ecb, AesCipher, BlockMode, AES_BLOCK_SIZE};
use crate::oracle::EncryptionOracle;
use crate::{pkcs7_pad, Result};

/// What an [`EcbSuffixOracle`] puts in front of the attacker's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prefix {
    None,
    Fixed(Vec<u8>),
    /// Fresh random bytes on every call, between 0 and `max_len` of them.
    Random { max_len: usize },
}

/// Encrypts `prefix ‖ input ‖ secret` under AES-ECB with a fixed key.
#[derive(Debug)]
pub struct EcbSuffixOracle {
    cipher: AesCipher,
    prefix: Prefix,
    secret: Vec<u8>,
}

impl EcbSuffixOracle {
    pub fn new(key: &[u8], secret: Vec<u8>) -> Result<Self> {
        Ok(Self {
            cipher: AesCipher::new(key)?,
            prefix: Prefix::None,
            secret,
        })
    }

    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = prefix;
        self
    }

    fn prefix_bytes(&self) -> Vec<u8> {
        match &self.prefix {
            Prefix::None => Vec::new(),
            Prefix::Fixed(bytes) => bytes.clone(),
            Prefix::Random { max_len } => {
                let mut rng = rand::thread_rng();
                let mut bytes = vec![0u8; rng.gen_range(0..=*max_len)];
                rng.fill_bytes(&mut bytes);
                bytes
            }
        }
    }
}

impl EncryptionOracle for EcbSuffixOracle {
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>> {
        let plaintext = [self.prefix_bytes().as_slice(), input, self.secret.as_slice()].concat();
        encrypt_ecb(&self.cipher, &pkcs7_pad(&plaintext, AES_BLOCK_SIZE)?)
    }
}

/// Encrypts under a new random key on every call, surrounding the input with
/// 5 to 10 random bytes on each side and picking ECB or CBC at random.
#[derive(Debug, Default)]
pub struct EcbOrCbcOracle {
    forced_mode: Option<BlockMode>,
    last_mode: Mutex<Option<BlockMode>>,
}

impl EcbOrCbcOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// An oracle that always picks CBC.
    pub fn cbc_only() -> Self {
        Self {
            forced_mode: Some(BlockMode::Cbc),
            ..Self::default()
        }
    }

    /// The mode used by the most recent call to `encrypt`.
    pub fn last_mode(&self) -> Option<BlockMode> {
        *self.last_mode.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EncryptionOracle for EcbOrCbcOracle {
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut rng = rand::thread_rng();
        let cipher = AesCipher::new(&rng.gen::<[u8; AES_BLOCK_SIZE]>())?;

        let mut plaintext = vec![0u8; rng.gen_range(5..=10)];
        rng.fill_bytes(&mut plaintext);
        plaintext.extend_from_slice(input);
        let mut suffix = vec![0u8; rng.gen_range(5..=10)];
        rng.fill_bytes(&mut suffix);
        plaintext.extend_from_slice(&suffix);

        let mode = self.forced_mode.unwrap_or(if rng.gen() {
            BlockMode::Ecb
        } else {
            BlockMode::Cbc
        });
        *self.last_mode.lock().unwrap_or_else(|e| e.into_inner()) = Some(mode);

        match mode {
            BlockMode::Ecb => encrypt_ecb(&cipher, &pkcs7_pad(&plaintext, AES_BLOCK_SIZE)?),
            BlockMode::Cbc => {
                let iv: [u8; AES_BLOCK_SIZE] = rng.gen();
                encrypt_cbc(&cipher, &iv, &plaintext)
            }
        }
    }
}
