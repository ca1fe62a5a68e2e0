mod cbc;
mod cipher;
mod ctr;
mod ecb;

pub use cbc::{decrypt_cbc, encrypt_cbc};
pub use cipher::AesCipher;
pub use ctr::{ctr_keystream_xor, decrypt_ctr, edit_ctr, encrypt_ctr, open_ctr, seal_ctr};
pub use ecb::{decrypt_ecb, encrypt_ecb};

pub const AES_BLOCK_SIZE: usize = 16;
pub const CTR_NONCE_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    Ecb,
    Cbc,
}

fn check_block_aligned(bytes: &[u8]) -> crate::Result<()> {
    if bytes.len() % AES_BLOCK_SIZE != 0 {
        return Err(crate::Error::NotBlockAligned {
            len: bytes.len(),
            block_size: AES_BLOCK_SIZE,
        });
    }
    Ok(())
}
