use super::{check_block_aligned, AesCipher, AES_BLOCK_SIZE};
use crate::Result;

/// Encrypt block-aligned bytes with AES in ECB mode. No padding is added.
pub fn encrypt_ecb(cipher: &AesCipher, plaintext: &[u8]) -> Result<Vec<u8>> {
    check_block_aligned(plaintext)?;
    let mut ciphertext = plaintext.to_vec();
    for block in ciphertext.chunks_exact_mut(AES_BLOCK_SIZE) {
        cipher.encrypt_block(as_block(block));
    }
    Ok(ciphertext)
}

/// Decrypt AES-ECB ciphertext. Padding is left in place.
pub fn decrypt_ecb(cipher: &AesCipher, ciphertext: &[u8]) -> Result<Vec<u8>> {
    check_block_aligned(ciphertext)?;
    let mut plaintext = ciphertext.to_vec();
    for block in plaintext.chunks_exact_mut(AES_BLOCK_SIZE) {
        cipher.decrypt_block(as_block(block));
    }
    Ok(plaintext)
}

pub(super) fn as_block(chunk: &mut [u8]) -> &mut [u8; AES_BLOCK_SIZE] {
    // Only ever called on chunks_exact_mut(AES_BLOCK_SIZE) output.
    chunk
        .try_into()
        .unwrap_or_else(|_| unreachable!("chunk is exactly one block"))
}
