use super::{check_block_aligned, ecb::as_block, AesCipher, AES_BLOCK_SIZE};
use crate::{pkcs7_pad, Error, Result};

/// PKCS#7-pad and encrypt with AES in CBC mode.
pub fn encrypt_cbc(cipher: &AesCipher, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut last_block = check_iv(iv)?;
    let mut ciphertext = pkcs7_pad(plaintext, AES_BLOCK_SIZE)?;
    for block in ciphertext.chunks_exact_mut(AES_BLOCK_SIZE) {
        let block = as_block(block);
        block
            .iter_mut()
            .zip(last_block)
            .for_each(|(b, prev)| *b ^= prev);
        cipher.encrypt_block(block);
        last_block = *block;
    }
    Ok(ciphertext)
}

/// Decrypt AES-CBC ciphertext. The padding is not removed, so callers can
/// inspect it.
pub fn decrypt_cbc(cipher: &AesCipher, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let mut last_block = check_iv(iv)?;
    check_block_aligned(ciphertext)?;
    let mut plaintext = ciphertext.to_vec();
    for block in plaintext.chunks_exact_mut(AES_BLOCK_SIZE) {
        let block = as_block(block);
        let ciphertext_block = *block;
        cipher.decrypt_block(block);
        block
            .iter_mut()
            .zip(last_block)
            .for_each(|(b, prev)| *b ^= prev);
        last_block = ciphertext_block;
    }
    Ok(plaintext)
}

fn check_iv(iv: &[u8]) -> Result<[u8; AES_BLOCK_SIZE]> {
    iv.try_into().map_err(|_| Error::InvalidLength {
        what: "iv",
        expected: AES_BLOCK_SIZE,
        actual: iv.len(),
    })
}
