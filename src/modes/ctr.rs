// AES in CTR mode
//
//         nonce|counter0                nonce|counter1
//              ↓                             ↓
//     key → < AES >                 key → < AES >
//              ↓                             ↓                 ...
// plaintext →  ⊕               plaintext  →  ⊕
//              ↓                             ↓
//          ciphertext                    ciphertext
//
// The counter is a little-endian u64 in the second half of the block. Each
// keystream block only depends on its own counter, so any range of the
// stream can be produced without touching the blocks before it.
use rand::RngCore;

use super::{AesCipher, AES_BLOCK_SIZE, CTR_NONCE_SIZE};
use crate::{Error, Result};

/// XOR `data` in place with the keystream starting `offset` bytes into the
/// stream.
pub fn ctr_keystream_xor(
    cipher: &AesCipher,
    nonce: &[u8; CTR_NONCE_SIZE],
    offset: usize,
    data: &mut [u8],
) {
    let mut counter_block = [0u8; AES_BLOCK_SIZE];
    counter_block[..CTR_NONCE_SIZE].copy_from_slice(nonce);

    let mut position = offset;
    let mut remaining = data;
    while !remaining.is_empty() {
        let counter = (position / AES_BLOCK_SIZE) as u64;
        let in_block = position % AES_BLOCK_SIZE;

        let mut keystream = counter_block;
        keystream[CTR_NONCE_SIZE..].copy_from_slice(&counter.to_le_bytes());
        cipher.encrypt_block(&mut keystream);

        let take = (AES_BLOCK_SIZE - in_block).min(remaining.len());
        let (head, tail) = std::mem::take(&mut remaining).split_at_mut(take);
        head.iter_mut()
            .zip(&keystream[in_block..])
            .for_each(|(b, k)| *b ^= k);
        position += take;
        remaining = tail;
    }
}

pub fn encrypt_ctr(cipher: &AesCipher, nonce: &[u8; CTR_NONCE_SIZE], plaintext: &[u8]) -> Vec<u8> {
    let mut out = plaintext.to_vec();
    ctr_keystream_xor(cipher, nonce, 0, &mut out);
    out
}

pub fn decrypt_ctr(cipher: &AesCipher, nonce: &[u8; CTR_NONCE_SIZE], ciphertext: &[u8]) -> Vec<u8> {
    encrypt_ctr(cipher, nonce, ciphertext)
}

/// Encrypt under a fresh random nonce, returned as the first 8 bytes of the
/// output.
pub fn seal_ctr(cipher: &AesCipher, plaintext: &[u8]) -> Vec<u8> {
    let mut nonce = [0u8; CTR_NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);
    let mut out = Vec::with_capacity(CTR_NONCE_SIZE + plaintext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&encrypt_ctr(cipher, &nonce, plaintext));
    out
}

pub fn open_ctr(cipher: &AesCipher, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < CTR_NONCE_SIZE {
        return Err(Error::InvalidLength {
            what: "sealed ctr message",
            expected: CTR_NONCE_SIZE,
            actual: sealed.len(),
        });
    }
    let (nonce, ciphertext) = sealed.split_at(CTR_NONCE_SIZE);
    let nonce: &[u8; CTR_NONCE_SIZE] = nonce.try_into().map_err(|_| Error::InvalidLength {
        what: "ctr nonce",
        expected: CTR_NONCE_SIZE,
        actual: nonce.len(),
    })?;
    Ok(decrypt_ctr(cipher, nonce, ciphertext))
}

/// Overwrite the plaintext at `offset` with `new_plaintext`, re-encrypting
/// only the affected keystream blocks.
///
/// Writing past the end grows the ciphertext. An offset beyond the end of the
/// ciphertext would leave a hole and is rejected.
pub fn edit_ctr(
    cipher: &AesCipher,
    nonce: &[u8; CTR_NONCE_SIZE],
    ciphertext: &mut Vec<u8>,
    offset: usize,
    new_plaintext: &[u8],
) -> Result<()> {
    if offset > ciphertext.len() {
        return Err(Error::OffsetOutOfRange {
            offset,
            len: ciphertext.len(),
        });
    }
    let end = offset + new_plaintext.len();
    if end > ciphertext.len() {
        ciphertext.resize(end, 0);
    }
    let target = &mut ciphertext[offset..end];
    target.copy_from_slice(new_plaintext);
    ctr_keystream_xor(cipher, nonce, offset, target);
    Ok(())
}
