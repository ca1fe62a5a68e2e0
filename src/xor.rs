use crate::{Error, Result};

pub fn xor_bytes(buf_a: &[u8], buf_b: &[u8]) -> Result<Vec<u8>> {
    if buf_a.len() != buf_b.len() {
        return Err(Error::LengthMismatch(buf_a.len(), buf_b.len()));
    }
    Ok(buf_a.iter().zip(buf_b).map(|(a, b)| a ^ b).collect())
}

/// XOR a message with a key repeated along its whole length.
///
/// Encryption and decryption are the same operation.
pub fn repeating_key_xor(message: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return message.to_vec();
    }
    message
        .iter()
        .zip(key.iter().cycle())
        .map(|(m, k)| m ^ k)
        .collect()
}

/// Number of differing bits between two equal-length buffers.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}
