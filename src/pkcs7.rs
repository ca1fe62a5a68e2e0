// PKCS#7 padding
//
// Validation answers with a plain bool rather than an error: whether some
// bytes are validly padded is exactly the signal a padding oracle leaks.
use crate::{Error, Result};

pub fn pkcs7_pad(bytes: &[u8], block_size: usize) -> Result<Vec<u8>> {
    if !(1..=255).contains(&block_size) {
        return Err(Error::InvalidBlockSize(block_size));
    }
    let n_pad = block_size - (bytes.len() % block_size);
    let mut out = Vec::with_capacity(bytes.len() + n_pad);
    out.extend_from_slice(bytes);
    out.resize(bytes.len() + n_pad, n_pad as u8);
    Ok(out)
}

pub fn is_pkcs7_padded(bytes: &[u8], block_size: usize) -> bool {
    pkcs7_padding_len(bytes, block_size).is_some()
}

pub fn pkcs7_unpad(bytes: &mut Vec<u8>, block_size: usize) -> Result<()> {
    let n_pad = pkcs7_padding_len(bytes, block_size).ok_or(Error::InvalidPadding)?;
    bytes.truncate(bytes.len() - n_pad);
    Ok(())
}

fn pkcs7_padding_len(bytes: &[u8], block_size: usize) -> Option<usize> {
    let n_pad = *bytes.last()? as usize;
    if n_pad == 0 || n_pad > block_size || n_pad > bytes.len() {
        return None;
    }
    bytes[bytes.len() - n_pad..]
        .iter()
        .all(|&b| b as usize == n_pad)
        .then_some(n_pad)
}
