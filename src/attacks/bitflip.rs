// Bitflipping attacks on CBC and CTR
//
// Neither mode protects the integrity of the ciphertext. In CTR, flipping a
// ciphertext bit flips the same plaintext bit. In CBC, flipping a bit of one
// ciphertext block scrambles that block's plaintext but flips the same bit
// in the plaintext of the block after it. Either way, where we know the
// plaintext we can turn it into anything else of the same length:
//
//     C'[i] = C[i] ^ known[i] ^ wanted[i]
//
// The victim quotes the characters we want to inject, so we send filler
// instead and flip it into the injection once it has been encrypted.
use tracing::{debug, instrument};

use crate::attacks::layout::{input_offset, length_step, FILLER};
use crate::config::BitflipConfig;
use crate::oracle::EncryptionOracle;
use crate::{Error, Result};

/// Make a CBC oracle's output decrypt with `injection` where its input was.
///
/// The block in front of the injection decrypts to garbage. `injection` must
/// fit in one block.
#[instrument(skip_all, fields(injection_len = injection.len()))]
pub fn cbc_bitflip<O>(oracle: &O, injection: &[u8], config: &BitflipConfig) -> Result<Vec<u8>>
where
    O: EncryptionOracle + ?Sized,
{
    let (block_size, _) = length_step(oracle, config.max_block_size)?;
    if injection.len() > block_size {
        return Err(Error::InvalidLength {
            what: "injection",
            expected: block_size,
            actual: injection.len(),
        });
    }
    let offset = input_offset(oracle, block_size)?;
    debug!(block_size, offset, "found input");

    // Filler up to a block boundary, a whole block to sacrifice, then the
    // filler that becomes the injection.
    let align = (block_size - offset % block_size) % block_size;
    let mut ciphertext = oracle.encrypt(&vec![FILLER; align + block_size + injection.len()])?;
    flip(&mut ciphertext, offset + align, injection)?;
    Ok(ciphertext)
}

/// Make a CTR oracle's output decrypt with `injection` where its input was.
#[instrument(skip_all, fields(injection_len = injection.len()))]
pub fn ctr_bitflip<O>(oracle: &O, injection: &[u8]) -> Result<Vec<u8>>
where
    O: EncryptionOracle + ?Sized,
{
    let offset = input_offset(oracle, 1)?;
    debug!(offset, "found input");

    let mut ciphertext = oracle.encrypt(&vec![FILLER; injection.len()])?;
    flip(&mut ciphertext, offset, injection)?;
    Ok(ciphertext)
}

/// Flip the ciphertext at `at` so that filler there becomes `wanted`.
fn flip(ciphertext: &mut [u8], at: usize, wanted: &[u8]) -> Result<()> {
    let len = ciphertext.len();
    let target = ciphertext.get_mut(at..at + wanted.len()).ok_or_else(|| {
        Error::OracleContract(format!("{len} byte ciphertext is too short to flip at {at}"))
    })?;
    for (byte, &w) in target.iter_mut().zip(wanted) {
        *byte ^= FILLER ^ w;
    }
    Ok(())
}
