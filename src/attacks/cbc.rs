// The CBC padding oracle attack
//
// CBC decryption is
//
//                 P_i = D(C_i) ⊕ C_{i-1}
//
// so the block in front of C_i decides, byte for byte, what C_i decrypts to.
// Send C_i alone with a forged block X as its IV and the victim decrypts it to
//
//                 P' = D(C_i) ⊕ X.
//
// D(C_i) is the "intermediate" block. We never learn it directly, but the
// oracle tells us whether P' ends in valid padding. Varying the last byte of
// X until it does tells us that P'[b-1] is most likely 0x01, so
//
//                 D(C_i)[b-1] = X[b-1] ⊕ 0x01.
//
// With that byte known we can set it to decrypt to 0x02 and search the byte
// before it for a `02 02` ending, and so on up to a full block of padding.
// The real plaintext is the intermediate block XOR-ed with the real C_{i-1}.
//
// A hit on the last byte can also be a longer padding that happened to line
// up, e.g. `02 02`. Changing the byte in front of it and asking again
// tells the two apart, since a genuine 0x01 does not depend on it.
use std::collections::HashSet;

use rand::RngCore;
use tracing::{debug, instrument, trace, warn};

use crate::attacks::Recovered;
use crate::config::PaddingOracleConfig;
use crate::hash::{Hasher, Sha1};
use crate::oracle::{CiphertextSource, PaddingOracle};
use crate::{pkcs7_unpad, Error, Result};

/// Decrypt `ciphertext` using only a padding oracle. The block size is taken
/// from the IV, and the returned plaintext still carries its padding.
#[instrument(skip_all, fields(len = ciphertext.len()))]
pub fn padding_oracle_attack<O>(oracle: &O, ciphertext: &[u8], iv: &[u8]) -> Result<Vec<u8>>
where
    O: PaddingOracle + ?Sized,
{
    let block_size = iv.len();
    if block_size == 0 || block_size > 255 {
        return Err(Error::InvalidBlockSize(block_size));
    }
    if ciphertext.len() % block_size != 0 {
        return Err(Error::NotBlockAligned {
            len: ciphertext.len(),
            block_size,
        });
    }

    let blocks: Vec<&[u8]> = ciphertext.chunks_exact(block_size).collect();
    let mut plaintext = vec![0u8; ciphertext.len()];
    for (index, block) in blocks.iter().enumerate().rev() {
        let previous = if index == 0 { iv } else { blocks[index - 1] };
        let intermediate = recover_intermediate(oracle, block, index)?;
        let start = index * block_size;
        for (i, (d, p)) in intermediate.iter().zip(previous).enumerate() {
            plaintext[start + i] = d ^ p;
        }
        trace!(block = index, "decrypted block");
    }
    Ok(plaintext)
}

fn recover_intermediate<O>(oracle: &O, block: &[u8], index: usize) -> Result<Vec<u8>>
where
    O: PaddingOracle + ?Sized,
{
    let block_size = block.len();
    let mut rng = rand::thread_rng();
    let mut intermediate = vec![0u8; block_size];
    let mut forged = vec![0u8; block_size];

    for element in (0..block_size).rev() {
        let pad = (block_size - element) as u8;
        rng.fill_bytes(&mut forged[..element]);
        for j in element + 1..block_size {
            forged[j] = intermediate[j] ^ pad;
        }

        let mut found = None;
        for guess in 0..=255u8 {
            forged[element] = guess;
            if !oracle.is_valid_padding(block, &forged) {
                continue;
            }
            if pad == 1 && element > 0 {
                forged[element - 1] ^= 0xff;
                let confirmed = oracle.is_valid_padding(block, &forged);
                forged[element - 1] ^= 0xff;
                if !confirmed {
                    continue;
                }
            }
            found = Some(guess);
            break;
        }

        let guess = found.ok_or(Error::PaddingSearchExhausted {
            block: index,
            byte: element,
        })?;
        intermediate[element] = guess ^ pad;
    }
    Ok(intermediate)
}

/// Keep drawing ciphertexts from a victim and decrypting them until no new
/// plaintexts turn up.
///
/// Plaintexts are unpadded and deduplicated by their SHA-1 digest, in the
/// order they were first seen. The harvest is complete once
/// `config.stable_draws` draws in a row reveal nothing new.
#[instrument(skip_all)]
pub fn harvest_padding_oracle<O>(
    oracle: &O,
    config: &PaddingOracleConfig,
) -> Result<Recovered<Vec<Vec<u8>>>>
where
    O: CiphertextSource + PaddingOracle + ?Sized,
{
    let mut seen: HashSet<[u8; 20]> = HashSet::new();
    let mut plaintexts = Vec::new();
    let mut draws_since_new = 0;

    for draw in 0..config.max_draws {
        let (iv, ciphertext) = oracle.draw()?;
        let mut plaintext = padding_oracle_attack(oracle, &ciphertext, &iv)?;
        pkcs7_unpad(&mut plaintext, iv.len()).map_err(|_| {
            Error::OracleContract(format!("draw {draw} decrypted to badly padded plaintext"))
        })?;

        if seen.insert(Sha1::digest_message(&plaintext)) {
            debug!(draw, distinct = plaintexts.len() + 1, "new plaintext");
            plaintexts.push(plaintext);
            draws_since_new = 0;
        } else {
            draws_since_new += 1;
            if draws_since_new >= config.stable_draws {
                debug!(draw, distinct = plaintexts.len(), "harvest stable");
                return Ok(Recovered::Complete(plaintexts));
            }
        }
    }

    warn!(
        distinct = plaintexts.len(),
        max_draws = config.max_draws,
        "ran out of draws before the harvest settled"
    );
    Ok(Recovered::Incomplete(plaintexts))
}
