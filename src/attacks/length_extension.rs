// Forging secret-prefix MACs by length extension
//
// A MAC of the form H(key ‖ message) leaves the hash's chaining state in the
// digest. The hash had actually processed
//
//     key ‖ message ‖ glue
//
// where `glue` is the padding it appended, so a hasher rebuilt from the
// digest can carry on from there and hash a suffix of our choosing. The
// result is a valid MAC of `message ‖ glue ‖ suffix` under the same key,
// without knowing the key. Only the key's length is needed to compute the
// glue, and that can be guessed.
use std::ops::Range;

use tracing::{debug, instrument};

use crate::config::ForgeryConfig;
use crate::hash::LengthExtendable;
use crate::oracle::{MacOracle, VerifyOracle};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forgery<const N: usize> {
    pub message: Vec<u8>,
    pub mac: [u8; N],
    /// The key length the forgery was computed for.
    pub key_len: usize,
}

/// Extend the MAC of `message` to a MAC of `message ‖ glue ‖ suffix`,
/// assuming a key of `key_len` bytes.
pub fn extend_mac<H, const N: usize>(
    message: &[u8],
    mac: &[u8; N],
    key_len: usize,
    suffix: &[u8],
) -> Forgery<N>
where
    H: LengthExtendable<N>,
{
    let glue = H::padding((key_len + message.len()) as u64);
    let mut forged = Vec::with_capacity(message.len() + glue.len() + suffix.len());
    forged.extend_from_slice(message);
    forged.extend_from_slice(&glue);

    let processed = (key_len + forged.len()) as u64;
    let forged_mac = H::from_digest(mac, processed).update_and_digest(suffix);

    forged.extend_from_slice(suffix);
    Forgery {
        message: forged,
        mac: forged_mac,
        key_len,
    }
}

/// Forge a MAC for `message` extended with `suffix`, trying every key length
/// in `config.key_lengths` until the verifier accepts one.
#[instrument(skip_all)]
pub fn forge_keyed_mac<H, O, const N: usize>(
    oracle: &O,
    message: &[u8],
    suffix: &[u8],
    config: &ForgeryConfig,
) -> Result<Forgery<N>>
where
    H: LengthExtendable<N>,
    O: MacOracle<N> + VerifyOracle<N> + ?Sized,
{
    let mac = oracle.mac(message);
    for key_len in config.key_lengths.clone() {
        let forgery = extend_mac::<H, N>(message, &mac, key_len, suffix);
        if oracle.verify(&forgery.message, &forgery.mac) {
            debug!(key_len, "forgery accepted");
            return Ok(forgery);
        }
    }
    let Range { start, end } = config.key_lengths;
    Err(Error::ForgeryRejected { start, end })
}
