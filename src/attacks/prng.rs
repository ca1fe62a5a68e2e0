// Attacks on MT19937
//
// The generator's output is just a tempered copy of one word of its state,
// and tempering is invertible. 624 consecutive outputs therefore give back
// the whole state, after which every future output can be predicted.
//
// Seeds are often small or guessable: a UNIX timestamp from the last few
// minutes, or a 16 bit value. Those are found by trying every candidate.
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, instrument};

use crate::config::SeedSearchConfig;
use crate::mt19937::{mt19937_stream_xor, untemper, Mt19937, MT19937_STATE_LEN};
use crate::{Error, Result};

/// Find a timestamp seed whose first output is `observed`, searching back
/// from `now` by at most `config.window` seconds.
#[instrument(skip_all, fields(now = now))]
pub fn crack_time_seed(observed: u32, now: u32, config: &SeedSearchConfig) -> Option<u32> {
    let seed = (now.saturating_sub(config.window)..=now)
        .rev()
        .find(|&seed| Mt19937::new(seed).generate() == observed);
    debug!(?seed, "time seed search finished");
    seed
}

/// [`crack_time_seed`] searching back from the current time.
pub fn crack_recent_time_seed(observed: u32, config: &SeedSearchConfig) -> Option<u32> {
    crack_time_seed(observed, unix_time(), config)
}

fn unix_time() -> u32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}

/// Build a generator that continues from 624 consecutive outputs of another.
pub fn clone_mt19937(outputs: &[u32]) -> Result<Mt19937> {
    let outputs: &[u32; MT19937_STATE_LEN] =
        outputs.try_into().map_err(|_| Error::InvalidLength {
            what: "mt19937 output sequence",
            expected: MT19937_STATE_LEN,
            actual: outputs.len(),
        })?;
    Ok(Mt19937::from_state(outputs.map(untemper)))
}

/// Find the 16 bit seed of an [`mt19937_stream_xor`] ciphertext whose
/// plaintext is known to end with `known_suffix`.
#[instrument(skip_all)]
pub fn recover_stream_seed(ciphertext: &[u8], known_suffix: &[u8]) -> Option<u16> {
    if known_suffix.len() > ciphertext.len() {
        return None;
    }
    let seed = (0..=u16::MAX)
        .find(|&seed| mt19937_stream_xor(seed, ciphertext).ends_with(known_suffix));
    debug!(?seed, "stream seed search finished");
    seed
}
