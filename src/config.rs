// Tunable limits for the attacks.
//
// None of these are protocol constants. They bound every brute-force and
// alignment loop so that a misbehaving oracle cannot keep an attack spinning
// forever. The defaults are generous for secrets of a few kilobytes.
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorConfig {
    /// Largest repeating-key length considered.
    pub max_key_len: usize,
    /// Number of consecutive key-sized blocks compared per candidate length.
    pub sample_blocks: usize,
    /// Number of best key lengths that are fully cracked and scored.
    pub candidates: usize,
}

impl Default for XorConfig {
    fn default() -> Self {
        Self {
            max_key_len: 49,
            sample_blocks: 4,
            candidates: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcbConfig {
    pub max_block_size: usize,
    /// Filler blocks sent per candidate while probing for the block size.
    pub probe_repeats: usize,
    pub max_secret_len: usize,
    /// Queries allowed per aligned request before giving up on alignment.
    pub max_alignment_attempts: usize,
}

impl Default for EcbConfig {
    fn default() -> Self {
        Self {
            max_block_size: 64,
            probe_repeats: 17,
            max_secret_len: 4096,
            max_alignment_attempts: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitflipConfig {
    pub max_block_size: usize,
}

impl Default for BitflipConfig {
    fn default() -> Self {
        Self { max_block_size: 64 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddingOracleConfig {
    pub max_draws: usize,
    /// Consecutive draws without a new plaintext after which the harvest is
    /// considered to cover every message the victim can send.
    pub stable_draws: usize,
}

impl Default for PaddingOracleConfig {
    fn default() -> Self {
        Self {
            max_draws: 1000,
            stable_draws: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSearchConfig {
    /// How many seconds before "now" the search reaches back.
    pub window: u32,
}

impl Default for SeedSearchConfig {
    fn default() -> Self {
        Self { window: 10_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeryConfig {
    pub key_lengths: Range<usize>,
}

impl Default for ForgeryConfig {
    fn default() -> Self {
        Self { key_lengths: 0..64 }
    }
}
