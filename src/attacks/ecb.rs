// Byte-at-a-time ECB decryption
//
// The victim encrypts `prefix ‖ input ‖ secret` under one fixed key with ECB,
// so equal plaintext blocks give equal ciphertext blocks. If we can choose
// where a block boundary falls, we can line up a block whose first b-1 bytes
// we know and whose last byte is the next unknown byte of the secret:
//
//     | A A A A A A A A A A A A A A A s0 | s1 s2 ...
//
// Encrypting the 256 blocks `A..A ‖ c` tells us which `c` matches. Shrinking
// the filler by one byte shifts the next secret byte into place, and once a
// block's worth of secret is known it becomes the filler itself.
//
// The prefix makes the boundaries unknown, and a random prefix moves them on
// every call. Both are handled the same way: every query starts with a
// guard, two blocks of sentinel bytes and a block of fence bytes. Only when
// the sentinel bytes land exactly on block boundaries does the response
// contain the sentinel's ciphertext block twice followed by the fence's, and
// then everything after the fence is aligned. Queries that don't line up are
// simply retried with a different amount of guard.
//
// The sentinel and fence bytes are picked so that their blocks never show up
// in the victim's own output, whatever the alignment of its secret.
use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, trace, warn};

use crate::attacks::Recovered;
use crate::config::EcbConfig;
use crate::modes::BlockMode;
use crate::oracle::EncryptionOracle;
use crate::{Error, Result};

const FILLER: u8 = b'A';
// First marker byte tried; later candidates count up from here.
const FIRST_MARKER: u8 = b'S';
// Number of filler blocks sent when testing for ECB.
const DETECTION_BLOCKS: usize = 4;

/// Find the oracle's block size by sending runs of identical bytes and
/// looking for runs of identical ciphertext chunks.
#[instrument(skip_all)]
pub fn detect_block_size<O>(oracle: &O, config: &EcbConfig) -> Result<usize>
where
    O: EncryptionOracle + ?Sized,
{
    let min_run = config.probe_repeats.saturating_sub(1).max(2);
    for candidate in 1..=config.max_block_size {
        let ciphertext = oracle.encrypt(&vec![FILLER; candidate * config.probe_repeats])?;
        if ciphertext.len() % candidate != 0 {
            continue;
        }
        if longest_run(ciphertext.chunks(candidate)) >= min_run {
            debug!(block_size = candidate, "detected block size");
            return Ok(candidate);
        }
    }
    Err(Error::BlockSizeNotFound)
}

/// Whether any block of the ciphertext repeats.
pub fn is_ecb(ciphertext: &[u8], block_size: usize) -> bool {
    if block_size == 0 {
        return false;
    }
    let mut seen = HashSet::new();
    ciphertext
        .chunks_exact(block_size)
        .any(|block| !seen.insert(block))
}

pub fn detect_ecb<O>(oracle: &O, block_size: usize) -> Result<bool>
where
    O: EncryptionOracle + ?Sized,
{
    let ciphertext = oracle.encrypt(&vec![FILLER; DETECTION_BLOCKS * block_size])?;
    Ok(is_ecb(&ciphertext, block_size))
}

pub fn detect_mode<O>(oracle: &O, block_size: usize) -> Result<BlockMode>
where
    O: EncryptionOracle + ?Sized,
{
    if detect_ecb(oracle, block_size)? {
        Ok(BlockMode::Ecb)
    } else {
        Ok(BlockMode::Cbc)
    }
}

/// Recover the secret an ECB oracle appends to its input.
///
/// Works whether the victim puts nothing, a fixed string or fresh random
/// bytes in front of the input. Returns `Recovered::Incomplete` with the
/// bytes found so far if the secret is longer than `config.max_secret_len`
/// or the oracle stops producing aligned responses.
#[instrument(skip_all)]
pub fn byte_at_a_time_ecb<O>(oracle: &O, config: &EcbConfig) -> Result<Recovered<Vec<u8>>>
where
    O: EncryptionOracle + ?Sized,
{
    let block_size = detect_block_size(oracle, config)?;
    let markers = find_markers(oracle, block_size)?;
    debug!(
        sentinel = markers.sentinel,
        fence = markers.fence,
        "found alignment markers"
    );
    let mut aligned = AlignedOracle {
        oracle,
        block_size,
        markers,
        guard_hint: 0,
        max_attempts: config.max_alignment_attempts,
    };

    let Some(padded_len) = aligned.query(&[])?.map(|c| c.len()) else {
        warn!("could not align the oracle's output");
        return Ok(Recovered::Incomplete(Vec::new()));
    };
    // One byte past the padded secret is always reached if the padding is
    // found, so a longer secret than this is only possible through the cap.
    let limit = (padded_len + 1).min(config.max_secret_len);
    debug!(block_size, padded_len, "recovering secret");

    let mut known: Vec<u8> = Vec::new();
    while known.len() < limit {
        match recover_next_byte(&mut aligned, &known)? {
            NextByte::Found(byte) => {
                trace!(position = known.len(), byte, "recovered byte");
                known.push(byte);
            }
            NextByte::NotInTable if known.last() == Some(&0x01) => {
                // We walked from the secret into the victim's padding: the
                // 0x01 was padding and the byte after it no longer matches.
                known.pop();
                debug!(len = known.len(), "recovered secret");
                return Ok(Recovered::Complete(known));
            }
            NextByte::NotInTable => {
                return Err(Error::ByteNotInTable {
                    position: known.len(),
                });
            }
            NextByte::Unaligned => {
                warn!(recovered = known.len(), "lost alignment with the oracle");
                return Ok(Recovered::Incomplete(known));
            }
        }
    }

    warn!(recovered = known.len(), "secret longer than the configured limit");
    Ok(Recovered::Incomplete(known))
}

enum NextByte {
    Found(u8),
    NotInTable,
    Unaligned,
}

fn recover_next_byte<O>(aligned: &mut AlignedOracle<'_, O>, known: &[u8]) -> Result<NextByte>
where
    O: EncryptionOracle + ?Sized,
{
    let b = aligned.block_size;
    let filler_len = b - 1 - (known.len() % b);
    let target = (filler_len + known.len()) / b;

    let mut window = vec![FILLER; filler_len];
    window.extend_from_slice(known);
    let window = &window[window.len() - (b - 1)..];

    let mut table_input = Vec::with_capacity(256 * b);
    for candidate in 0..=255u8 {
        table_input.extend_from_slice(window);
        table_input.push(candidate);
    }
    let Some(table_ciphertext) = aligned.query(&table_input)? else {
        return Ok(NextByte::Unaligned);
    };
    if table_ciphertext.len() < table_input.len() {
        return Err(Error::OracleContract(format!(
            "{} byte response to a {} byte aligned input",
            table_ciphertext.len(),
            table_input.len()
        )));
    }
    let table: HashMap<&[u8], u8> = table_ciphertext
        .chunks_exact(b)
        .zip(0..=255u8)
        .collect();

    let Some(ciphertext) = aligned.query(&vec![FILLER; filler_len])? else {
        return Ok(NextByte::Unaligned);
    };
    let Some(block) = ciphertext.get(target * b..(target + 1) * b) else {
        return Ok(NextByte::NotInTable);
    };
    Ok(match table.get(block) {
        Some(&byte) => NextByte::Found(byte),
        None => NextByte::NotInTable,
    })
}

/// Marker bytes and the ciphertext of a block made entirely of each.
#[derive(Debug)]
struct Markers {
    sentinel: u8,
    sentinel_block: Vec<u8>,
    fence: u8,
    fence_block: Vec<u8>,
}

/// Pick a sentinel and a fence byte whose blocks never appear in the
/// victim's output on its own.
///
/// The background is the oracle's output for every filler length below the
/// block size, so it holds the prefix and the secret at every alignment. A
/// marker whose block is in the background would let the victim's data fake
/// an aligned response, so such bytes are skipped.
fn find_markers<O>(oracle: &O, block_size: usize) -> Result<Markers>
where
    O: EncryptionOracle + ?Sized,
{
    let mut background: HashSet<Vec<u8>> = HashSet::new();
    for filler_len in 0..block_size {
        let ciphertext = oracle.encrypt(&vec![FILLER; filler_len])?;
        check_aligned(&ciphertext, block_size)?;
        background.extend(ciphertext.chunks_exact(block_size).map(<[u8]>::to_vec));
    }

    let mut found = Vec::with_capacity(2);
    for byte in (0..=255u8).map(|i| FIRST_MARKER.wrapping_add(i)) {
        if byte == FILLER {
            continue;
        }
        if let Some(block) = marker_block(oracle, byte, block_size, &background)? {
            found.push((byte, block));
            if found.len() == 2 {
                break;
            }
        }
    }
    let mut found = found.into_iter();
    match (found.next(), found.next()) {
        (Some((sentinel, sentinel_block)), Some((fence, fence_block))) => Ok(Markers {
            sentinel,
            sentinel_block,
            fence,
            fence_block,
        }),
        _ => Err(Error::NotEcb),
    }
}

/// The ciphertext of a block of `byte`, or `None` if it can't be told apart
/// from the background.
///
/// Three blocks of `byte` always cover two whole blocks, wherever the block
/// boundaries fall, so an ECB oracle shows the block twice in a row.
fn marker_block<O>(
    oracle: &O,
    byte: u8,
    block_size: usize,
    background: &HashSet<Vec<u8>>,
) -> Result<Option<Vec<u8>>>
where
    O: EncryptionOracle + ?Sized,
{
    let mut input = vec![FILLER];
    input.resize(1 + 3 * block_size, byte);
    input.push(FILLER);
    let ciphertext = oracle.encrypt(&input)?;
    check_aligned(&ciphertext, block_size)?;

    let blocks: Vec<&[u8]> = ciphertext.chunks_exact(block_size).collect();
    Ok(blocks
        .windows(2)
        .find(|pair| pair[0] == pair[1] && !background.contains(pair[0]))
        .map(|pair| pair[0].to_vec()))
}

/// Wraps an oracle so that responses start at a block boundary right where
/// our own input does.
struct AlignedOracle<'a, O: ?Sized> {
    oracle: &'a O,
    block_size: usize,
    markers: Markers,
    // Guard length that worked last time, minus one.
    guard_hint: usize,
    max_attempts: usize,
}

impl<O> AlignedOracle<'_, O>
where
    O: EncryptionOracle + ?Sized,
{
    /// The ciphertext from the start of `payload` onwards, or `None` if no
    /// aligned response arrived within the attempt limit.
    fn query(&mut self, payload: &[u8]) -> Result<Option<Vec<u8>>> {
        let b = self.block_size;
        let markers = &self.markers;
        for attempt in 0..self.max_attempts {
            let guard_len = 1 + (self.guard_hint + attempt) % b;
            let mut input = Vec::with_capacity(guard_len + 3 * b + payload.len());
            input.resize(guard_len, FILLER);
            input.resize(guard_len + 2 * b, markers.sentinel);
            input.resize(guard_len + 3 * b, markers.fence);
            input.extend_from_slice(payload);

            let ciphertext = self.oracle.encrypt(&input)?;
            check_aligned(&ciphertext, b)?;
            let blocks: Vec<&[u8]> = ciphertext.chunks_exact(b).collect();
            let Some(start) = blocks.windows(3).position(|w| {
                w[0] == markers.sentinel_block
                    && w[1] == markers.sentinel_block
                    && w[2] == markers.fence_block
            }) else {
                continue;
            };

            if guard_len - 1 != self.guard_hint {
                trace!(guard_len, attempt, "aligned oracle output");
            }
            self.guard_hint = guard_len - 1;
            return Ok(Some(ciphertext[(start + 3) * b..].to_vec()));
        }
        Ok(None)
    }
}

fn check_aligned(ciphertext: &[u8], block_size: usize) -> Result<()> {
    if ciphertext.len() % block_size != 0 {
        return Err(Error::NotBlockAligned {
            len: ciphertext.len(),
            block_size,
        });
    }
    Ok(())
}

fn longest_run<'a>(chunks: impl Iterator<Item = &'a [u8]>) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<&[u8]> = None;
    for chunk in chunks {
        current = if previous == Some(chunk) { current + 1 } else { 1 };
        longest = longest.max(current);
        previous = Some(chunk);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::victims::{EcbOrCbcOracle, EcbSuffixOracle, Prefix};
    use crate::ErrorKind;

    use base64::{engine::general_purpose::STANDARD, Engine};
    use rstest::rstest;

    const UNKNOWN_STRING: &str = "Um9sbGluJyBpbiBteSA1LjAKV2l0aCBteSByYWctdG9wIGRvd24gc28gbXkg\
aGFpciBjYW4gYmxvdwpUaGUgZ2lybGllcyBvbiBzdGFuZGJ5IHdhdmluZyBq\
dXN0IHRvIHNheSBoaQpEaWQgeW91IHN0b3A/IE5vLCBJIGp1c3QgZHJvdmUg\
YnkK";

    fn secret() -> Vec<u8> {
        STANDARD.decode(UNKNOWN_STRING).unwrap()
    }

    struct Truncating(EcbSuffixOracle);

    impl EncryptionOracle for Truncating {
        fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>> {
            let mut ciphertext = self.0.encrypt(input)?;
            ciphertext.pop();
            Ok(ciphertext)
        }
    }

    #[rstest]
    #[case(Prefix::None)]
    #[case(Prefix::Fixed(b"abc".to_vec()))]
    #[case(Prefix::Random { max_len: 40 })]
    fn detect_block_size_finds_aes_block_size(#[case] prefix: Prefix) {
        let oracle = EcbSuffixOracle::new(b"YELLOW SUBMARINE", secret())
            .unwrap()
            .with_prefix(prefix);

        let block_size = detect_block_size(&oracle, &EcbConfig::default()).unwrap();

        assert_eq!(block_size, 16);
    }

    #[test]
    fn detect_block_size_fails_without_repeating_output() {
        let oracle = EcbOrCbcOracle::cbc_only();

        let err = detect_block_size(&oracle, &EcbConfig::default()).unwrap_err();

        assert_eq!(err, Error::BlockSizeNotFound);
        assert_eq!(err.kind(), ErrorKind::Exhausted);
    }

    #[rstest]
    #[case(b"YELLOW SUBMARINEYELLOW SUBMARINE", true)]
    #[case(b"YELLOW SUBMARINEyellow submarine", false)]
    #[case(b"", false)]
    fn is_ecb_detects_repeated_blocks(#[case] ciphertext: &[u8], #[case] expected: bool) {
        assert_eq!(is_ecb(ciphertext, 16), expected);
    }

    #[test]
    fn detect_mode_matches_victim_choice() {
        let oracle = EcbOrCbcOracle::new();

        for _ in 0..50 {
            let mode = detect_mode(&oracle, 16).unwrap();

            assert_eq!(Some(mode), oracle.last_mode());
        }
    }

    #[rstest]
    #[case(Prefix::None)]
    #[case(Prefix::Fixed(b"comment1=cooking%20MCs;".to_vec()))]
    #[case(Prefix::Fixed(vec![0u8; 48]))]
    #[case(Prefix::Random { max_len: 64 })]
    fn byte_at_a_time_ecb_recovers_secret(#[case] prefix: Prefix) {
        let oracle = EcbSuffixOracle::new(b"YELLOW SUBMARINE", secret())
            .unwrap()
            .with_prefix(prefix);

        let recovered = byte_at_a_time_ecb(&oracle, &EcbConfig::default()).unwrap();

        assert_eq!(recovered, Recovered::Complete(secret()));
    }

    #[rstest]
    #[case(b"".to_vec())]
    #[case(b"ends in one\x01".to_vec())]
    #[case(b"exactly sixteen!".to_vec())]
    #[case(b"fifteen bytes..".to_vec())]
    #[case(vec![0x01; 33])]
    fn byte_at_a_time_ecb_handles_awkward_secrets(#[case] secret: Vec<u8>) {
        let oracle = EcbSuffixOracle::new(b"YELLOW SUBMARINE", secret.clone())
            .unwrap()
            .with_prefix(Prefix::Fixed(b"xyz".to_vec()));

        let recovered = byte_at_a_time_ecb(&oracle, &EcbConfig::default()).unwrap();

        assert_eq!(recovered, Recovered::Complete(secret));
    }

    #[test]
    fn byte_at_a_time_ecb_stops_at_secret_limit() {
        let oracle = EcbSuffixOracle::new(b"YELLOW SUBMARINE", secret()).unwrap();
        let config = EcbConfig {
            max_secret_len: 20,
            ..EcbConfig::default()
        };

        let recovered = byte_at_a_time_ecb(&oracle, &config).unwrap();

        assert!(!recovered.is_complete());
        assert_eq!(recovered.into_inner(), secret()[..20]);
    }

    #[test]
    fn byte_at_a_time_ecb_gives_up_when_alignment_fails() {
        let oracle = EcbSuffixOracle::new(b"YELLOW SUBMARINE", secret())
            .unwrap()
            .with_prefix(Prefix::Fixed(b"abcde".to_vec()));
        let config = EcbConfig {
            max_alignment_attempts: 3,
            ..EcbConfig::default()
        };

        let recovered = byte_at_a_time_ecb(&oracle, &config).unwrap();

        assert_eq!(recovered, Recovered::Incomplete(Vec::new()));
    }

    #[test]
    fn byte_at_a_time_ecb_rejects_cbc_oracle() {
        let oracle = EcbOrCbcOracle::cbc_only();
        let config = EcbConfig {
            max_block_size: 16,
            ..EcbConfig::default()
        };

        let err = byte_at_a_time_ecb(&oracle, &config).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Exhausted);
    }

    #[test]
    fn byte_at_a_time_ecb_fails_on_truncated_responses() {
        let oracle = Truncating(EcbSuffixOracle::new(b"YELLOW SUBMARINE", secret()).unwrap());
        let config = EcbConfig {
            max_block_size: 16,
            ..EcbConfig::default()
        };

        let err = byte_at_a_time_ecb(&oracle, &config).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Exhausted);
    }

    fn repeated(parts: &[(&str, usize)]) -> Vec<u8> {
        parts.iter().flat_map(|(text, n)| text.repeat(*n).into_bytes()).collect()
    }

    #[rstest]
    #[case(repeated(&[("x", 14), ("S", 16), ("tail", 1)]), Prefix::None)]
    #[case(repeated(&[("hello ", 1), ("S", 48), (" world", 1)]), Prefix::None)]
    #[case(
        repeated(&[("hello ", 1), ("S", 48), (" world", 1)]),
        Prefix::Fixed(b"abc".to_vec())
    )]
    #[case(
        repeated(&[("hello ", 1), ("S", 48), (" world", 1)]),
        Prefix::Random { max_len: 40 }
    )]
    #[case(repeated(&[("S", 40), ("T", 40), ("U", 40)]), Prefix::Fixed(b"xyz".to_vec()))]
    #[case(repeated(&[("A", 40), ("S", 35), ("A", 3)]), Prefix::None)]
    fn byte_at_a_time_ecb_recovers_secrets_containing_marker_runs(
        #[case] secret: Vec<u8>,
        #[case] prefix: Prefix,
    ) {
        let oracle = EcbSuffixOracle::new(b"YELLOW SUBMARINE", secret.clone())
            .unwrap()
            .with_prefix(prefix);

        let recovered = byte_at_a_time_ecb(&oracle, &EcbConfig::default()).unwrap();

        assert_eq!(recovered, Recovered::Complete(secret));
    }

    #[test]
    fn find_markers_skips_bytes_found_in_victim_output() {
        let secret = repeated(&[("x", 14), ("S", 16), ("tail", 1)]);
        let oracle = EcbSuffixOracle::new(b"YELLOW SUBMARINE", secret).unwrap();

        let markers = find_markers(&oracle, 16).unwrap();

        assert_eq!(markers.sentinel, b'T');
        assert_eq!(markers.fence, b'U');
        assert_ne!(markers.sentinel_block, markers.fence_block);
    }

    #[test]
    fn find_markers_reports_non_ecb_oracle() {
        let err = find_markers(&EcbOrCbcOracle::cbc_only(), 16).unwrap_err();

        assert_eq!(err, Error::NotEcb);
    }

    #[test]
    fn find_markers_rejects_partial_blocks() {
        let oracle = Truncating(EcbSuffixOracle::new(b"YELLOW SUBMARINE", secret()).unwrap());

        let err = find_markers(&oracle, 16).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OracleContract);
    }

    #[test]
    fn longest_run_counts_consecutive_equal_chunks() {
        let data = b"aabbbbcc";

        assert_eq!(longest_run(data.chunks(2)), 2);
        assert_eq!(longest_run(data.chunks(1)), 4);
    }
}
