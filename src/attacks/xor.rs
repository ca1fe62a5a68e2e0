// Breaking XOR ciphers with English-likelihood scoring.
//
// A single-byte key is found by trying all 256 bytes and keeping the most
// English-looking decryption. A repeating key reduces to that problem once its
// length is known: bytes that are a multiple of the key length apart were
// XOR-ed with the same key byte, so splitting the ciphertext into columns
// gives one single-byte problem per key byte.
//
// The key length is guessed from Hamming distances. Two blocks of English
// XOR-ed with the same key differ in roughly as many bits as the plaintexts
// do, which is fewer than two blocks XOR-ed with different key bytes. The
// normalised distance between key-sized blocks is therefore smallest at the
// true key length (and its multiples).
use rayon::prelude::*;
use tracing::{debug, instrument, trace};

use crate::config::XorConfig;
use crate::{english_score, hamming_distance, repeating_key_xor};

#[derive(Debug, Clone, PartialEq)]
pub struct XorCrackResult<K> {
    pub key: K,
    pub plaintext: Vec<u8>,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyLengthCandidate {
    pub key_len: usize,
    /// Mean Hamming distance between key-sized blocks, per byte.
    pub distance: f64,
}

pub fn crack_single_byte_xor(ciphertext: &[u8]) -> XorCrackResult<u8> {
    let mut candidates: Vec<XorCrackResult<u8>> = (0..=255u8)
        .into_par_iter()
        .map(|key| {
            let plaintext: Vec<u8> = ciphertext.iter().map(|b| b ^ key).collect();
            let score = english_score(&plaintext);
            XorCrackResult {
                key,
                plaintext,
                score,
            }
        })
        .collect();

    let best = first_best(candidates.iter().map(|c| c.score)).unwrap_or(0);
    candidates.swap_remove(best)
}

/// Find the line most likely to be English XOR-ed with a single byte.
///
/// Returns the index of that line and its decryption, or `None` when there
/// are no candidates.
#[instrument(skip_all)]
pub fn find_single_byte_xor<T>(candidates: &[T]) -> Option<(usize, XorCrackResult<u8>)>
where
    T: AsRef<[u8]> + Sync,
{
    let mut cracked: Vec<XorCrackResult<u8>> = candidates
        .par_iter()
        .map(|candidate| crack_single_byte_xor(candidate.as_ref()))
        .collect();

    let best = first_best(cracked.iter().map(|c| c.score))?;
    debug!(index = best, key = cracked[best].key, "found single-byte xor line");
    Some((best, cracked.swap_remove(best)))
}

/// Rank key lengths by the normalised Hamming distance between the first few
/// key-sized blocks. Lengths without at least two full blocks are skipped.
pub fn estimate_key_lengths(ciphertext: &[u8], config: &XorConfig) -> Vec<KeyLengthCandidate> {
    let mut candidates: Vec<KeyLengthCandidate> = (1..=config.max_key_len)
        .into_par_iter()
        .filter_map(|key_len| {
            let blocks: Vec<&[u8]> = ciphertext
                .chunks_exact(key_len)
                .take(config.sample_blocks.max(2))
                .collect();
            if blocks.len() < 2 {
                return None;
            }
            let mut total = 0u64;
            let mut pairs = 0u64;
            for (i, a) in blocks.iter().enumerate() {
                for b in &blocks[i + 1..] {
                    total += u64::from(hamming_distance(a, b));
                    pairs += 1;
                }
            }
            Some(KeyLengthCandidate {
                key_len,
                distance: total as f64 / pairs as f64 / key_len as f64,
            })
        })
        .collect();

    // Stable, so equal distances stay in key length order.
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    candidates.truncate(config.candidates);
    candidates
}

#[instrument(skip_all, fields(len = ciphertext.len()))]
pub fn crack_repeating_key_xor(
    ciphertext: &[u8],
    config: &XorConfig,
) -> Option<XorCrackResult<Vec<u8>>> {
    let key_lengths = estimate_key_lengths(ciphertext, config);
    let lengths: Vec<usize> = key_lengths.iter().map(|c| c.key_len).collect();
    debug!(candidates = ?lengths, "estimated key lengths");

    let mut cracked: Vec<XorCrackResult<Vec<u8>>> = key_lengths
        .par_iter()
        .map(|candidate| {
            let key: Vec<u8> = (0..candidate.key_len)
                .map(|offset| {
                    let column: Vec<u8> = ciphertext
                        .iter()
                        .skip(offset)
                        .step_by(candidate.key_len)
                        .copied()
                        .collect();
                    crack_single_byte_xor(&column).key
                })
                .collect();
            let plaintext = repeating_key_xor(ciphertext, &key);
            let score = english_score(&plaintext);
            XorCrackResult {
                key,
                plaintext,
                score,
            }
        })
        .collect();

    let best = first_best(cracked.iter().map(|c| c.score))?;
    let mut result = cracked.swap_remove(best);
    let period = minimal_period(&result.key);
    result.key.truncate(period);
    debug!(key_len = period, "cracked repeating key");
    Some(result)
}

/// Recover plaintexts that were all XOR-ed with the same keystream, as
/// happens when CTR mode reuses a nonce.
///
/// Column `i` holds byte `i` of every ciphertext long enough to have one, so
/// bytes near the end of the longest ciphertexts are guessed from very few
/// samples and are often wrong.
#[instrument(skip_all, fields(n = ciphertexts.len()))]
pub fn break_reused_keystream<T>(ciphertexts: &[T]) -> Vec<Vec<u8>>
where
    T: AsRef<[u8]> + Sync,
{
    let max_len = ciphertexts
        .iter()
        .map(|c| c.as_ref().len())
        .max()
        .unwrap_or(0);

    let keystream: Vec<u8> = (0..max_len)
        .into_par_iter()
        .map(|position| {
            let column: Vec<u8> = ciphertexts
                .iter()
                .filter_map(|c| c.as_ref().get(position).copied())
                .collect();
            crack_single_byte_xor(&column).key
        })
        .collect();
    trace!(len = keystream.len(), "recovered shared keystream");

    ciphertexts
        .iter()
        .map(|c| {
            c.as_ref()
                .iter()
                .zip(&keystream)
                .map(|(c, k)| c ^ k)
                .collect()
        })
        .collect()
}

// Index of the first maximum, so ties go to the earliest candidate.
fn first_best(scores: impl Iterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, score) in scores.enumerate() {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

fn minimal_period(key: &[u8]) -> usize {
    (1..=key.len())
        .find(|&p| key.len() % p == 0 && key.iter().enumerate().all(|(i, &k)| k == key[i % p]))
        .unwrap_or(key.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::modes::{encrypt_ctr, AesCipher};

    use rand::{rngs::StdRng, Rng, SeedableRng};
    use rstest::rstest;

    const TEXT: &str = "\
I'm back and I'm ringin' the bell. A rockin' on the mike while the fly \
girls yell. In ecstasy in the back of me, well that's my DJ Deshay cuttin' \
all them Z's, hittin' hard and the girlies goin' crazy. Vanilla's on the \
mike, man I'm not lazy. I'm lettin' my drug kick in, it controls my mouth \
and I begin to just let it flow, let my concepts go. My posse's to the side \
yellin', go Vanilla go! Smooth 'cause that's the way I will be, and if you \
don't give a damn, then why you starin' at me? So get off 'cause I control \
the stage, there's no dissin' allowed. I'm in my own phase, the girlies \
say they love me and that is ok, and I can dance better than any kid n' play.";

    #[test]
    fn crack_single_byte_xor_recovers_plaintext() {
        let ciphertext =
            hex::decode("1b37373331363f78151b7f2b783431333d78397828372d363c78373e783a393b3736")
                .unwrap();

        let result = crack_single_byte_xor(&ciphertext);

        assert_eq!(result.key, 88);
        assert_eq!(result.plaintext, b"Cooking MC's like a pound of bacon");
    }

    #[test]
    fn crack_single_byte_xor_breaks_ties_with_first_key() {
        let result = crack_single_byte_xor(&[]);

        assert_eq!(result.key, 0);
        assert_eq!(result.plaintext, b"");
    }

    #[test]
    fn find_single_byte_xor_picks_english_line() {
        let mut rng = StdRng::seed_from_u64(101);
        let mut lines: Vec<Vec<u8>> = (0..50)
            .map(|_| (0..30).map(|_| rng.gen::<u8>()).collect())
            .collect();
        let secret: Vec<u8> = b"Now that the party is jumping\n"
            .iter()
            .map(|b| b ^ 0x35)
            .collect();
        lines.insert(17, secret);

        let (index, result) = find_single_byte_xor(&lines).unwrap();

        assert_eq!(index, 17);
        assert_eq!(result.key, 0x35);
        assert_eq!(result.plaintext, b"Now that the party is jumping\n");
    }

    #[test]
    fn find_single_byte_xor_returns_none_without_candidates() {
        let lines: Vec<Vec<u8>> = Vec::new();

        assert!(find_single_byte_xor(&lines).is_none());
    }

    #[test]
    fn estimate_key_lengths_ranks_multiple_of_true_length_first() {
        let ciphertext = repeating_key_xor(TEXT.as_bytes(), b"Terminator X");
        let config = XorConfig {
            sample_blocks: 8,
            ..XorConfig::default()
        };

        let candidates = estimate_key_lengths(&ciphertext, &config);

        assert_eq!(candidates.len(), config.candidates);
        assert!(candidates
            .windows(2)
            .all(|pair| pair[0].distance <= pair[1].distance));
        assert!(candidates.iter().any(|c| c.key_len % 12 == 0));
    }

    #[test]
    fn estimate_key_lengths_skips_lengths_without_two_blocks() {
        let config = XorConfig {
            max_key_len: 10,
            sample_blocks: 4,
            candidates: 10,
        };

        let candidates = estimate_key_lengths(&[0u8; 7], &config);

        let mut lengths: Vec<usize> = candidates.iter().map(|c| c.key_len).collect();
        lengths.sort_unstable();
        assert_eq!(lengths, vec![1, 2, 3]);
    }

    #[rstest]
    #[case(b"ICE")]
    #[case(b"Terminator X")]
    #[case(b"k3y")]
    fn crack_repeating_key_xor_recovers_key_and_plaintext(#[case] key: &[u8]) {
        let ciphertext = repeating_key_xor(TEXT.as_bytes(), key);
        let config = XorConfig {
            sample_blocks: 12,
            ..XorConfig::default()
        };

        let result = crack_repeating_key_xor(&ciphertext, &config).unwrap();

        assert_eq!(result.key, key);
        assert_eq!(result.plaintext, TEXT.as_bytes());
    }

    #[test]
    fn crack_repeating_key_xor_reduces_key_to_its_period() {
        let ciphertext = repeating_key_xor(TEXT.as_bytes(), b"ICE");
        let config = XorConfig {
            sample_blocks: 12,
            ..XorConfig::default()
        };

        let candidates = estimate_key_lengths(&ciphertext, &config);
        let result = crack_repeating_key_xor(&ciphertext, &config).unwrap();

        assert!(candidates.iter().all(|c| c.key_len != 3));
        assert_eq!(result.key, b"ICE");
        assert_eq!(result.plaintext, TEXT.as_bytes());
    }

    #[test]
    fn crack_repeating_key_xor_returns_none_for_tiny_ciphertext() {
        assert!(crack_repeating_key_xor(b"x", &XorConfig::default()).is_none());
    }

    #[rstest]
    #[case(b"ICEICE", 3)]
    #[case(b"ICEIC", 5)]
    #[case(b"aaaa", 1)]
    #[case(b"", 0)]
    fn minimal_period_finds_shortest_repeating_unit(#[case] key: &[u8], #[case] expected: usize) {
        assert_eq!(minimal_period(key), expected);
    }

    #[test]
    fn break_reused_keystream_recovers_most_of_each_plaintext() {
        let plaintexts: Vec<&[u8]> = TEXT
            .split(&['.', ',', '!', '?'][..])
            .map(|s| s.trim().as_bytes())
            .filter(|s| s.len() >= 24)
            .collect();
        let cipher = AesCipher::new(b"YELLOW SUBMARINE").unwrap();
        let ciphertexts: Vec<Vec<u8>> = plaintexts
            .iter()
            .map(|p| encrypt_ctr(&cipher, &[0u8; 8], p))
            .collect();

        let recovered = break_reused_keystream(&ciphertexts);

        // Only the leading columns have enough samples to be reliable.
        let mut matching = 0;
        let mut total = 0;
        for (got, expected) in recovered.iter().zip(&plaintexts) {
            assert_eq!(got.len(), expected.len());
            for (g, e) in got.iter().zip(expected.iter()).take(24) {
                total += 1;
                if g.eq_ignore_ascii_case(e) {
                    matching += 1;
                }
            }
        }
        assert!(plaintexts.len() >= 8);
        assert!(matching * 10 >= total * 9, "{matching}/{total} bytes recovered");
    }
}
