// Where the attacker's input lands in an oracle's output
//
// Growing the input a byte at a time until the output grows reveals the block
// size, since a padded cipher only grows a whole block at a time. Changing the
// last byte of the input and seeing which output block changes tells us which
// block that byte landed in. Pushing it along with filler until it spills
// into the next block tells us how far into its block the input started.
//
// Both rely on the oracle being deterministic: the same input under the same
// key and IV or nonce must give the same output.
use crate::oracle::EncryptionOracle;
use crate::{Error, Result};

pub(crate) const FILLER: u8 = b'A';

/// The block size, and the shortest input that makes the output grow by it.
pub(crate) fn length_step<O>(oracle: &O, max_block_size: usize) -> Result<(usize, usize)>
where
    O: EncryptionOracle + ?Sized,
{
    let base = oracle.encrypt(&[])?.len();
    for input_len in 1..=max_block_size {
        let len = oracle.encrypt(&vec![FILLER; input_len])?.len();
        if len > base {
            return Ok((len - base, input_len));
        }
    }
    Err(Error::BlockSizeNotFound)
}

/// The offset in the output at which the oracle's input starts.
///
/// Pass a block size of 1 for stream ciphers.
pub(crate) fn input_offset<O>(oracle: &O, block_size: usize) -> Result<usize>
where
    O: EncryptionOracle + ?Sized,
{
    let block = changed_block(oracle, block_size, 0)?;
    for filler_len in 1..block_size {
        if changed_block(oracle, block_size, filler_len)? > block {
            return Ok(block * block_size + block_size - filler_len);
        }
    }
    Ok(block * block_size)
}

/// The first output block that changes with the byte after `filler_len`
/// bytes of filler.
fn changed_block<O>(oracle: &O, block_size: usize, filler_len: usize) -> Result<usize>
where
    O: EncryptionOracle + ?Sized,
{
    let mut input = vec![FILLER; filler_len + 1];
    input[filler_len] = b'x';
    let first = oracle.encrypt(&input)?;
    input[filler_len] = b'y';
    let second = oracle.encrypt(&input)?;

    first
        .chunks(block_size)
        .zip(second.chunks(block_size))
        .position(|(a, b)| a != b)
        .ok_or_else(|| Error::OracleContract("output does not depend on the input".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::victims::{
        CbcCommentVictim, CtrCommentVictim, EcbSuffixOracle, Prefix, ProfileVictim,
    };
    use crate::ErrorKind;

    use rstest::rstest;

    struct Constant;

    impl EncryptionOracle for Constant {
        fn encrypt(&self, _: &[u8]) -> Result<Vec<u8>> {
            Ok(vec![0u8; 32])
        }
    }

    #[test]
    fn length_step_of_profile_victim() {
        let victim = ProfileVictim::new().unwrap();

        // "email=" and "&uid=10&role=user" are 23 bytes, so 9 more fill two
        // blocks exactly.
        assert_eq!(length_step(&victim, 64).unwrap(), (16, 9));
    }

    #[test]
    fn length_step_of_stream_cipher_is_one() {
        let victim = CtrCommentVictim::new(b"YELLOW SUBMARINE").unwrap();

        assert_eq!(length_step(&victim, 64).unwrap(), (1, 1));
    }

    #[test]
    fn length_step_fails_if_output_never_grows() {
        let err = length_step(&Constant, 64).unwrap_err();

        assert_eq!(err, Error::BlockSizeNotFound);
    }

    #[rstest]
    #[case(b"".to_vec(), 0)]
    #[case(b"abc".to_vec(), 3)]
    #[case(vec![0u8; 16], 16)]
    #[case(vec![0u8; 37], 37)]
    fn input_offset_finds_end_of_prefix(#[case] prefix: Vec<u8>, #[case] expected: usize) {
        let oracle = EcbSuffixOracle::new(b"YELLOW SUBMARINE", b"secret".to_vec())
            .unwrap()
            .with_prefix(Prefix::Fixed(prefix));

        assert_eq!(input_offset(&oracle, 16).unwrap(), expected);
    }

    #[test]
    fn input_offset_of_comment_victims() {
        let cbc = CbcCommentVictim::new(b"YELLOW SUBMARINE").unwrap();
        let ctr = CtrCommentVictim::new(b"YELLOW SUBMARINE").unwrap();

        assert_eq!(input_offset(&cbc, 16).unwrap(), 32);
        assert_eq!(input_offset(&ctr, 1).unwrap(), 32);
    }

    #[test]
    fn input_offset_fails_if_output_ignores_input() {
        let err = input_offset(&Constant, 16).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OracleContract);
    }
}
