// ECB cut-and-paste
//
// ECB encrypts every block on its own, so blocks from different ciphertexts
// under the same key can be spliced together and still decrypt. The victim
// encrypts `...<input>...role=<role>` and we want the role to read
// differently:
//
// 1. Pad the input so the new role starts a block, followed by its PKCS#7
//    padding, and cut that block out of the ciphertext.
//
//        | email=AAAAAAAAAA | admin\x0b...\x0b | &uid=10&role=use | ...
//
// 2. Pick an input length that leaves the current role alone at the start
//    of the last block, so every block before it ends in `role=`.
//
//        | email=AAAAAAAAAA | AAA&uid=10&role= | user\x0c...\x0c |
//
// 3. Swap the last block for the one cut out in step 1.
//
// This needs the role to be the last thing the victim encrypts.
use tracing::{debug, instrument};

use crate::attacks::ecb::detect_ecb;
use crate::attacks::layout::{input_offset, length_step, FILLER};
use crate::config::EcbConfig;
use crate::oracle::EncryptionOracle;
use crate::{pkcs7_pad, Error, Result};

/// Forge a ciphertext whose trailing `current_role` decrypts as `new_role`.
///
/// Both roles must be shorter than a block.
#[instrument(skip_all)]
pub fn cut_and_paste_role<O>(
    oracle: &O,
    current_role: &[u8],
    new_role: &[u8],
    config: &EcbConfig,
) -> Result<Vec<u8>>
where
    O: EncryptionOracle + ?Sized,
{
    let (block_size, step_len) = length_step(oracle, config.max_block_size)?;
    if !detect_ecb(oracle, block_size)? {
        return Err(Error::NotEcb);
    }
    for (what, role) in [("current role", current_role), ("new role", new_role)] {
        if role.len() >= block_size {
            return Err(Error::InvalidLength {
                what,
                expected: block_size - 1,
                actual: role.len(),
            });
        }
    }
    let offset = input_offset(oracle, block_size)?;
    debug!(block_size, offset, step_len, "found input");

    let align = (block_size - offset % block_size) % block_size;
    let mut cut_input = vec![FILLER; align];
    cut_input.extend_from_slice(&pkcs7_pad(new_role, block_size)?);
    let cut = oracle.encrypt(&cut_input)?;
    let start = offset + align;
    let role_block = cut.get(start..start + block_size).ok_or_else(|| {
        Error::OracleContract(format!("{} byte response has no block at {start}", cut.len()))
    })?;

    // `step_len` bytes of input fill the last block exactly. Each byte more
    // pushes one more byte of the role into a block of its own.
    let mut forged = oracle.encrypt(&vec![FILLER; step_len + current_role.len()])?;
    if forged.len() < block_size {
        return Err(Error::OracleContract(format!(
            "{} byte response is shorter than a block",
            forged.len()
        )));
    }
    forged.truncate(forged.len() - block_size);
    forged.extend_from_slice(role_block);
    Ok(forged)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::oracle::AdminOracle;
    use crate::victims::{EcbOrCbcOracle, ProfileVictim};
    use crate::ErrorKind;

    use rstest::rstest;

    #[test]
    fn cut_and_paste_role_grants_admin() {
        let victim = ProfileVictim::new().unwrap();

        let forged = cut_and_paste_role(&victim, b"user", b"admin", &EcbConfig::default()).unwrap();

        assert!(victim.is_admin(&forged));
    }

    #[rstest]
    #[case(b"a")]
    #[case(b"root")]
    #[case(b"superuser")]
    #[case(b"fifteen chars!!")]
    fn cut_and_paste_role_sets_any_short_role(#[case] role: &[u8]) {
        let victim = ProfileVictim::new().unwrap();

        let forged = cut_and_paste_role(&victim, b"user", role, &EcbConfig::default()).unwrap();

        assert_eq!(victim.role(&forged), Some(role.to_vec()));
    }

    #[test]
    fn cut_and_paste_role_rejects_role_of_a_block() {
        let victim = ProfileVictim::new().unwrap();

        let err = cut_and_paste_role(&victim, b"user", b"sixteen chars!!!", &EcbConfig::default())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Misuse);
    }

    #[test]
    fn cut_and_paste_role_rejects_cbc_oracle() {
        let oracle = EcbOrCbcOracle::cbc_only();
        let config = EcbConfig::default();

        let err = cut_and_paste_role(&oracle, b"user", b"admin", &config).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Exhausted);
    }
}
