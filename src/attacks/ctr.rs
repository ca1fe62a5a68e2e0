// Breaking "random access read/write" AES-CTR
//
// CTR encryption is an XOR with a keystream, so asking the victim to write
// zeros over the whole message hands back the keystream itself. XOR-ing that
// with the original ciphertext gives the plaintext.
use tracing::{debug, instrument};

use crate::oracle::CtrEditOracle;
use crate::{xor_bytes, Error, Result};

#[instrument(skip_all, fields(len = ciphertext.len()))]
pub fn recover_ctr_plaintext<O>(oracle: &O, ciphertext: &[u8]) -> Result<Vec<u8>>
where
    O: CtrEditOracle + ?Sized,
{
    let keystream = oracle.edit(ciphertext, 0, &vec![0u8; ciphertext.len()])?;
    if keystream.len() != ciphertext.len() {
        return Err(Error::OracleContract(format!(
            "edit of a {} byte ciphertext returned {} bytes",
            ciphertext.len(),
            keystream.len()
        )));
    }
    debug!("recovered keystream from edit oracle");
    xor_bytes(ciphertext, &keystream)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::victims::CtrEditVictim;
    use crate::ErrorKind;

    struct Appending;

    impl CtrEditOracle for Appending {
        fn edit(&self, ciphertext: &[u8], _: usize, _: &[u8]) -> Result<Vec<u8>> {
            let mut edited = ciphertext.to_vec();
            edited.push(0);
            Ok(edited)
        }
    }

    #[test]
    fn recover_ctr_plaintext_recovers_plaintext() {
        let victim = CtrEditVictim::new(b"YELLOW SUBMARINE").unwrap();
        let plaintext: &[u8] = b"I'm back and I'm ringin' the bell \n\
            A rockin' on the mike while the fly girls yell";
        let ciphertext = victim.encrypt(plaintext);

        let recovered = recover_ctr_plaintext(&victim, &ciphertext).unwrap();

        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn recover_ctr_plaintext_of_empty_ciphertext_is_empty() {
        let victim = CtrEditVictim::new(b"YELLOW SUBMARINE").unwrap();

        let recovered = recover_ctr_plaintext(&victim, &[]).unwrap();

        assert!(recovered.is_empty());
    }

    #[test]
    fn recover_ctr_plaintext_rejects_wrong_length_response() {
        let err = recover_ctr_plaintext(&Appending, b"abc").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OracleContract);
    }
}
