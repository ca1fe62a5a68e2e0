use rand::RngCore;

use crate::modes::{decrypt_ecb, encrypt_ecb, AesCipher, AES_BLOCK_SIZE};
use crate::oracle::{AdminOracle, EncryptionOracle};
use crate::{pkcs7_pad, pkcs7_unpad, Result};

/// Encodes a user profile as `email=<email>&uid=10&role=user`, dropping any
/// `&` or `=` from the email.
pub fn profile_for(email: &[u8]) -> Vec<u8> {
    let mut profile = b"email=".to_vec();
    profile.extend(email.iter().filter(|&&b| b != b'&' && b != b'='));
    profile.extend_from_slice(b"&uid=10&role=user");
    profile
}

/// Hands out user profiles encrypted with AES-ECB under a random key.
///
/// The attacker chooses the email; the victim chooses everything else.
#[derive(Debug)]
pub struct ProfileVictim {
    cipher: AesCipher,
}

impl ProfileVictim {
    pub fn new() -> Result<Self> {
        let mut key = [0u8; AES_BLOCK_SIZE];
        rand::thread_rng().fill_bytes(&mut key);
        Ok(Self {
            cipher: AesCipher::new(&key)?,
        })
    }

    /// The role field of an encrypted profile, if it decrypts and parses.
    pub fn role(&self, ciphertext: &[u8]) -> Option<Vec<u8>> {
        let mut plaintext = decrypt_ecb(&self.cipher, ciphertext).ok()?;
        pkcs7_unpad(&mut plaintext, AES_BLOCK_SIZE).ok()?;
        plaintext
            .split(|&b| b == b'&')
            .filter_map(|field| {
                let eq = field.iter().position(|&b| b == b'=')?;
                Some((&field[..eq], &field[eq + 1..]))
            })
            .find(|(key, _)| *key == b"role")
            .map(|(_, value)| value.to_vec())
    }
}

impl EncryptionOracle for ProfileVictim {
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>> {
        encrypt_ecb(&self.cipher, &pkcs7_pad(&profile_for(input), AES_BLOCK_SIZE)?)
    }
}

impl AdminOracle for ProfileVictim {
    fn is_admin(&self, ciphertext: &[u8]) -> bool {
        self.role(ciphertext).as_deref() == Some(b"admin".as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(b"foo@bar.com", b"email=foo@bar.com&uid=10&role=user")]
    #[case(b"foo@bar.com&role=admin", b"email=foo@bar.comroleadmin&uid=10&role=user")]
    #[case(b"", b"email=&uid=10&role=user")]
    fn profile_for_encodes_email(#[case] email: &[u8], #[case] expected: &[u8]) {
        assert_eq!(profile_for(email), expected);
    }

    #[test]
    fn role_reads_back_encrypted_profile() {
        let victim = ProfileVictim::new().unwrap();

        let ciphertext = victim.encrypt(b"foo@bar.com&role=admin").unwrap();

        assert_eq!(victim.role(&ciphertext), Some(b"user".to_vec()));
        assert!(!victim.is_admin(&ciphertext));
    }

    #[test]
    fn role_of_garbage_is_none() {
        let victim = ProfileVictim::new().unwrap();

        assert_eq!(victim.role(&[0u8; 15]), None);
        assert_eq!(victim.role(&[]), None);
    }
}
