use rand::RngCore;

use crate::modes::{
    decrypt_cbc, decrypt_ctr, encrypt_cbc, encrypt_ctr, AesCipher, AES_BLOCK_SIZE, CTR_NONCE_SIZE,
};
use crate::oracle::{AdminOracle, EncryptionOracle};
use crate::{pkcs7_unpad, Result};

const COMMENT_PREFIX: &[u8] = b"comment1=cooking%20MCs;userdata=";
const COMMENT_SUFFIX: &[u8] = b";comment2=%20like%20a%20pound%20of%20bacon";

/// Wraps user data in the comment string, percent-encoding `;` and `=` so the
/// user can't add fields of their own.
fn comment_for(user_data: &[u8]) -> Vec<u8> {
    let mut plaintext = COMMENT_PREFIX.to_vec();
    for &byte in user_data {
        match byte {
            b';' => plaintext.extend_from_slice(b"%3B"),
            b'=' => plaintext.extend_from_slice(b"%3D"),
            _ => plaintext.push(byte),
        }
    }
    plaintext.extend_from_slice(COMMENT_SUFFIX);
    plaintext
}

fn grants_admin(plaintext: &[u8]) -> bool {
    plaintext
        .split(|&b| b == b';')
        .any(|field| field == b"admin=true")
}

/// Encrypts user comments with AES-CBC under a fixed key and IV.
#[derive(Debug)]
pub struct CbcCommentVictim {
    cipher: AesCipher,
    iv: [u8; AES_BLOCK_SIZE],
}

impl CbcCommentVictim {
    pub fn new(key: &[u8]) -> Result<Self> {
        let mut iv = [0u8; AES_BLOCK_SIZE];
        rand::thread_rng().fill_bytes(&mut iv);
        Ok(Self {
            cipher: AesCipher::new(key)?,
            iv,
        })
    }
}

impl EncryptionOracle for CbcCommentVictim {
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>> {
        encrypt_cbc(&self.cipher, &self.iv, &comment_for(input))
    }
}

impl AdminOracle for CbcCommentVictim {
    fn is_admin(&self, ciphertext: &[u8]) -> bool {
        let Ok(mut plaintext) = decrypt_cbc(&self.cipher, &self.iv, ciphertext) else {
            return false;
        };
        pkcs7_unpad(&mut plaintext, AES_BLOCK_SIZE).is_ok() && grants_admin(&plaintext)
    }
}

/// Encrypts user comments with AES-CTR under a fixed key and nonce.
#[derive(Debug)]
pub struct CtrCommentVictim {
    cipher: AesCipher,
    nonce: [u8; CTR_NONCE_SIZE],
}

impl CtrCommentVictim {
    pub fn new(key: &[u8]) -> Result<Self> {
        let mut nonce = [0u8; CTR_NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);
        Ok(Self {
            cipher: AesCipher::new(key)?,
            nonce,
        })
    }
}

impl EncryptionOracle for CtrCommentVictim {
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(encrypt_ctr(&self.cipher, &self.nonce, &comment_for(input)))
    }
}

impl AdminOracle for CtrCommentVictim {
    fn is_admin(&self, ciphertext: &[u8]) -> bool {
        grants_admin(&decrypt_ctr(&self.cipher, &self.nonce, ciphertext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[test]
    fn comment_for_quotes_field_separators() {
        let plaintext = comment_for(b";admin=true");

        assert_eq!(
            plaintext,
            b"comment1=cooking%20MCs;userdata=%3Badmin%3Dtrue\
              ;comment2=%20like%20a%20pound%20of%20bacon"
                .to_vec()
        );
    }

    #[rstest]
    #[case(b"a;admin=true;b", true)]
    #[case(b"admin=true", true)]
    #[case(b"a;admin=truer;b", false)]
    #[case(b"a;admin=false", false)]
    fn grants_admin_needs_exact_field(#[case] plaintext: &[u8], #[case] expected: bool) {
        assert_eq!(grants_admin(plaintext), expected);
    }

    #[test]
    fn cbc_victim_does_not_grant_admin_to_quoted_input() {
        let victim = CbcCommentVictim::new(b"YELLOW SUBMARINE").unwrap();

        let ciphertext = victim.encrypt(b";admin=true;").unwrap();

        assert!(!victim.is_admin(&ciphertext));
    }

    #[test]
    fn cbc_victim_rejects_partial_blocks() {
        let victim = CbcCommentVictim::new(b"YELLOW SUBMARINE").unwrap();
        let mut ciphertext = victim.encrypt(b"hello").unwrap();
        ciphertext.pop();

        assert!(!victim.is_admin(&ciphertext));
    }

    #[test]
    fn ctr_victim_does_not_grant_admin_to_quoted_input() {
        let victim = CtrCommentVictim::new(b"YELLOW SUBMARINE").unwrap();

        let ciphertext = victim.encrypt(b";admin=true;").unwrap();

        assert_eq!(ciphertext.len(), comment_for(b";admin=true;").len());
        assert!(!victim.is_admin(&ciphertext));
    }
}
