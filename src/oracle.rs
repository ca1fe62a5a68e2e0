// The capabilities a victim exposes to an attacker.
//
// Attacks only ever see these traits. Whatever key, secret or random state
// sits behind them stays owned by the victim.
use crate::Result;

/// Encrypts attacker-chosen bytes, possibly surrounded by victim data.
pub trait EncryptionOracle {
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>>;
}

/// Says whether a CBC ciphertext decrypts to validly padded plaintext.
pub trait PaddingOracle {
    fn is_valid_padding(&self, ciphertext: &[u8], iv: &[u8]) -> bool;
}

/// Hands out fresh `(iv, ciphertext)` pairs, e.g. a server encrypting one of
/// its messages under a random IV each time it is asked.
pub trait CiphertextSource {
    fn draw(&self) -> Result<(Vec<u8>, Vec<u8>)>;
}

/// Re-encrypts a CTR ciphertext with `new_plaintext` written at `offset`.
pub trait CtrEditOracle {
    fn edit(&self, ciphertext: &[u8], offset: usize, new_plaintext: &[u8]) -> Result<Vec<u8>>;
}

pub trait MacOracle<const N: usize> {
    fn mac(&self, message: &[u8]) -> [u8; N];
}

pub trait VerifyOracle<const N: usize> {
    fn verify(&self, message: &[u8], mac: &[u8; N]) -> bool;
}

/// Decrypts a ciphertext it handed out and says whether the result grants
/// admin rights.
pub trait AdminOracle {
    fn is_admin(&self, ciphertext: &[u8]) -> bool;
}
