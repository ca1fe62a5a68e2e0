pub mod attacks;
pub mod config;
mod error;
pub mod hash;
pub mod modes;
pub mod mt19937;
pub mod oracle;
mod pkcs7;
mod score;
pub mod victims;
mod xor;

pub use attacks::Recovered;
pub use error::{Error, ErrorKind, Result};
pub use pkcs7::{is_pkcs7_padded, pkcs7_pad, pkcs7_unpad};
pub use score::english_score;
pub use xor::{hamming_distance, repeating_key_xor, xor_bytes};
