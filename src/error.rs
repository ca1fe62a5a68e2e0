use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad classes of failure, so callers can tell misuse of the API apart from
/// a misbehaving oracle or an attack that ran out of candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Misuse,
    OracleContract,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid key length {0}, expected 16, 24 or 32 bytes")]
    InvalidKeyLength(usize),

    #[error("invalid {what} length {actual}, expected {expected}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid block size {0}, expected 1 to 255 bytes")]
    InvalidBlockSize(usize),

    #[error("buffers are not of equal length ({0} != {1})")]
    LengthMismatch(usize, usize),

    #[error("offset {offset} is past the end of a {len} byte ciphertext")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("invalid pkcs7 padding")]
    InvalidPadding,

    #[error("{len} byte ciphertext is not a multiple of the {block_size} byte block size")]
    NotBlockAligned { len: usize, block_size: usize },

    #[error("oracle contract violated: {0}")]
    OracleContract(String),

    #[error("could not detect the oracle's block size")]
    BlockSizeNotFound,

    #[error("oracle is not encrypting with ECB")]
    NotEcb,

    #[error("ciphertext block for secret byte {position} is not in the lookup table")]
    ByteNotInTable { position: usize },

    #[error("no byte value gives valid padding for byte {byte} of block {block}")]
    PaddingSearchExhausted { block: usize, byte: usize },

    #[error("no key length in {start}..{end} produced an accepted forgery")]
    ForgeryRejected { start: usize, end: usize },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidKeyLength(_)
            | Error::InvalidLength { .. }
            | Error::InvalidBlockSize(_)
            | Error::LengthMismatch(..)
            | Error::OffsetOutOfRange { .. }
            | Error::InvalidPadding => ErrorKind::Misuse,
            Error::NotBlockAligned { .. } | Error::OracleContract(_) => ErrorKind::OracleContract,
            Error::BlockSizeNotFound
            | Error::NotEcb
            | Error::ByteNotInTable { .. }
            | Error::PaddingSearchExhausted { .. }
            | Error::ForgeryRejected { .. } => ErrorKind::Exhausted,
        }
    }
}
