//! Concrete oracles that own a secret and expose it only through the oracle
//! traits, for exercising the attacks end to end.
mod cbc;
mod comment;
mod ctr;
mod ecb;
mod mac;
mod profile;

pub use cbc::CbcPaddingVictim;
pub use comment::{CbcCommentVictim, CtrCommentVictim};
pub use ctr::CtrEditVictim;
pub use ecb::{EcbOrCbcOracle, EcbSuffixOracle, Prefix};
pub use mac::KeyedMacVictim;
pub use profile::{profile_for, ProfileVictim};
