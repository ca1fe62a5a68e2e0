pub mod bitflip;
pub mod cbc;
pub mod ctr;
pub mod cut_and_paste;
pub mod ecb;
mod layout;
pub mod length_extension;
pub mod prng;
pub mod xor;

/// The output of an attack whose search is bounded by an iteration cap.
///
/// `Incomplete` carries whatever was recovered before the cap was hit. It is
/// never an error: a partial secret is still worth having.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovered<T> {
    Complete(T),
    Incomplete(T),
}

impl<T> Recovered<T> {
    pub fn is_complete(&self) -> bool {
        matches!(self, Recovered::Complete(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Recovered::Complete(value) | Recovered::Incomplete(value) => value,
        }
    }

    pub fn as_inner(&self) -> &T {
        match self {
            Recovered::Complete(value) | Recovered::Incomplete(value) => value,
        }
    }
}
