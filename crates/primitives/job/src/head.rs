use crate::B256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position on the canonical chain.
///
/// Subscribers never do arithmetic on heads: a head is stored, forwarded to
/// the run manager and compared for equality. The default value is the zero
/// head, used before the first head notification arrives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainHead {
    pub number: u64,
    pub hash: B256,
    pub parent_hash: B256,
}

impl ChainHead {
    pub fn new(number: u64, hash: B256, parent_hash: B256) -> Self {
        Self { number, hash, parent_hash }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for ChainHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.number, self.hash)
    }
}
