//! Note commitment tree roots and positions.
//!
//! The tree itself is maintained by the ledger. Settlement only needs the
//! root of each finalized block's tree, which claims reference as their
//! anchor, and the position of a note, which feeds nullifier derivation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{fmt::HexDebug, serialization::SerializationError};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// The root of a block's note commitment tree, used as a claim anchor.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Root(pub HexDebug<[u8; 32]>);

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("tree::Root")
            .field(&hex::encode(self.0 .0))
            .finish()
    }
}

impl Root {
    /// Returns the raw root bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0 .0
    }
}

impl From<[u8; 32]> for Root {
    fn from(bytes: [u8; 32]) -> Self {
        Root(HexDebug(bytes))
    }
}

impl TryFrom<Vec<u8>> for Root {
    type Error = SerializationError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SerializationError::Parse("anchor must be 32 bytes"))?;

        Ok(Root::from(bytes))
    }
}

/// The position of a note in the note commitment tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Position(pub u64);
