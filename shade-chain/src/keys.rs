//! Key material that settlement handles as opaque bytes.
//!
//! Key derivation happens in wallets. Settlement only carries claim
//! addresses through to output notes, and derives nullifiers from a
//! nullifier deriving key when building test fixtures.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::serialization::SerializationError;

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// A diversified payment address: the diversified basepoint `b_d` and the
/// transmission key `pk_d`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Address {
    /// The diversified basepoint.
    pub diversified_basepoint: [u8; 32],
    /// The transmission key.
    pub transmission_key: [u8; 32],
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Address")
            .field("b_d", &hex::encode(self.diversified_basepoint))
            .field("pk_d", &hex::encode(self.transmission_key))
            .finish()
    }
}

impl Address {
    /// Build an address from its wire encoding.
    pub fn from_wire(b_d: Vec<u8>, pk_d: Vec<u8>) -> Result<Self, SerializationError> {
        Ok(Address {
            diversified_basepoint: b_d
                .try_into()
                .map_err(|_| SerializationError::Parse("b_d must be 32 bytes"))?,
            transmission_key: pk_d
                .try_into()
                .map_err(|_| SerializationError::Parse("pk_d must be 32 bytes"))?,
        })
    }
}

/// The key used to derive the nullifiers of notes received by an address.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct NullifierDerivingKey(pub [u8; 32]);

impl fmt::Debug for NullifierDerivingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NullifierDerivingKey")
            .field(&hex::encode(self.0))
            .finish()
    }
}

impl From<[u8; 32]> for NullifierDerivingKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<NullifierDerivingKey> for [u8; 32] {
    fn from(nk: NullifierDerivingKey) -> [u8; 32] {
        nk.0
    }
}
