use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    fmt::HexDebug, keys::NullifierDerivingKey, serialization::SerializationError,
    tree::Position,
};

use super::Commitment;

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// Invokes Blake2s-256 as the nullifier PRF.
///
/// PRF^nf(nk, pos, cm) := BLAKE2s-256("Shade_nf", nk || LE64(pos) || cm)
fn prf_nf(nk: [u8; 32], position: Position, cm: [u8; 32]) -> [u8; 32] {
    let hash = blake2s_simd::Params::new()
        .hash_length(32)
        .personal(b"Shade_nf")
        .to_state()
        .update(&nk[..])
        .update(&position.0.to_le_bytes()[..])
        .update(&cm[..])
        .finalize();

    *hash.as_array()
}

/// A nullifier, revealed when a note is spent.
///
/// Each nullifier can be revealed at most once in the ledger's history.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Nullifier(pub HexDebug<[u8; 32]>);

impl fmt::Debug for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Nullifier")
            .field(&hex::encode(self.0 .0))
            .finish()
    }
}

impl Nullifier {
    /// Derive the nullifier of the note with commitment `cm` at `position`.
    pub fn derive(nk: NullifierDerivingKey, position: Position, cm: Commitment) -> Nullifier {
        Nullifier(HexDebug(prf_nf(nk.into(), position, cm.to_bytes())))
    }

    /// Returns the raw nullifier bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0 .0
    }
}

impl From<[u8; 32]> for Nullifier {
    fn from(bytes: [u8; 32]) -> Self {
        Nullifier(HexDebug(bytes))
    }
}

impl TryFrom<Vec<u8>> for Nullifier {
    type Error = SerializationError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SerializationError::Parse("nullifier must be 32 bytes"))?;

        Ok(Nullifier::from(bytes))
    }
}
