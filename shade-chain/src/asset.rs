//! Asset identifiers.

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{fmt::HexDebug, proto, serialization::SerializationError};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// The denomination of the single-unit note that entitles its owner to claim
/// the outputs of a swap.
pub const SWAP_NFT_DENOM: &str = "swap_nft";

static SWAP_NFT_ID: Lazy<Id> = Lazy::new(|| Id::from_denom(SWAP_NFT_DENOM));

/// An opaque identifier for a fungible asset.
///
/// Identifiers are totally ordered by their bytes, which is the order used
/// to canonicalize [`TradingPair`](crate::dex::TradingPair)s.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Id(pub HexDebug<[u8; 32]>);

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("asset::Id")
            .field(&hex::encode(self.0 .0))
            .finish()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Id {
    /// Derive the identifier of the asset with denomination `denom`.
    ///
    /// Id := BLAKE2b-256("Shade_AssetId", denom)
    pub fn from_denom(denom: &str) -> Id {
        let hash = blake2b_simd::Params::new()
            .hash_length(32)
            .personal(b"Shade_AssetId")
            .to_state()
            .update(denom.as_bytes())
            .finalize();

        let mut bytes = [0; 32];
        bytes.copy_from_slice(hash.as_bytes());

        Id(HexDebug(bytes))
    }

    /// The identifier of the fixed swap NFT denomination.
    pub fn swap_nft() -> Id {
        *SWAP_NFT_ID
    }

    /// Returns the raw identifier bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0 .0
    }
}

impl From<[u8; 32]> for Id {
    fn from(bytes: [u8; 32]) -> Self {
        Id(HexDebug(bytes))
    }
}

impl From<Id> for proto::AssetId {
    fn from(id: Id) -> Self {
        proto::AssetId {
            inner: id.to_bytes().to_vec(),
        }
    }
}

impl TryFrom<proto::AssetId> for Id {
    type Error = SerializationError;

    fn try_from(msg: proto::AssetId) -> Result<Self, Self::Error> {
        let bytes: [u8; 32] = msg
            .inner
            .try_into()
            .map_err(|_| SerializationError::Parse("asset id must be 32 bytes"))?;

        Ok(Id::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denominations_have_distinct_ids() {
        shade_test::init();

        assert_eq!(Id::from_denom("ushade"), Id::from_denom("ushade"));
        assert_ne!(Id::from_denom("ushade"), Id::from_denom("ugold"));
        assert_eq!(Id::swap_nft(), Id::from_denom(SWAP_NFT_DENOM));
    }

    #[test]
    fn short_wire_ids_are_rejected() {
        shade_test::init();

        let msg = proto::AssetId {
            inner: vec![1; 31],
        };

        assert!(matches!(
            Id::try_from(msg),
            Err(SerializationError::Parse(_))
        ));
    }
}
