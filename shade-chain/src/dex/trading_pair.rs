use serde::{Deserialize, Serialize};

use crate::{asset, proto, serialization::SerializationError};

/// An error constructing a [`TradingPair`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradingPairError {
    /// Both sides of the pair are the same asset.
    #[error("a trading pair must reference two distinct assets, got {0:?} twice")]
    SameAsset(asset::Id),
}

/// A pair of distinct assets that can be swapped for each other.
///
/// Pairs built with [`TradingPair::new`] are canonical: `asset_1 < asset_2`,
/// so there is exactly one value per unordered asset pair. Pairs decoded from
/// the wire keep the order the submitter chose, because proofs bind to the
/// submitted bytes. Validation rejects non-canonical pairs instead of
/// silently reordering them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    asset_1: asset::Id,
    asset_2: asset::Id,
}

impl TradingPair {
    /// Returns the canonical pair of `a` and `b`, independent of argument
    /// order.
    pub fn new(a: asset::Id, b: asset::Id) -> Result<Self, TradingPairError> {
        TradingPair::orient(a, b).map(|(pair, _)| pair)
    }

    /// Returns the canonical pair of `a` and `b`, and whether `(a, b)` was
    /// already in canonical order.
    pub fn orient(a: asset::Id, b: asset::Id) -> Result<(Self, bool), TradingPairError> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Ok((
                TradingPair {
                    asset_1: a,
                    asset_2: b,
                },
                true,
            )),
            std::cmp::Ordering::Greater => Ok((
                TradingPair {
                    asset_1: b,
                    asset_2: a,
                },
                false,
            )),
            std::cmp::Ordering::Equal => Err(TradingPairError::SameAsset(a)),
        }
    }

    /// Build a pair in the given order, which might not be canonical.
    pub fn from_raw(asset_1: asset::Id, asset_2: asset::Id) -> Result<Self, TradingPairError> {
        if asset_1 == asset_2 {
            return Err(TradingPairError::SameAsset(asset_1));
        }

        Ok(TradingPair { asset_1, asset_2 })
    }

    /// The first asset of the pair.
    pub fn asset_1(&self) -> asset::Id {
        self.asset_1
    }

    /// The second asset of the pair.
    pub fn asset_2(&self) -> asset::Id {
        self.asset_2
    }

    /// Returns `true` if `asset_1 < asset_2`.
    pub fn is_canonical(&self) -> bool {
        self.asset_1 < self.asset_2
    }

    /// Returns the canonical form of this pair.
    pub fn canonical(&self) -> TradingPair {
        if self.is_canonical() {
            *self
        } else {
            TradingPair {
                asset_1: self.asset_2,
                asset_2: self.asset_1,
            }
        }
    }

    /// Returns `true` if `asset` is one side of this pair.
    pub fn contains(&self, asset: asset::Id) -> bool {
        self.asset_1 == asset || self.asset_2 == asset
    }
}

impl From<TradingPair> for proto::TradingPair {
    fn from(pair: TradingPair) -> Self {
        proto::TradingPair {
            asset_1: Some(pair.asset_1.into()),
            asset_2: Some(pair.asset_2.into()),
        }
    }
}

impl TryFrom<proto::TradingPair> for TradingPair {
    type Error = SerializationError;

    fn try_from(msg: proto::TradingPair) -> Result<Self, Self::Error> {
        let asset_1 = msg
            .asset_1
            .ok_or(SerializationError::MissingField("TradingPair.asset_1"))?
            .try_into()?;
        let asset_2 = msg
            .asset_2
            .ok_or(SerializationError::MissingField("TradingPair.asset_2"))?
            .try_into()?;

        TradingPair::from_raw(asset_1, asset_2)
            .map_err(|_| SerializationError::Parse("trading pair assets must be distinct"))
    }
}
