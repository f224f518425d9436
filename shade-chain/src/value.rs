//! Typed values and homomorphic value commitments.

mod commitment;


use serde::{Deserialize, Serialize};

use crate::{amount::Amount, asset, proto, serialization::SerializationError};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

pub use commitment::{Blinding, Commitment};

/// An amount of a specific asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Value {
    /// The quantity.
    pub amount: Amount,
    /// The asset the quantity is denominated in.
    pub asset_id: asset::Id,
}

impl Value {
    /// Commit to this value using `blinding`.
    pub fn commit(&self, blinding: &Blinding) -> Commitment {
        Commitment::new(*self, blinding)
    }
}

impl From<Value> for proto::Value {
    fn from(value: Value) -> Self {
        proto::Value {
            amount: value.amount.into(),
            asset_id: Some(value.asset_id.into()),
        }
    }
}

impl TryFrom<proto::Value> for Value {
    type Error = SerializationError;

    fn try_from(msg: proto::Value) -> Result<Self, Self::Error> {
        Ok(Value {
            amount: msg.amount.into(),
            asset_id: msg
                .asset_id
                .ok_or(SerializationError::MissingField("Value.asset_id"))?
                .try_into()?,
        })
    }
}
