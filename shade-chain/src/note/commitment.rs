use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{fmt::HexDebug, keys::Address, serialization::SerializationError, value::Value};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// A commitment to the contents of a note.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Commitment(pub HexDebug<[u8; 32]>);

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("note::Commitment")
            .field(&hex::encode(self.0 .0))
            .finish()
    }
}

impl Commitment {
    /// Commit to a note carrying `value` to `address`, using the commitment
    /// trapdoor `rcm`.
    ///
    /// cm := BLAKE2s-256("Shade_cm", rcm || b_d || pk_d || asset || LE64(amount))
    pub fn derive(value: &Value, address: &Address, rcm: [u8; 32]) -> Commitment {
        let hash = blake2s_simd::Params::new()
            .hash_length(32)
            .personal(b"Shade_cm")
            .to_state()
            .update(&rcm[..])
            .update(&address.diversified_basepoint[..])
            .update(&address.transmission_key[..])
            .update(&value.asset_id.to_bytes()[..])
            .update(&value.amount.value().to_le_bytes()[..])
            .finalize();

        Commitment(HexDebug(*hash.as_array()))
    }

    /// Returns the raw commitment bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0 .0
    }
}

impl From<[u8; 32]> for Commitment {
    fn from(bytes: [u8; 32]) -> Self {
        Commitment(HexDebug(bytes))
    }
}

impl TryFrom<Vec<u8>> for Commitment {
    type Error = SerializationError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SerializationError::Parse("note commitment must be 32 bytes"))?;

        Ok(Commitment::from(bytes))
    }
}
