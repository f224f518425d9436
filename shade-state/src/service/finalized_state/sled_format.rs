//! Module defining exactly how to move types in and out of sled.
//!
//! Keys are fixed-width byte strings. Heights are big-endian, so that sled's
//! lexicographic key order is height order.

use std::sync::Arc;

use shade_chain::{block, dex::BlockOutputs, note::Nullifier, tree};

use crate::StoreError;

/// Helper trait for defining the exact format used to write a type to sled.
pub trait IntoSled {
    /// The type used to compare a value as a key to other keys stored in a
    /// `sled::Tree`.
    type Bytes: AsRef<[u8]>;

    /// Convert the current type to its sled format, without allocating.
    fn as_bytes(&self) -> Self::Bytes;
}

/// Helper trait for reading types from sled with the correct format.
pub trait FromSled: Sized {
    /// Convert the sled bytes back into the deserialized type.
    fn from_ivec(bytes: sled::IVec) -> Result<Self, StoreError>;
}

fn fixed_width<const N: usize>(bytes: &sled::IVec, what: &'static str) -> Result<[u8; N], StoreError> {
    bytes.as_ref().try_into().map_err(|_| StoreError::Corrupt(what))
}

impl IntoSled for Nullifier {
    type Bytes = [u8; 32];

    fn as_bytes(&self) -> Self::Bytes {
        self.to_bytes()
    }
}

impl FromSled for Nullifier {
    fn from_ivec(bytes: sled::IVec) -> Result<Self, StoreError> {
        Ok(Nullifier::from(fixed_width(&bytes, "nullifiers are 32 bytes")?))
    }
}

impl IntoSled for tree::Root {
    type Bytes = [u8; 32];

    fn as_bytes(&self) -> Self::Bytes {
        self.to_bytes()
    }
}

impl FromSled for tree::Root {
    fn from_ivec(bytes: sled::IVec) -> Result<Self, StoreError> {
        Ok(tree::Root::from(fixed_width(&bytes, "anchors are 32 bytes")?))
    }
}

impl IntoSled for block::Height {
    type Bytes = [u8; 4];

    fn as_bytes(&self) -> Self::Bytes {
        self.0.to_be_bytes()
    }
}

impl FromSled for block::Height {
    fn from_ivec(bytes: sled::IVec) -> Result<Self, StoreError> {
        let height = u32::from_be_bytes(fixed_width(&bytes, "heights are 4 bytes")?);
        Ok(block::Height(height))
    }
}

impl FromSled for Arc<BlockOutputs> {
    fn from_ivec(bytes: sled::IVec) -> Result<Self, StoreError> {
        let outputs: BlockOutputs = bincode::deserialize(bytes.as_ref())?;
        Ok(Arc::new(outputs))
    }
}
