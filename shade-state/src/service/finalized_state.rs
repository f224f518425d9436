//! The finalized state: spent nullifiers and the batch output data of every
//! finalized block.
//!
//! Finalized data is never rolled back. Stores apply each finalized block
//! atomically: either all its nullifiers, its outputs, and the new tip are
//! written, or none of them are.

use std::sync::Arc;

use shade_chain::{block, dex::BlockOutputs, note::Nullifier, tree};

use crate::StoreError;

mod memory;
mod sled_format;
mod sled_store;


pub use memory::MemoryStore;
pub use sled_store::SledStore;

/// A set of spent nullifiers.
///
/// Nullifiers are only written by [`FinalizedState::commit_block`].
pub trait NullifierStore: Send + Sync + 'static {
    /// Returns `true` if `nullifier` has been spent.
    fn contains_nullifier(&self, nullifier: &Nullifier) -> Result<bool, StoreError>;
}

/// Storage for finalized blocks.
pub trait FinalizedState: NullifierStore {
    /// Returns the height of the last finalized block.
    fn tip(&self) -> Result<Option<block::Height>, StoreError>;

    /// Returns the batch outputs of the finalized block with root `anchor`.
    fn lookup_anchor(&self, anchor: &tree::Root) -> Result<Option<Arc<BlockOutputs>>, StoreError>;

    /// Atomically write a finalized block.
    ///
    /// The block must be the next block after [`FinalizedState::tip`], its
    /// anchor must be new, and none of its nullifiers can already be spent.
    /// When two callers commit concurrently, at most one of them succeeds.
    fn commit_block(&self, block: FinalizedBlock) -> Result<(), StoreError>;
}

/// A block that is ready to be written to the finalized state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizedBlock {
    /// The batch outputs published by the block, with its height and anchor.
    pub outputs: BlockOutputs,

    /// The nullifiers spent by the block's claims.
    pub nullifiers: Vec<Nullifier>,
}

impl FinalizedBlock {
    /// The height of the block.
    pub fn height(&self) -> block::Height {
        self.outputs.height()
    }

    /// The note commitment tree root of the block.
    pub fn anchor(&self) -> tree::Root {
        self.outputs.anchor()
    }
}

/// Returns the height of the block after `tip`, or [`block::Height::MIN`] if
/// nothing has been finalized.
pub(crate) fn next_height(tip: Option<block::Height>) -> Option<block::Height> {
    match tip {
        Some(tip) => tip.next(),
        None => Some(block::Height::MIN),
    }
}

impl<S: NullifierStore + ?Sized> NullifierStore for Arc<S> {
    fn contains_nullifier(&self, nullifier: &Nullifier) -> Result<bool, StoreError> {
        self.as_ref().contains_nullifier(nullifier)
    }
}

impl<S: FinalizedState + ?Sized> FinalizedState for Arc<S> {
    fn tip(&self) -> Result<Option<block::Height>, StoreError> {
        self.as_ref().tip()
    }

    fn lookup_anchor(&self, anchor: &tree::Root) -> Result<Option<Arc<BlockOutputs>>, StoreError> {
        self.as_ref().lookup_anchor(anchor)
    }

    fn commit_block(&self, block: FinalizedBlock) -> Result<(), StoreError> {
        self.as_ref().commit_block(block)
    }
}
