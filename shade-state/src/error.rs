//! Error types for the Shade state.

use thiserror::Error;

use shade_chain::{
    block,
    dex::{BatchError, TradingPair},
    note::Nullifier,
    tree,
};

/// A boxed [`std::error::Error`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error describing why an action is invalid in the context of the
/// current state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidateContextError {
    /// The nullifier was already spent, either by a finalized block or by an
    /// earlier claim in the block in progress.
    #[error(
        "nullifier {nullifier:?} was already spent in {}",
        if *in_finalized_state { "a finalized block" } else { "the block in progress" }
    )]
    DuplicateNullifier {
        /// The duplicated nullifier.
        nullifier: Nullifier,
        /// Whether the earlier spend is finalized.
        in_finalized_state: bool,
    },
}

/// An error describing why a block lifecycle request failed.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum CommitBlockError {
    #[error("no block is in progress")]
    NoBlockInProgress,

    #[error("block {height:?} is already in progress")]
    BlockInProgress { height: block::Height },

    #[error("expected the next block to be {expected:?}, but got {actual:?}")]
    UnexpectedHeight {
        expected: Option<block::Height>,
        actual: block::Height,
    },

    #[error("block {height:?} is sealed and can't accept more actions")]
    BlockSealed { height: block::Height },

    #[error("block {height:?} must be sealed before it is committed")]
    NotSealed { height: block::Height },

    #[error("block has swap flows for {0:?}, but no batch output data")]
    MissingBatch(TradingPair),

    #[error("block has batch output data for {0:?}, but no swap flows")]
    UnexpectedBatch(TradingPair),

    #[error("invalid batch output data")]
    Batch(#[from] BatchError),

    #[error("could not write the finalized block")]
    Store(#[from] StoreError),
}

/// An error from a finalized state store.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum StoreError {
    #[error("nullifier {0:?} is already in the finalized state")]
    DoubleSpend(Nullifier),

    #[error("anchor {0:?} already has batch output data")]
    DuplicateAnchor(tree::Root),

    #[error("block {actual:?} does not extend the finalized tip {tip:?}")]
    NotNextBlock {
        tip: Option<block::Height>,
        actual: block::Height,
    },

    #[error("database error")]
    Database(#[from] sled::Error),

    #[error("could not encode or decode a database record")]
    Format(#[from] bincode::Error),

    #[error("database record is corrupt: {0}")]
    Corrupt(&'static str),
}
