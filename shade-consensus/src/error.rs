//! Errors that can occur when checking settlement rules.
//!
//! Each [`ActionError`] variant corresponds to a rule, so enumerating all
//! possible verification failures enumerates the rules we implement, and
//! ensures that we don't reject an action for a non-enumerated reason.

use thiserror::Error;

use shade_chain::{dex::BatchError, note::Nullifier, tree};
use shade_state::{CommitBlockError, ValidateContextError};

use crate::BoxError;

/// Why a single swap or swap claim was rejected.
///
/// A rejected action is excluded from its block. It never aborts the
/// processing of other actions, and never changes the state.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ActionError {
    #[error("zkproof MUST be valid for the action's public inputs")]
    ProofInvalid,

    #[error("swap NFT MUST be exactly one unit of the swap NFT denomination")]
    MalformedSwapNft,

    #[error("trading pair MUST be in canonical order")]
    NonCanonicalPair,

    #[error("claim anchor {0:?} MUST be the root of a finalized block")]
    UnknownAnchor(tree::Root),

    #[error("nullifier {0:?} MUST NOT already be spent")]
    DoubleSpend(Nullifier),

    #[error("claim prices MUST match the batch output data recorded for its anchor and pair")]
    StalePrice,

    #[error("state service failed: {0}")]
    State(String),
}

impl ActionError {
    /// A short name for the error, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionError::ProofInvalid => "proof_invalid",
            ActionError::MalformedSwapNft => "malformed_swap_nft",
            ActionError::NonCanonicalPair => "non_canonical_pair",
            ActionError::UnknownAnchor(_) => "unknown_anchor",
            ActionError::DoubleSpend(_) => "double_spend",
            ActionError::StalePrice => "stale_price",
            ActionError::State(_) => "state",
        }
    }
}

impl From<BoxError> for ActionError {
    fn from(err: BoxError) -> Self {
        let err = match err.downcast::<ActionError>() {
            Ok(e) => return *e,
            Err(e) => e,
        };

        match err.downcast::<ValidateContextError>() {
            Ok(e) => match *e {
                ValidateContextError::DuplicateNullifier { nullifier, .. } => {
                    ActionError::DoubleSpend(nullifier)
                }
                other => ActionError::State(other.to_string()),
            },
            Err(e) => ActionError::State(e.to_string()),
        }
    }
}

/// Why a block could not be started, finalized, or abandoned.
#[derive(Error, Debug)]
pub enum BlockError {
    #[error("no block is in progress")]
    NoBlockInProgress,

    #[error("state service rejected the block")]
    Commit(#[from] CommitBlockError),

    #[error("aggregate flows can't be settled")]
    Batch(#[from] BatchError),

    #[error("state service failed: {0}")]
    State(BoxError),
}

impl From<BoxError> for BlockError {
    fn from(err: BoxError) -> Self {
        match err.downcast::<CommitBlockError>() {
            Ok(e) => match *e {
                CommitBlockError::NoBlockInProgress => BlockError::NoBlockInProgress,
                other => BlockError::Commit(other),
            },
            Err(e) => BlockError::State(e),
        }
    }
}
