use shade_chain::{
    block,
    dex::{BatchSwapOutputData, MockFlowCiphertext, TradingPair},
    note::Nullifier,
    tree,
};

/// A request to the state service.
///
/// Blocks go through a fixed lifecycle: [`Request::BeginBlock`], any number
/// of [`Request::AdmitSwap`] and [`Request::SpendNullifier`] requests,
/// [`Request::SealBlock`], then [`Request::CommitBlock`]. A block in progress
/// can be dropped with [`Request::AbandonBlock`] at any point before it is
/// committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// Start a new block in progress at `height`.
    ///
    /// `height` must be the height after the finalized tip, or
    /// [`block::Height::MIN`] for the first block.
    ///
    /// Returns [`Response::Began`](crate::Response::Began).
    BeginBlock {
        /// The height of the new block.
        height: block::Height,
    },

    /// Fold a validated swap's flow ciphertexts into the block in progress.
    ///
    /// Returns [`Response::Admitted`](crate::Response::Admitted).
    AdmitSwap {
        /// The swap's trading pair.
        trading_pair: TradingPair,
        /// The encrypted `asset_1` contribution.
        enc_amount_1: MockFlowCiphertext,
        /// The encrypted `asset_2` contribution.
        enc_amount_2: MockFlowCiphertext,
    },

    /// Provisionally spend a claim's nullifier in the block in progress.
    ///
    /// Fails with [`ValidateContextError::DuplicateNullifier`](crate::ValidateContextError)
    /// if the nullifier is already spent. The check and the insert are a
    /// single request, so exactly one of two concurrent spends succeeds.
    ///
    /// Returns [`Response::Spent`](crate::Response::Spent).
    SpendNullifier(Nullifier),

    /// Stop accepting actions for the block in progress, and return its
    /// aggregate flows.
    ///
    /// Returns [`Response::Sealed`](crate::Response::Sealed).
    SealBlock,

    /// Finalize the sealed block in progress, with note commitment tree root
    /// `anchor` and one batch per trading pair with flows.
    ///
    /// Writes the block's batch outputs and spent nullifiers to the finalized
    /// state atomically.
    ///
    /// Returns [`Response::Committed`](crate::Response::Committed).
    CommitBlock {
        /// The root that claims against this block reference.
        anchor: tree::Root,
        /// The batch output data for each trading pair.
        outputs: Vec<BatchSwapOutputData>,
    },

    /// Drop the block in progress, with its flows and provisional nullifiers.
    ///
    /// Returns [`Response::Abandoned`](crate::Response::Abandoned).
    AbandonBlock,

    /// Look up the batch outputs of the finalized block with root `anchor`.
    ///
    /// Returns [`Response::Anchor`](crate::Response::Anchor).
    LookupAnchor(tree::Root),

    /// Check whether a nullifier is spent, in the finalized state or in the
    /// block in progress.
    ///
    /// Returns [`Response::ContainsNullifier`](crate::Response::ContainsNullifier).
    ContainsNullifier(Nullifier),

    /// Returns [`Response::Tip`](crate::Response::Tip) with the finalized tip
    /// height.
    Tip,
}

impl Request {
    /// A short name for the request, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::BeginBlock { .. } => "begin_block",
            Request::AdmitSwap { .. } => "admit_swap",
            Request::SpendNullifier(_) => "spend_nullifier",
            Request::SealBlock => "seal_block",
            Request::CommitBlock { .. } => "commit_block",
            Request::AbandonBlock => "abandon_block",
            Request::LookupAnchor(_) => "lookup_anchor",
            Request::ContainsNullifier(_) => "contains_nullifier",
            Request::Tip => "tip",
        }
    }
}
