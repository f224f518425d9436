use std::sync::Arc;

use shade_chain::{
    block,
    dex::{BlockFlows, BlockOutputs},
    note::Nullifier,
};

/// A response to a state [`Request`](crate::Request).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// The block at this height is now in progress.
    Began(block::Height),

    /// The swap's flows were folded into the block in progress.
    Admitted,

    /// The nullifier is provisionally spent in the block in progress.
    Spent(Nullifier),

    /// The block in progress is sealed, with these aggregate flows.
    Sealed {
        /// The height of the sealed block.
        height: block::Height,
        /// The block's aggregate swap flows.
        flows: BlockFlows,
    },

    /// The block at this height is finalized.
    Committed(block::Height),

    /// The block in progress at this height was dropped, if there was one.
    Abandoned(Option<block::Height>),

    /// The batch outputs recorded for an anchor, if it is known.
    Anchor(Option<Arc<BlockOutputs>>),

    /// Whether the nullifier is spent.
    ContainsNullifier(bool),

    /// The finalized tip height, if any block has been finalized.
    Tip(Option<block::Height>),
}
