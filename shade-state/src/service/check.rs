//! Consensus critical contextual checks

use shade_chain::block;

use crate::CommitBlockError;

use super::finalized_state::next_height;

pub(crate) mod nullifier;


/// Check that a block at `height` can start on top of the finalized tip
/// `finalized_tip_height`.
///
/// Blocks are finalized strictly in height order, without gaps.
#[tracing::instrument]
pub(crate) fn block_extends_finalized_tip(
    finalized_tip_height: Option<block::Height>,
    height: block::Height,
) -> Result<(), CommitBlockError> {
    let expected = next_height(finalized_tip_height);

    if expected != Some(height) {
        Err(CommitBlockError::UnexpectedHeight {
            expected,
            actual: height,
        })?;
    }

    Ok(())
}
