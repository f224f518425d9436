//! The block in progress.

use std::{collections::HashSet, mem};

use shade_chain::{
    block,
    dex::{BatchSwapOutputData, BlockFlows, BlockOutputs, MockFlowCiphertext, TradingPair},
    note::Nullifier,
    tree,
};

use crate::{
    service::{check, finalized_state::FinalizedBlock},
    CommitBlockError, ValidateContextError,
};

/// The actions admitted to a block that has not been finalized yet.
///
/// Nothing here is visible to later blocks until the block is committed.
/// Dropping a pending block discards its flows and nullifiers.
#[derive(Clone, Debug)]
pub(crate) struct PendingBlock {
    height: block::Height,
    flows: BlockFlows,
    nullifiers: HashSet<Nullifier>,
    sealed: bool,
}

impl PendingBlock {
    pub fn new(height: block::Height) -> Self {
        Self {
            height,
            flows: BlockFlows::new(),
            nullifiers: HashSet::new(),
            sealed: false,
        }
    }

    pub fn height(&self) -> block::Height {
        self.height
    }

    fn check_open(&self) -> Result<(), CommitBlockError> {
        if self.sealed {
            return Err(CommitBlockError::BlockSealed {
                height: self.height,
            });
        }

        Ok(())
    }

    /// Fold a swap's flow ciphertexts into the block's aggregates.
    pub fn admit_swap(
        &mut self,
        trading_pair: TradingPair,
        enc_amount_1: MockFlowCiphertext,
        enc_amount_2: MockFlowCiphertext,
    ) -> Result<(), CommitBlockError> {
        self.check_open()?;

        self.flows = mem::take(&mut self.flows).fold(trading_pair, enc_amount_1, enc_amount_2);

        Ok(())
    }

    /// Returns `true` if a claim in this block spent `nullifier`.
    pub fn contains_nullifier(&self, nullifier: &Nullifier) -> bool {
        self.nullifiers.contains(nullifier)
    }

    /// Check that the block is open for new claims.
    pub fn check_open_for_spend(&self) -> Result<(), CommitBlockError> {
        self.check_open()
    }

    /// Provisionally spend `nullifier`.
    ///
    /// The caller must already have checked the finalized state.
    pub fn spend_nullifier(&mut self, nullifier: Nullifier) -> Result<(), ValidateContextError> {
        check::nullifier::add_to_pending_unique(&mut self.nullifiers, nullifier)
    }

    /// Stop accepting actions, and return the block's aggregate flows.
    ///
    /// Sealing twice returns the same flows.
    pub fn seal(&mut self) -> BlockFlows {
        self.sealed = true;
        self.flows.clone()
    }

    /// Build the finalized block from its batch outputs.
    ///
    /// There must be exactly one batch for each trading pair with flows.
    pub fn finalize(
        &self,
        anchor: tree::Root,
        outputs: Vec<BatchSwapOutputData>,
    ) -> Result<FinalizedBlock, CommitBlockError> {
        if !self.sealed {
            return Err(CommitBlockError::NotSealed {
                height: self.height,
            });
        }

        let outputs = BlockOutputs::new(self.height, anchor, outputs)?;

        if let Some((pair, _)) = self
            .flows
            .iter()
            .find(|(pair, _)| outputs.get(pair).is_none())
        {
            return Err(CommitBlockError::MissingBatch(*pair));
        }

        if let Some(batch) = outputs
            .batches()
            .find(|batch| self.flows.get(&batch.trading_pair()).is_none())
        {
            return Err(CommitBlockError::UnexpectedBatch(batch.trading_pair()));
        }

        Ok(FinalizedBlock {
            outputs,
            nullifiers: self.nullifiers.iter().copied().collect(),
        })
    }
}
