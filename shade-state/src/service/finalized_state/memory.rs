use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use shade_chain::{block, dex::BlockOutputs, note::Nullifier, tree};

use crate::StoreError;

use super::{next_height, FinalizedBlock, FinalizedState, NullifierStore};

/// A finalized state held in memory, for tests and ephemeral nodes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    nullifiers: HashSet<Nullifier>,
    outputs_by_anchor: HashMap<tree::Root, Arc<BlockOutputs>>,
    tip: Option<block::Height>,
}

impl MemoryStore {
    /// Returns an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.inner
            .lock()
            .expect("unexpected panic while holding the memory store lock")
    }
}

impl NullifierStore for MemoryStore {
    fn contains_nullifier(&self, nullifier: &Nullifier) -> Result<bool, StoreError> {
        Ok(self.lock().nullifiers.contains(nullifier))
    }
}

impl FinalizedState for MemoryStore {
    fn tip(&self) -> Result<Option<block::Height>, StoreError> {
        Ok(self.lock().tip)
    }

    fn lookup_anchor(&self, anchor: &tree::Root) -> Result<Option<Arc<BlockOutputs>>, StoreError> {
        Ok(self.lock().outputs_by_anchor.get(anchor).cloned())
    }

    fn commit_block(&self, block: FinalizedBlock) -> Result<(), StoreError> {
        let mut state = self.lock();

        let height = block.height();
        if next_height(state.tip) != Some(height) {
            return Err(StoreError::NotNextBlock {
                tip: state.tip,
                actual: height,
            });
        }

        let anchor = block.anchor();
        if state.outputs_by_anchor.contains_key(&anchor) {
            return Err(StoreError::DuplicateAnchor(anchor));
        }

        // Check everything before writing anything.
        let mut new_nullifiers = HashSet::with_capacity(block.nullifiers.len());
        for nullifier in block.nullifiers {
            if state.nullifiers.contains(&nullifier) || !new_nullifiers.insert(nullifier) {
                return Err(StoreError::DoubleSpend(nullifier));
            }
        }

        state.nullifiers.extend(new_nullifiers);
        state
            .outputs_by_anchor
            .insert(anchor, Arc::new(block.outputs));
        state.tip = Some(height);

        Ok(())
    }
}
