use std::{fmt, path::Path, sync::Arc};

use sled::{
    transaction::{ConflictableTransactionError, ConflictableTransactionResult, TransactionError},
    Transactional,
};

use shade_chain::{block, dex::BlockOutputs, note::Nullifier, tree};

use crate::{
    constants::{ANCHOR_BY_HEIGHT_TREE, NULLIFIERS_TREE, OUTPUTS_BY_ANCHOR_TREE},
    Config, StoreError,
};

use super::{
    next_height,
    sled_format::{FromSled, IntoSled},
    FinalizedBlock, FinalizedState, NullifierStore,
};

/// Nullifier records have no value, only a key.
const SPENT: &[u8] = &[];

/// The name of the tree holding single-value metadata records.
const META_TREE: &[u8] = b"meta";

/// The key of the finalized tip height, in [`META_TREE`].
const TIP_KEY: &[u8] = b"tip";

/// A finalized state stored in a sled database.
///
/// Block commits use a transaction over all the trees, so the store can be
/// shared between threads.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    nullifiers: sled::Tree,
    outputs_by_anchor: sled::Tree,
    anchor_by_height: sled::Tree,
    meta: sled::Tree,
}

impl fmt::Debug for SledStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SledStore")
            .field("nullifiers", &self.nullifiers.len())
            .field("blocks", &self.anchor_by_height.len())
            .finish()
    }
}

impl SledStore {
    /// Open the finalized state database described by `config`.
    pub fn open(config: &Config) -> Result<Self, StoreError> {
        Self::from_db(config.sled_config().open()?)
    }

    /// Open the finalized state database at `path`.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_db(sled::open(path)?)
    }

    fn from_db(db: sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            nullifiers: db.open_tree(NULLIFIERS_TREE)?,
            outputs_by_anchor: db.open_tree(OUTPUTS_BY_ANCHOR_TREE)?,
            anchor_by_height: db.open_tree(ANCHOR_BY_HEIGHT_TREE)?,
            meta: db.open_tree(META_TREE)?,
            db,
        })
    }

    /// Returns the anchor of the finalized block at `height`.
    pub fn anchor_at(&self, height: block::Height) -> Result<Option<tree::Root>, StoreError> {
        self.anchor_by_height
            .get(height.as_bytes())?
            .map(tree::Root::from_ivec)
            .transpose()
    }

    /// Flush all writes to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

fn abort<T>(error: StoreError) -> ConflictableTransactionResult<T, StoreError> {
    Err(ConflictableTransactionError::Abort(error))
}

impl NullifierStore for SledStore {
    fn contains_nullifier(&self, nullifier: &Nullifier) -> Result<bool, StoreError> {
        Ok(self.nullifiers.contains_key(nullifier.as_bytes())?)
    }
}

impl FinalizedState for SledStore {
    fn tip(&self) -> Result<Option<block::Height>, StoreError> {
        self.meta
            .get(TIP_KEY)?
            .map(block::Height::from_ivec)
            .transpose()
    }

    fn lookup_anchor(&self, anchor: &tree::Root) -> Result<Option<Arc<BlockOutputs>>, StoreError> {
        self.outputs_by_anchor
            .get(anchor.as_bytes())?
            .map(Arc::<BlockOutputs>::from_ivec)
            .transpose()
    }

    #[tracing::instrument(skip(self, block), fields(height = ?block.height()))]
    fn commit_block(&self, block: FinalizedBlock) -> Result<(), StoreError> {
        let height = block.height();
        let height_bytes = height.as_bytes();
        let anchor = block.anchor();
        let anchor_bytes = anchor.as_bytes();
        let outputs_bytes = bincode::serialize(&block.outputs)?;

        (
            &self.nullifiers,
            &self.outputs_by_anchor,
            &self.anchor_by_height,
            &self.meta,
        )
            .transaction(
                |(nullifiers, outputs_by_anchor, anchor_by_height, meta)| -> ConflictableTransactionResult<(), StoreError> {
                    let tip = match meta.get(TIP_KEY)? {
                        Some(bytes) => Some(
                            block::Height::from_ivec(bytes)
                                .map_err(ConflictableTransactionError::Abort)?,
                        ),
                        None => None,
                    };
                    if next_height(tip) != Some(height) {
                        return abort(StoreError::NotNextBlock {
                            tip,
                            actual: height,
                        });
                    }

                    if outputs_by_anchor.get(&anchor_bytes[..])?.is_some() {
                        return abort(StoreError::DuplicateAnchor(anchor));
                    }

                    // The transaction sees its own writes, so this also
                    // rejects nullifiers repeated within the block.
                    for nullifier in &block.nullifiers {
                        let key = nullifier.as_bytes();
                        if nullifiers.insert(&key[..], SPENT)?.is_some() {
                            return abort(StoreError::DoubleSpend(*nullifier));
                        }
                    }

                    outputs_by_anchor.insert(&anchor_bytes[..], outputs_bytes.as_slice())?;
                    anchor_by_height.insert(&height_bytes[..], &anchor_bytes[..])?;
                    meta.insert(TIP_KEY, &height_bytes[..])?;

                    Ok(())
                },
            )
            .map_err(|error| match error {
                TransactionError::Abort(error) => error,
                TransactionError::Storage(error) => error.into(),
            })?;

        tracing::trace!(nullifiers = block.nullifiers.len(), "wrote finalized block");

        Ok(())
    }
}
