//! Checks for nullifier uniqueness.

use std::collections::HashSet;

use tracing::trace;

use shade_chain::note::Nullifier;

use crate::{service::finalized_state::NullifierStore, BoxError, ValidateContextError};

/// Reject double-spends of `nullifier` against the finalized state.
///
/// (Duplicates within the block in progress are rejected when the nullifier
/// is added to it, see [`add_to_pending_unique`] for details.)
///
/// Store errors are returned as they are, so callers can tell a double-spend
/// from a storage failure.
#[tracing::instrument(skip(finalized_state))]
pub(crate) fn no_duplicate_in_finalized_state<S>(
    nullifier: Nullifier,
    finalized_state: &S,
) -> Result<(), BoxError>
where
    S: NullifierStore + ?Sized,
{
    if finalized_state.contains_nullifier(&nullifier)? {
        Err(ValidateContextError::DuplicateNullifier {
            nullifier,
            in_finalized_state: true,
        })?;
    }

    Ok(())
}

/// Provisionally spend `nullifier` in the block in progress, rejecting it if
/// an earlier claim in the same block already spent it.
///
/// The nullifier is only added if it is new.
#[tracing::instrument(skip(pending_nullifiers))]
pub(crate) fn add_to_pending_unique(
    pending_nullifiers: &mut HashSet<Nullifier>,
    nullifier: Nullifier,
) -> Result<(), ValidateContextError> {
    trace!(?nullifier, "adding nullifier");

    // reject the nullifier if it is already pending in this block
    if !pending_nullifiers.insert(nullifier) {
        Err(ValidateContextError::DuplicateNullifier {
            nullifier,
            in_finalized_state: false,
        })?;
    }

    Ok(())
}
