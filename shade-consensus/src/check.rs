//! Stateless semantic checks for swaps and swap claims.
//!
//! Each check returns the [`ActionError`] for the rule it enforces. The
//! order checks run in is fixed by the action verifiers in
//! [`swap`](crate::swap) and [`swap_claim`](crate::swap_claim).

use shade_chain::{
    dex::{BlockOutputs, SwapClaim, SwapPlaintext, TradingPair},
    note::NotePayload,
};

use crate::{
    error::ActionError,
    primitives::proof::{Description, ProofVerifier},
};

#[cfg(test)]
mod tests;

/// Check that the proof of `description` is valid for its public inputs.
pub fn proof_is_valid<V, D>(verifier: &V, description: &D) -> Result<(), ActionError>
where
    V: ProofVerifier + ?Sized,
    D: Description,
{
    if verifier.verify(description.proof(), &description.public_inputs()) {
        metrics::counter!("proofs.verified", 1);
        Ok(())
    } else {
        metrics::counter!("proofs.invalid", 1);
        Err(ActionError::ProofInvalid)
    }
}

/// Check that a swap's NFT payload is tagged as a swap NFT, and declares
/// exactly one unit of the swap NFT denomination.
pub fn swap_nft_is_well_formed(swap_nft: &NotePayload) -> Result<(), ActionError> {
    match swap_nft.swap_nft_value() {
        Some(value) if value == SwapPlaintext::swap_nft_value() => Ok(()),
        _ => Err(ActionError::MalformedSwapNft),
    }
}

/// Check that a submitted trading pair is in canonical order.
///
/// The proof binds the exact pair bytes that were submitted, so a reversed
/// pair is rejected rather than silently reordered.
pub fn trading_pair_is_canonical(trading_pair: &TradingPair) -> Result<(), ActionError> {
    if trading_pair.is_canonical() {
        Ok(())
    } else {
        Err(ActionError::NonCanonicalPair)
    }
}

/// Check that a claim quotes the clearing prices of the batch recorded for
/// its anchor and trading pair.
///
/// A claim for a pair that has no batch at that anchor can't quote valid
/// prices either.
pub fn prices_match_batch(claim: &SwapClaim, outputs: &BlockOutputs) -> Result<(), ActionError> {
    match outputs.get(&claim.trading_pair) {
        Some(batch) if batch.price_1() == claim.price_1 && batch.price_2() == claim.price_2 => {
            Ok(())
        }
        _ => Err(ActionError::StalePrice),
    }
}
