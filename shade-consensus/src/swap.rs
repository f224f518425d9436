//! Semantic verification of swaps.

use tracing::instrument;

use shade_chain::dex::Swap;

use crate::{check, error::ActionError, primitives::proof::ProofVerifier};

/// Verify a swap in isolation, before it is admitted to a block.
///
/// Checks, in order:
/// 1. the proof is valid for the swap's commitments, pair, flow ciphertexts,
///    and swap NFT commitment and declared value,
/// 2. the swap NFT is one unit of the swap NFT denomination, and
/// 3. the trading pair is canonical.
///
/// Verification reads no state and changes nothing, so swaps can be verified
/// in any order, and in parallel.
#[instrument(skip(swap, verifier), fields(trading_pair = ?swap.body.trading_pair))]
pub fn verify_swap<V>(swap: &Swap, verifier: &V) -> Result<(), ActionError>
where
    V: ProofVerifier + ?Sized,
{
    check::proof_is_valid(verifier, swap)?;
    check::swap_nft_is_well_formed(&swap.body.swap_nft)?;
    check::trading_pair_is_canonical(&swap.body.trading_pair)?;

    Ok(())
}
