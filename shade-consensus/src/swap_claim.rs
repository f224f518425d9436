//! Verification of swap claims.
//!
//! A claim is checked against the state in a fixed order:
//! 1. its anchor is the root of a finalized block, recent enough if an
//!    anchor window is configured,
//! 2. its nullifier is unspent,
//! 3. its trading pair is canonical,
//! 4. its prices match the batch recorded for its anchor and pair, and
//! 5. its proof is valid.
//!
//! Only then is its nullifier spent in the block in progress. The state
//! service applies the spend atomically, so if two claims race to spend the
//! same nullifier, the loser is rejected as a double-spend.

use std::sync::Arc;

use tower::{Service, ServiceExt};
use tracing::instrument;

use shade_chain::{
    dex::{BlockOutputs, SwapClaim},
    note::Nullifier,
    tree,
};
use shade_state as zs;

use crate::{
    check,
    error::ActionError,
    primitives::{proof::ProofVerifier, spawn_fifo},
    BoxError,
};

/// Look up the batch outputs of the finalized block with root `anchor`.
///
/// With `recent_anchors = Some(n)`, only the anchors of the last `n`
/// finalized blocks are accepted. Older anchors are unknown.
pub(crate) async fn lookup_anchor<S>(
    state: S,
    anchor: tree::Root,
    recent_anchors: Option<u32>,
) -> Result<Arc<BlockOutputs>, ActionError>
where
    S: Service<zs::Request, Response = zs::Response, Error = BoxError> + Clone,
{
    let outputs = match state
        .clone()
        .oneshot(zs::Request::LookupAnchor(anchor))
        .await?
    {
        zs::Response::Anchor(Some(outputs)) => outputs,
        zs::Response::Anchor(None) => return Err(ActionError::UnknownAnchor(anchor)),
        _ => unreachable!("wrong response to Request::LookupAnchor"),
    };

    if let Some(window) = recent_anchors {
        let tip = match state.oneshot(zs::Request::Tip).await? {
            zs::Response::Tip(tip) => tip,
            _ => unreachable!("wrong response to Request::Tip"),
        };

        let age = tip.map_or(0, |tip| tip.0.saturating_sub(outputs.height().0));
        if age >= window {
            tracing::debug!(?anchor, age, window, "anchor is outside the recent window");
            return Err(ActionError::UnknownAnchor(anchor));
        }
    }

    Ok(outputs)
}

/// The claim checks that only depend on the batch outputs of its anchor:
/// pair order, prices, then the proof.
pub fn check_against_batch<V>(
    claim: &SwapClaim,
    outputs: &BlockOutputs,
    verifier: &V,
) -> Result<(), ActionError>
where
    V: ProofVerifier + ?Sized,
{
    check::trading_pair_is_canonical(&claim.trading_pair)?;
    check::prices_match_batch(claim, outputs)?;
    check::proof_is_valid(verifier, claim)?;

    Ok(())
}

/// Spend `nullifier` in the block in progress, if it is unspent and the
/// claim's other checks passed.
///
/// An already spent nullifier is reported before `verdict`, so the rejection
/// follows the check order. Nothing is written unless every check passes.
pub(crate) async fn spend_nullifier<S>(
    state: S,
    nullifier: Nullifier,
    verdict: Result<(), ActionError>,
) -> Result<Nullifier, ActionError>
where
    S: Service<zs::Request, Response = zs::Response, Error = BoxError> + Clone,
{
    match state
        .clone()
        .oneshot(zs::Request::ContainsNullifier(nullifier))
        .await?
    {
        zs::Response::ContainsNullifier(true) => return Err(ActionError::DoubleSpend(nullifier)),
        zs::Response::ContainsNullifier(false) => {}
        _ => unreachable!("wrong response to Request::ContainsNullifier"),
    }

    verdict?;

    // A concurrent claim can win the race after the check above. The state
    // rejects the second spend, and the error converts to a double-spend.
    match state.oneshot(zs::Request::SpendNullifier(nullifier)).await? {
        zs::Response::Spent(spent) => Ok(spent),
        _ => unreachable!("wrong response to Request::SpendNullifier"),
    }
}

/// Verify a swap claim against the state, and spend its nullifier in the
/// block in progress.
///
/// Returns the spent nullifier. A rejected claim changes nothing.
///
/// `recent_anchors` limits which anchors are accepted, as in
/// [`Config::recent_anchors`](crate::Config::recent_anchors).
#[instrument(skip(claim, state, verifier), fields(nullifier = ?claim.nullifier))]
pub async fn verify_claim<S, V>(
    claim: Arc<SwapClaim>,
    state: S,
    verifier: Arc<V>,
    recent_anchors: Option<u32>,
) -> Result<Nullifier, ActionError>
where
    S: Service<zs::Request, Response = zs::Response, Error = BoxError> + Clone + Send + 'static,
    S::Future: Send + 'static,
    V: ProofVerifier + ?Sized,
{
    let result: Result<Nullifier, ActionError> = async {
        let outputs = lookup_anchor(state.clone(), claim.anchor, recent_anchors).await?;

        let verdict = {
            let claim = claim.clone();
            spawn_fifo(move || check_against_batch(&claim, &outputs, verifier.as_ref())).await?
        };

        spend_nullifier(state, claim.nullifier, verdict).await
    }
    .await;

    record_claim_verdict(&result);

    result
}

/// Log and count a claim verdict.
pub(crate) fn record_claim_verdict(result: &Result<Nullifier, ActionError>) {
    match result {
        Ok(nullifier) => {
            tracing::debug!(?nullifier, "accepted swap claim");
            metrics::counter!("shade.claims.accepted", 1);
        }
        Err(error) => {
            tracing::debug!(%error, "rejected swap claim");
            metrics::counter!("shade.claims.rejected", 1, "reason" => error.kind());
        }
    }
}
