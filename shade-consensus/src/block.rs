//! Block processing for Shade settlement.
//!
//! Processing occurs in multiple stages:
//!   - context-free verification of swaps and claim proofs (CPU-bound, run on
//!     Rayon)
//!   - anchor lookups for claims (concurrent state requests)
//!   - admission of swap flows and spends of claim nullifiers (sequential,
//!     serialized by the state service)
//!   - clearing of every batch when the block is finalized
//!
//! Processing is provided via a `tower::Service`, so callers can submit
//! actions one at a time as they arrive, or a whole block at once.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures::{future, FutureExt};
use rayon::prelude::*;
use tower::{Service, ServiceExt};
use tracing::Instrument;

use shade_chain::{
    block,
    dex::{BatchSwapOutputData, BlockOutputs, Swap, SwapClaim},
    note::Nullifier,
    tree,
};
use shade_state as zs;

use crate::{
    clearing::settle_block,
    config::{ClearingConfig, Config},
    error::{ActionError, BlockError},
    primitives::{decryption::FlowDecryptor, proof::ProofVerifier, spawn_fifo},
    swap::verify_swap,
    swap_claim::{self, check_against_batch, lookup_anchor, spend_nullifier, verify_claim},
    BoxError,
};


/// A block's actions, submitted together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposedBlock {
    /// The height of the block.
    pub height: block::Height,
    /// The note commitment tree root of the block, which later claims
    /// against this block's batches will reference.
    pub anchor: tree::Root,
    /// The swaps submitted in the block.
    pub swaps: Vec<Swap>,
    /// The swap claims submitted in the block.
    pub claims: Vec<SwapClaim>,
}

/// The verdict for every action in a processed block, and the batches it
/// published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockReport {
    /// The height of the block.
    pub height: block::Height,
    /// One verdict per swap, in submission order.
    pub swaps: Vec<Result<(), ActionError>>,
    /// One verdict per claim, in submission order, with the spent nullifier
    /// of each accepted claim.
    pub claims: Vec<Result<Nullifier, ActionError>>,
    /// The batch output data published by the block.
    pub outputs: Arc<BlockOutputs>,
}

/// A request to the block processor.
#[derive(Clone, Debug)]
pub enum Request {
    /// Start processing the block at `height`.
    BeginBlock {
        /// The height of the block.
        height: block::Height,
    },

    /// Verify a swap, and admit its flows to the block in progress.
    Swap(Arc<Swap>),

    /// Verify a swap claim, and spend its nullifier in the block in progress.
    SwapClaim(Arc<SwapClaim>),

    /// Seal the block in progress, clear its batches, and finalize it with
    /// note commitment tree root `anchor`.
    EndBlock {
        /// The root of the block's note commitment tree.
        anchor: tree::Root,
    },

    /// Drop the block in progress, with all its flows and spends.
    AbandonBlock,

    /// Process a whole block: begin it, verify and apply all its actions,
    /// then finalize it.
    Block(Arc<ProposedBlock>),
}

impl Request {
    /// A short name for the request, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::BeginBlock { .. } => "begin_block",
            Request::Swap(_) => "swap",
            Request::SwapClaim(_) => "swap_claim",
            Request::EndBlock { .. } => "end_block",
            Request::AbandonBlock => "abandon_block",
            Request::Block(_) => "block",
        }
    }
}

/// A response from the block processor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// The block at this height is in progress.
    Began(block::Height),

    /// The swap was valid, and its flows were admitted.
    Admitted,

    /// The claim was valid, and its nullifier was spent.
    Claimed(Nullifier),

    /// The block was finalized, and published these batches.
    Finalized(Arc<BlockOutputs>),

    /// The block in progress at this height was dropped, if there was one.
    Abandoned(Option<block::Height>),

    /// A whole block was processed and finalized.
    Block(BlockReport),
}

/// A service that verifies actions, and settles them block by block.
///
/// Rejected swaps and claims fail with a boxed [`ActionError`]. Block
/// lifecycle failures fail with a boxed [`BlockError`].
#[derive(Clone)]
pub struct BlockProcessor<S> {
    /// The state service, possibly wrapped in other services.
    state: S,

    /// The proof verification oracle.
    verifier: Arc<dyn ProofVerifier>,

    /// Opens aggregate flows at finalization.
    decryptor: Arc<dyn FlowDecryptor>,

    /// The rule used to clear each batch.
    clearing: ClearingConfig,

    /// How many recent finalized blocks claims may anchor to, if limited.
    recent_anchors: Option<u32>,
}

impl<S> std::fmt::Debug for BlockProcessor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockProcessor")
            .field("decryptor", &self.decryptor)
            .field("clearing", &self.clearing)
            .field("recent_anchors", &self.recent_anchors)
            .finish_non_exhaustive()
    }
}

impl<S> BlockProcessor<S>
where
    S: Service<zs::Request, Response = zs::Response, Error = BoxError> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    /// Create a block processor that settles blocks in `state`.
    pub fn new(
        config: &Config,
        state: S,
        verifier: Arc<dyn ProofVerifier>,
        decryptor: Arc<dyn FlowDecryptor>,
    ) -> Self {
        Self {
            state,
            verifier,
            decryptor,
            clearing: config.clearing,
            recent_anchors: config.recent_anchors,
        }
    }
}

impl<S> Service<Request> for BlockProcessor<S>
where
    S: Service<zs::Request, Response = zs::Response, Error = BoxError> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = BoxError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Every request waits for the state service inside its future, and
        // the state's buffer applies backpressure there.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        metrics::counter!("shade.blocks.requests", 1, "type" => req.kind());

        let state = self.state.clone();
        let verifier = self.verifier.clone();
        let decryptor = self.decryptor.clone();
        let clearing = self.clearing;
        let recent_anchors = self.recent_anchors;

        let span = tracing::info_span!("block_processor", request = req.kind());

        async move {
            let rsp = match req {
                Request::BeginBlock { height } => {
                    begin_block(state, height).await.map(Response::Began)?
                }
                Request::Swap(swap) => {
                    admit_swap(state, swap, verifier).await?;
                    Response::Admitted
                }
                Request::SwapClaim(claim) => {
                    Response::Claimed(verify_claim(claim, state, verifier, recent_anchors).await?)
                }
                Request::EndBlock { anchor } => Response::Finalized(
                    end_block(state, anchor, &clearing, decryptor.as_ref()).await?,
                ),
                Request::AbandonBlock => Response::Abandoned(abandon_block(state).await?),
                Request::Block(block) => Response::Block(
                    process_block(state, block, verifier, decryptor, clearing, recent_anchors)
                        .await?,
                ),
            };

            Ok::<_, BoxError>(rsp)
        }
        .instrument(span)
        .boxed()
    }
}

async fn begin_block<S>(state: S, height: block::Height) -> Result<block::Height, BlockError>
where
    S: Service<zs::Request, Response = zs::Response, Error = BoxError>,
{
    match state.oneshot(zs::Request::BeginBlock { height }).await? {
        zs::Response::Began(height) => {
            tracing::debug!(?height, "began block");
            Ok(height)
        }
        _ => unreachable!("wrong response to Request::BeginBlock"),
    }
}

async fn abandon_block<S>(state: S) -> Result<Option<block::Height>, BlockError>
where
    S: Service<zs::Request, Response = zs::Response, Error = BoxError>,
{
    match state.oneshot(zs::Request::AbandonBlock).await? {
        zs::Response::Abandoned(height) => Ok(height),
        _ => unreachable!("wrong response to Request::AbandonBlock"),
    }
}

/// Fold a verified swap's flows into the block in progress.
async fn admit_verified_swap<S>(state: S, swap: &Swap) -> Result<(), BoxError>
where
    S: Service<zs::Request, Response = zs::Response, Error = BoxError>,
{
    match state
        .oneshot(zs::Request::AdmitSwap {
            trading_pair: swap.body.trading_pair,
            enc_amount_1: swap.enc_amount_1,
            enc_amount_2: swap.enc_amount_2,
        })
        .await?
    {
        zs::Response::Admitted => {
            metrics::counter!("shade.swaps.admitted", 1);
            Ok(())
        }
        _ => unreachable!("wrong response to Request::AdmitSwap"),
    }
}

fn record_swap_rejection(error: &ActionError) {
    tracing::debug!(%error, "rejected swap");
    metrics::counter!("shade.swaps.rejected", 1, "reason" => error.kind());
}

/// Verify a single swap, then admit it.
async fn admit_swap<S>(
    state: S,
    swap: Arc<Swap>,
    verifier: Arc<dyn ProofVerifier>,
) -> Result<(), BoxError>
where
    S: Service<zs::Request, Response = zs::Response, Error = BoxError>,
{
    let verdict = {
        let swap = swap.clone();
        spawn_fifo(move || verify_swap(&swap, verifier.as_ref())).await?
    };

    if let Err(error) = verdict {
        record_swap_rejection(&error);
        return Err(error.into());
    }

    admit_verified_swap(state, &swap).await
}

/// Seal the block in progress, clear its batches, and commit it.
///
/// If clearing or the commit fails, the block stays in progress.
async fn end_block<S>(
    state: S,
    anchor: tree::Root,
    clearing: &ClearingConfig,
    decryptor: &dyn FlowDecryptor,
) -> Result<Arc<BlockOutputs>, BlockError>
where
    S: Service<zs::Request, Response = zs::Response, Error = BoxError> + Clone,
{
    let (height, flows) = match state.clone().oneshot(zs::Request::SealBlock).await? {
        zs::Response::Sealed { height, flows } => (height, flows),
        _ => unreachable!("wrong response to Request::SealBlock"),
    };

    let batches: Vec<BatchSwapOutputData> = settle_block(clearing, decryptor, height, &flows)?;

    match state
        .oneshot(zs::Request::CommitBlock {
            anchor,
            outputs: batches.clone(),
        })
        .await?
    {
        zs::Response::Committed(committed) => debug_assert_eq!(committed, height),
        _ => unreachable!("wrong response to Request::CommitBlock"),
    }

    metrics::counter!("shade.blocks.finalized", 1);
    tracing::info!(?height, ?anchor, batches = batches.len(), "finalized block");

    Ok(Arc::new(BlockOutputs::new(height, anchor, batches)?))
}

/// Process every action of a block, then finalize it.
///
/// Swaps, and the stateless checks of claims, are verified in parallel.
/// Flows and nullifier spends are then applied in submission order, so the
/// first of two claims with the same nullifier wins. If the block can't be
/// finalized, it is abandoned.
async fn process_block<S>(
    state: S,
    block: Arc<ProposedBlock>,
    verifier: Arc<dyn ProofVerifier>,
    decryptor: Arc<dyn FlowDecryptor>,
    clearing: ClearingConfig,
    recent_anchors: Option<u32>,
) -> Result<BlockReport, BoxError>
where
    S: Service<zs::Request, Response = zs::Response, Error = BoxError> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    let height = begin_block(state.clone(), block.height).await?;

    let result = apply_actions(state.clone(), block.clone(), verifier, recent_anchors).await;
    let result = match result {
        Ok((swaps, claims)) => end_block(state.clone(), block.anchor, &clearing, decryptor.as_ref())
            .await
            .map(|outputs| BlockReport {
                height,
                swaps,
                claims,
                outputs,
            })
            .map_err(BoxError::from),
        Err(error) => Err(error),
    };

    if let Err(error) = &result {
        tracing::info!(%error, ?height, "abandoning block that could not be finalized");
        abandon_block(state).await?;
    }

    result
}

type ActionVerdicts = (
    Vec<Result<(), ActionError>>,
    Vec<Result<Nullifier, ActionError>>,
);

/// Verify and apply a block's swaps and claims to the block in progress.
async fn apply_actions<S>(
    state: S,
    block: Arc<ProposedBlock>,
    verifier: Arc<dyn ProofVerifier>,
    recent_anchors: Option<u32>,
) -> Result<ActionVerdicts, BoxError>
where
    S: Service<zs::Request, Response = zs::Response, Error = BoxError> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    // Anchors are looked up concurrently. Each lookup is a read.
    let anchors: Vec<Result<Arc<BlockOutputs>, ActionError>> = future::join_all(
        block
            .claims
            .iter()
            .map(|claim| lookup_anchor(state.clone(), claim.anchor, recent_anchors)),
    )
    .await;

    let (swap_verdicts, claim_verdicts) = {
        let block = block.clone();

        spawn_fifo(move || {
            let swaps: Vec<Result<(), ActionError>> = block
                .swaps
                .par_iter()
                .map(|swap| verify_swap(swap, verifier.as_ref()))
                .collect();

            let claims: Vec<Result<(), ActionError>> = block
                .claims
                .par_iter()
                .zip(anchors.par_iter())
                .map(|(claim, outputs)| match outputs {
                    Ok(outputs) => check_against_batch(claim, outputs, verifier.as_ref()),
                    Err(error) => Err(error.clone()),
                })
                .collect();

            (swaps, claims)
        })
        .await?
    };

    for (swap, verdict) in block.swaps.iter().zip(&swap_verdicts) {
        match verdict {
            Ok(()) => admit_verified_swap(state.clone(), swap).await?,
            Err(error) => record_swap_rejection(error),
        }
    }

    let mut claims = Vec::with_capacity(block.claims.len());
    for (claim, verdict) in block.claims.iter().zip(claim_verdicts) {
        let result = match verdict {
            Err(error @ ActionError::UnknownAnchor(_)) => Err(error),
            verdict => spend_nullifier(state.clone(), claim.nullifier, verdict).await,
        };

        // Storage failures are not a verdict on the claim.
        if let Err(ActionError::State(error)) = &result {
            return Err(error.clone().into());
        }

        swap_claim::record_claim_verdict(&result);
        claims.push(result);
    }

    Ok((swap_verdicts, claims))
}
