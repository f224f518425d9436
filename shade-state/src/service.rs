//! The [`tower::Service`] for Shade's settlement state.
//!
//! [`StateService`] owns the block in progress and the finalized state. It
//! handles each request to completion inside [`Service::call`], so when it is
//! wrapped in a [`Buffer`], requests from every clone of the buffer are
//! applied one at a time, in the order they reach the buffer.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures::future::{self, FutureExt};
use tower::{buffer::Buffer, util::BoxService, Service};
use tracing::instrument;

use shade_chain::{
    block,
    dex::{BatchSwapOutputData, MockFlowCiphertext, TradingPair},
    note::Nullifier,
    tree,
};

use crate::{
    constants::STATE_BUFFER_BOUND, BoxError, CommitBlockError, Config, Request, Response,
};

pub(crate) mod check;
pub mod finalized_state;
mod pending;

#[cfg(test)]
mod tests;

use finalized_state::{FinalizedState, MemoryStore, SledStore};
use pending::PendingBlock;

/// A read-write service for the settlement state.
///
/// Most users should access the state through the buffered service returned
/// by [`init`], so that every caller shares the same block in progress.
#[derive(Debug)]
pub struct StateService<S> {
    /// Spent nullifiers and batch outputs of finalized blocks.
    finalized_state: S,

    /// The block in progress, if any.
    pending: Option<PendingBlock>,
}

impl<S: FinalizedState> StateService<S> {
    /// Create a state service on top of `finalized_state`, with no block in
    /// progress.
    pub fn new(finalized_state: S) -> Self {
        let tip = finalized_state.tip();
        tracing::info!(?tip, "created state service");

        Self {
            finalized_state,
            pending: None,
        }
    }

    /// Returns the finalized state.
    pub fn finalized_state(&self) -> &S {
        &self.finalized_state
    }

    fn pending_mut(&mut self) -> Result<&mut PendingBlock, CommitBlockError> {
        self.pending
            .as_mut()
            .ok_or(CommitBlockError::NoBlockInProgress)
    }

    fn begin_block(&mut self, height: block::Height) -> Result<Response, BoxError> {
        if let Some(pending) = &self.pending {
            Err(CommitBlockError::BlockInProgress {
                height: pending.height(),
            })?;
        }

        check::block_extends_finalized_tip(self.finalized_state.tip()?, height)?;

        self.pending = Some(PendingBlock::new(height));
        tracing::debug!(?height, "began block");

        Ok(Response::Began(height))
    }

    fn admit_swap(
        &mut self,
        trading_pair: TradingPair,
        enc_amount_1: MockFlowCiphertext,
        enc_amount_2: MockFlowCiphertext,
    ) -> Result<Response, BoxError> {
        self.pending_mut()?
            .admit_swap(trading_pair, enc_amount_1, enc_amount_2)?;

        Ok(Response::Admitted)
    }

    fn spend_nullifier(&mut self, nullifier: Nullifier) -> Result<Response, BoxError> {
        let pending = self
            .pending
            .as_mut()
            .ok_or(CommitBlockError::NoBlockInProgress)?;
        pending.check_open_for_spend()?;

        check::nullifier::no_duplicate_in_finalized_state(nullifier, &self.finalized_state)?;
        pending.spend_nullifier(nullifier)?;

        Ok(Response::Spent(nullifier))
    }

    fn seal_block(&mut self) -> Result<Response, BoxError> {
        let pending = self.pending_mut()?;
        let height = pending.height();
        let flows = pending.seal();

        tracing::debug!(?height, pairs = flows.len(), "sealed block");

        Ok(Response::Sealed { height, flows })
    }

    fn commit_block(
        &mut self,
        anchor: tree::Root,
        outputs: Vec<BatchSwapOutputData>,
    ) -> Result<Response, BoxError> {
        // On failure the block stays in progress, so the caller can abandon it.
        let block = self.pending_mut()?.finalize(anchor, outputs)?;
        let height = block.height();
        let nullifier_count = block.nullifiers.len();
        let batch_count = block.outputs.len();

        self.finalized_state
            .commit_block(block)
            .map_err(CommitBlockError::from)?;
        self.pending = None;

        metrics::gauge!(
            "state.finalized.committed.block.height",
            f64::from(height.0)
        );
        metrics::counter!(
            "state.finalized.committed.nullifier.count",
            nullifier_count as u64
        );

        tracing::info!(
            ?height,
            ?anchor,
            batch_count,
            nullifier_count,
            "committed block to the finalized state"
        );

        Ok(Response::Committed(height))
    }

    fn abandon_block(&mut self) -> Response {
        let height = self.pending.take().map(|pending| pending.height());

        if height.is_some() {
            tracing::info!(?height, "abandoned block in progress");
        }

        Response::Abandoned(height)
    }

    fn contains_nullifier(&self, nullifier: &Nullifier) -> Result<Response, BoxError> {
        let in_pending = self
            .pending
            .as_ref()
            .map_or(false, |pending| pending.contains_nullifier(nullifier));

        Ok(Response::ContainsNullifier(
            in_pending || self.finalized_state.contains_nullifier(nullifier)?,
        ))
    }
}

impl<S: FinalizedState> Service<Request> for StateService<S> {
    type Response = Response;
    type Error = BoxError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    #[instrument(name = "state", skip(self, req), fields(request = req.kind()))]
    fn call(&mut self, req: Request) -> Self::Future {
        metrics::counter!(
            "state.requests",
            1,
            "service" => "state",
            "type" => req.kind(),
        );

        let rsp = match req {
            Request::BeginBlock { height } => self.begin_block(height),
            Request::AdmitSwap {
                trading_pair,
                enc_amount_1,
                enc_amount_2,
            } => self.admit_swap(trading_pair, enc_amount_1, enc_amount_2),
            Request::SpendNullifier(nullifier) => self.spend_nullifier(nullifier),
            Request::SealBlock => self.seal_block(),
            Request::CommitBlock { anchor, outputs } => self.commit_block(anchor, outputs),
            Request::AbandonBlock => Ok(self.abandon_block()),
            Request::LookupAnchor(anchor) => self
                .finalized_state
                .lookup_anchor(&anchor)
                .map(Response::Anchor)
                .map_err(BoxError::from),
            Request::ContainsNullifier(nullifier) => self.contains_nullifier(&nullifier),
            Request::Tip => self
                .finalized_state
                .tip()
                .map(Response::Tip)
                .map_err(BoxError::from),
        };

        if let Err(error) = &rsp {
            tracing::debug!(%error, "state request failed");
        }

        future::ready(rsp).boxed()
    }
}

/// Initialize a state service from the provided [`Config`], and wrap it in a
/// [`Buffer`] so it can be shared.
///
/// An ephemeral config keeps the finalized state in memory. Otherwise the
/// finalized state is opened from [`Config::db_path`], creating it if needed.
///
/// Must be called from inside a Tokio runtime, because the buffer spawns its
/// worker task.
pub fn init(
    config: Config,
) -> Result<Buffer<BoxService<Request, Response, BoxError>, Request>, BoxError> {
    let state_service = if config.ephemeral {
        BoxService::new(StateService::new(MemoryStore::new()))
    } else {
        BoxService::new(StateService::new(SledStore::open(&config)?))
    };

    Ok(Buffer::new(state_service, STATE_BUFFER_BOUND))
}

/// Returns an in-memory [`StateService`] behind a buffer with a single slot.
///
/// This can be used to create a state service for testing. See also
/// [`init`].
#[cfg(any(test, feature = "proptest-impl"))]
pub fn init_test() -> Buffer<BoxService<Request, Response, BoxError>, Request> {
    Buffer::new(BoxService::new(StateService::new(MemoryStore::new())), 1)
}
