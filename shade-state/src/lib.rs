//! Contextual state for Shade swap settlement.
//!
//! The state holds the only data shared between blocks: the set of spent
//! nullifiers, and the batch output data published by each finalized block,
//! indexed by the block's anchor. It also holds the block in progress: its
//! aggregate swap flows and the nullifiers its claims have provisionally
//! spent.
//!
//! All access goes through the [`tower::Service`] returned by [`init`], which
//! applies requests one at a time, so a nullifier check and the insert that
//! follows it can't interleave with another claim's.

#![warn(missing_docs)]
#![allow(clippy::try_err)]
#![deny(clippy::await_holding_lock)]
#![forbid(unsafe_code)]

mod config;
pub mod constants;
mod error;
mod request;
mod response;
mod service;

pub use config::Config;
pub use error::{BoxError, CommitBlockError, StoreError, ValidateContextError};
pub use request::Request;
pub use response::Response;
pub use service::{
    finalized_state::{FinalizedBlock, FinalizedState, MemoryStore, NullifierStore, SledStore},
    init, StateService,
};

#[cfg(any(test, feature = "proptest-impl"))]
pub use service::init_test;
