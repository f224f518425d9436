//! Semantic verification and batch settlement for Shade swaps.
//!
//! ## Verification levels.
//!
//! Settlement is oriented around three telescoping notions of validity:
//!
//! 1. *Structural Validity*, or whether the format and structure of an
//!    action are valid. For instance, a swap's value commitments must be
//!    valid curve points, and every field of a claim must be present.
//!
//! 2. *Semantic Validity*, or whether the action could potentially be
//!    valid, depending on the state. For instance, a swap must carry a
//!    valid proof and a well-formed swap NFT, and a claim must quote the
//!    clearing prices of the batch it claims from.
//!
//! 3. *Contextual Validity*, or whether a semantically valid action is
//!    actually valid in the context of a particular state. For instance, a
//!    claim is only valid if its anchor is a finalized block's root, and
//!    its nullifier is not already spent.
//!
//! *Structural validity* is enforced by the definitions of data structures
//! in `shade-chain`. *Semantic validity* is enforced by the code in this
//! crate. *Contextual validity* is enforced in `shade-state` when actions
//! are applied to the block in progress.
//!
//! The [`BlockProcessor`] ties the levels together: it verifies actions,
//! applies them to the state, and clears every batch when a block ends.

#![allow(clippy::try_err)]
#![allow(clippy::unnecessary_wraps)]
#![forbid(unsafe_code)]

mod block;
mod check;
mod clearing;
mod config;
mod primitives;
mod swap;
mod swap_claim;

pub mod error;


pub use block::{BlockProcessor, BlockReport, ProposedBlock, Request, Response};
pub use check::{
    prices_match_batch, proof_is_valid, swap_nft_is_well_formed, trading_pair_is_canonical,
};
pub use clearing::{settle_block, ClearingRule, DepthWeighted, ProportionalSplit};
pub use config::{ClearingConfig, Config};
pub use error::{ActionError, BlockError};
pub use primitives::{
    decryption::{FlowDecryptor, MockFlowDecryptor},
    proof::{Description, DigestProofVerifier, ProofVerifier, PublicInputs},
};
pub use swap::verify_swap;
pub use swap_claim::{check_against_batch, verify_claim};

/// A boxed [`std::error::Error`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
