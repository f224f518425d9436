//! Core data structures for shielded batched-swap settlement.
//!
//! This crate defines the structurally valid forms of swap actions, swap
//! claims, and the per-block batch data that settles them. Anything that can
//! be checked without chain state or proof verification is enforced here,
//! when values are constructed or decoded from the wire.
//!
//! Semantic checks live in `shade-consensus`, and contextual checks (anchors
//! and nullifiers) live in `shade-state`.

#![doc(html_root_url = "https://docs.rs/shade_chain")]
// Standard lints
#![warn(missing_docs)]
#![allow(clippy::try_err)]
#![deny(clippy::await_holding_lock)]
#![forbid(unsafe_code)]

pub mod amount;
pub mod asset;
pub mod block;
pub mod dex;
pub mod fmt;
pub mod keys;
pub mod note;
pub mod primitives;
pub mod proto;
pub mod serialization;
pub mod tree;
pub mod value;
