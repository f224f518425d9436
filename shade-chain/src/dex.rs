//! Batched swap actions and the per-block data that settles them.
//!
//! A [`Swap`] contributes hidden amounts of both assets of a
//! [`TradingPair`] to the batch of the block it is included in. The block
//! folds every admitted swap's flow ciphertexts into [`BlockFlows`], opens
//! the aggregates when the block is finalized, and publishes one
//! [`BatchSwapOutputData`] per pair. A [`SwapClaim`] later redeems a swap's
//! share of its batch.

mod batch;
mod flow;
mod swap;
mod swap_claim;
mod trading_pair;
mod u256;

#[cfg(any(test, feature = "proptest-impl"))]
mod arbitrary;

#[cfg(test)]
mod tests;

pub use batch::{BatchError, BatchSwapOutputData, BlockOutputs, Fill, Price};
pub use flow::{BlockFlows, MockFlowCiphertext};
pub use swap::{Swap, SwapBody, SwapCiphertext, SwapPlaintext};
pub use swap_claim::SwapClaim;
pub use trading_pair::{TradingPair, TradingPairError};
pub use u256::{mul_div, U256};
