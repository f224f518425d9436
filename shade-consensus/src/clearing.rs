//! Batch clearing: turning a block's aggregate flows into batch output data.
//!
//! A [`ClearingRule`] decides how much of each side's aggregate input is
//! filled, and the [`BatchSwapOutputData`] derives the clearing prices from
//! that fill. Rules use integer arithmetic only, so every validator publishes
//! bit-identical prices for the same aggregates.

use std::fmt;

use tracing::instrument;

use shade_chain::{
    block,
    dex::{mul_div, BatchError, BatchSwapOutputData, BlockFlows, Fill},
};

use crate::{config::ClearingConfig, primitives::decryption::FlowDecryptor};


/// A pure function from a batch's aggregate inputs to its fill.
///
/// Rules must be:
/// - total over all pairs of aggregates, including when one or both sides are
///   zero,
/// - symmetric: swapping `delta_1` and `delta_2` swaps the fill's `_1` and
///   `_2` fields, which makes the clearing prices reciprocal, and
/// - conserving: each side's fill plus its refund never exceeds its input.
pub trait ClearingRule: fmt::Debug + Send + Sync {
    /// Returns the fill for a batch with aggregate inputs `delta_1` of
    /// `asset_1` and `delta_2` of `asset_2`.
    fn fill(&self, delta_1: u128, delta_2: u128) -> Fill;
}

/// When only one side of a batch has input, nothing trades and that side
/// is refunded.
fn one_sided(delta_1: u128, delta_2: u128) -> Option<Fill> {
    if delta_1 == 0 || delta_2 == 0 {
        Some(Fill {
            unfilled_1: delta_1,
            unfilled_2: delta_2,
            ..Fill::default()
        })
    } else {
        None
    }
}

/// Each side receives the other side's entire input.
///
/// The clearing prices are the ratio of the aggregates:
/// `price_1 = delta_2 / delta_1` and `price_2 = delta_1 / delta_2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProportionalSplit;

impl ClearingRule for ProportionalSplit {
    fn fill(&self, delta_1: u128, delta_2: u128) -> Fill {
        one_sided(delta_1, delta_2).unwrap_or(Fill {
            lambda_1: delta_1,
            lambda_2: delta_2,
            unfilled_1: 0,
            unfilled_2: 0,
        })
    }
}

/// Each side's fill is damped by a virtual depth `R`, and the remainder is
/// refunded.
///
/// ```text
/// lambda_2 = delta_2 * delta_1 / (delta_1 + R)
/// lambda_1 = delta_1 * delta_2 / (delta_2 + R)
/// ```
///
/// Thin batches trade a smaller share of their input. With `R = 0` this is
/// [`ProportionalSplit`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepthWeighted {
    /// The virtual depth added to each side's input.
    pub virtual_depth: u64,
}

impl ClearingRule for DepthWeighted {
    fn fill(&self, delta_1: u128, delta_2: u128) -> Fill {
        if let Some(fill) = one_sided(delta_1, delta_2) {
            return fill;
        }

        let depth = u128::from(self.virtual_depth);
        let lambda_2 = mul_div(delta_2, delta_1, delta_1.saturating_add(depth));
        let lambda_1 = mul_div(delta_1, delta_2, delta_2.saturating_add(depth));

        Fill {
            lambda_1,
            lambda_2,
            unfilled_1: delta_1 - lambda_1,
            unfilled_2: delta_2 - lambda_2,
        }
    }
}

impl ClearingRule for ClearingConfig {
    fn fill(&self, delta_1: u128, delta_2: u128) -> Fill {
        match *self {
            ClearingConfig::ProportionalSplit => ProportionalSplit.fill(delta_1, delta_2),
            ClearingConfig::DepthWeighted { virtual_depth } => {
                DepthWeighted { virtual_depth }.fill(delta_1, delta_2)
            }
        }
    }
}

/// Open a sealed block's aggregate flows, and clear one batch for each
/// trading pair with flows.
///
/// Each aggregate ciphertext is opened exactly once. Batches are returned in
/// trading pair order.
#[instrument(skip(rule, decryptor, flows), fields(pairs = flows.len()))]
pub fn settle_block<R, D>(
    rule: &R,
    decryptor: &D,
    height: block::Height,
    flows: &BlockFlows,
) -> Result<Vec<BatchSwapOutputData>, BatchError>
where
    R: ClearingRule + ?Sized,
    D: FlowDecryptor + ?Sized,
{
    flows
        .iter()
        .map(|(trading_pair, (enc_amount_1, enc_amount_2))| {
            let delta_1 = decryptor.open(enc_amount_1);
            let delta_2 = decryptor.open(enc_amount_2);
            let fill = rule.fill(delta_1, delta_2);

            tracing::debug!(?trading_pair, delta_1, delta_2, ?fill, "cleared batch");

            BatchSwapOutputData::new(height, *trading_pair, delta_1, delta_2, fill)
        })
        .collect()
}
