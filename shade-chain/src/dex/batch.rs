use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    amount::{self, Amount},
    block,
    serialization::SerializationError,
    tree,
};

use super::{mul_div, TradingPair, U256};

/// An unsigned fixed-point price with 128 integer and 128 fractional bits.
///
/// Batch aggregates are `u128`s, so every ratio of two aggregates fits
/// without saturating, and every non-zero ratio stays non-zero.
///
/// Prices are computed with integer arithmetic only, rounding toward zero,
/// so every validator derives bit-identical prices from the same inputs.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 32]", into = "[u8; 32]")]
pub struct Price(U256);

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let integer = self.0 / Price::ONE.0;
        let fraction = self.0 % Price::ONE.0;

        f.debug_tuple("Price")
            .field(&format_args!("{integer}+{fraction}/2^128"))
            .finish()
    }
}

impl Price {
    /// The number of fractional bits.
    pub const FRACTIONAL_BITS: u32 = 128;

    /// A price of zero.
    pub const ZERO: Price = Price(U256([0, 0, 0, 0]));

    /// A price of exactly one.
    pub const ONE: Price = Price(U256([0, 0, 1, 0]));

    /// Build a price from its raw fixed-point representation.
    pub const fn from_bits(bits: U256) -> Price {
        Price(bits)
    }

    /// Returns the raw fixed-point representation.
    pub const fn to_bits(self) -> U256 {
        self.0
    }

    /// The price `numerator / denominator`, rounded toward zero.
    ///
    /// Returns zero when `denominator` is zero.
    pub fn ratio(numerator: u128, denominator: u128) -> Price {
        if denominator == 0 {
            return Price::ZERO;
        }

        // numerator < 2^128, so the product fits in 256 bits.
        Price(U256::from(numerator) * Price::ONE.0 / U256::from(denominator))
    }

    /// The little-endian wire encoding.
    pub fn to_bytes(self) -> [u8; 32] {
        let mut bytes = [0; 32];
        self.0.to_little_endian(&mut bytes);
        bytes
    }

    /// Decode a price from its little-endian wire encoding.
    pub fn from_bytes(bytes: [u8; 32]) -> Price {
        Price(U256::from_little_endian(&bytes))
    }
}

impl From<[u8; 32]> for Price {
    fn from(bytes: [u8; 32]) -> Self {
        Price::from_bytes(bytes)
    }
}

impl From<Price> for [u8; 32] {
    fn from(price: Price) -> Self {
        price.to_bytes()
    }
}

impl TryFrom<Vec<u8>> for Price {
    type Error = SerializationError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SerializationError::Parse("price must be 32 bytes"))?;

        Ok(Price::from_bytes(bytes))
    }
}

/// An inconsistency in batch output data.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum BatchError {
    #[error("batch output data must use a canonical trading pair, got {0:?}")]
    NonCanonicalPair(TradingPair),

    #[error("batch for {trading_pair:?} pays out {paid_out} of an asset but only received {received}")]
    Conservation {
        trading_pair: TradingPair,
        received: u128,
        paid_out: u128,
    },

    #[error("block contains two batches for {0:?}")]
    DuplicateBatch(TradingPair),

    #[error("batch for height {actual:?} can't be published in block {expected:?}")]
    HeightMismatch {
        expected: block::Height,
        actual: block::Height,
    },
}

/// How a batch's aggregate inputs were filled.
///
/// `lambda_1` is the amount of `asset_1` paid out to the `asset_2` side, and
/// `unfilled_1` is the amount of `asset_1` refunded to the `asset_1` side.
/// The `_2` fields are the same for `asset_2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fill {
    /// `asset_1` paid to the `asset_2` side.
    pub lambda_1: u128,
    /// `asset_2` paid to the `asset_1` side.
    pub lambda_2: u128,
    /// `asset_1` refunded to the `asset_1` side.
    pub unfilled_1: u128,
    /// `asset_2` refunded to the `asset_2` side.
    pub unfilled_2: u128,
}

/// The public result of one batch: one trading pair in one block.
///
/// Created once when the block is finalized. Every claim against the batch
/// must quote its clearing prices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchSwapOutputData {
    height: block::Height,
    trading_pair: TradingPair,
    delta_1: u128,
    delta_2: u128,
    fill: Fill,
    price_1: Price,
    price_2: Price,
}

impl BatchSwapOutputData {
    /// Build the output data for a batch with aggregate inputs `delta_1` and
    /// `delta_2`, filled as described by `fill`.
    ///
    /// `price_1` is the amount of `asset_2` received per unit of `asset_1`,
    /// and `price_2` is the amount of `asset_1` received per unit of
    /// `asset_2`.
    pub fn new(
        height: block::Height,
        trading_pair: TradingPair,
        delta_1: u128,
        delta_2: u128,
        fill: Fill,
    ) -> Result<Self, BatchError> {
        if !trading_pair.is_canonical() {
            return Err(BatchError::NonCanonicalPair(trading_pair));
        }

        for (received, paid_out, refunded) in [
            (delta_1, fill.lambda_1, fill.unfilled_1),
            (delta_2, fill.lambda_2, fill.unfilled_2),
        ] {
            let paid_out = paid_out.checked_add(refunded).unwrap_or(u128::MAX);
            if paid_out > received {
                return Err(BatchError::Conservation {
                    trading_pair,
                    received,
                    paid_out,
                });
            }
        }

        Ok(BatchSwapOutputData {
            height,
            trading_pair,
            delta_1,
            delta_2,
            fill,
            price_1: Price::ratio(fill.lambda_2, delta_1),
            price_2: Price::ratio(fill.lambda_1, delta_2),
        })
    }

    /// The height of the block that settled this batch.
    pub fn height(&self) -> block::Height {
        self.height
    }

    /// The canonical pair of this batch.
    pub fn trading_pair(&self) -> TradingPair {
        self.trading_pair
    }

    /// The aggregate `asset_1` input.
    pub fn delta_1(&self) -> u128 {
        self.delta_1
    }

    /// The aggregate `asset_2` input.
    pub fn delta_2(&self) -> u128 {
        self.delta_2
    }

    /// How the aggregate inputs were filled.
    pub fn fill(&self) -> Fill {
        self.fill
    }

    /// The `asset_1` clearing price, in `asset_2` per unit of `asset_1`.
    pub fn price_1(&self) -> Price {
        self.price_1
    }

    /// The `asset_2` clearing price, in `asset_1` per unit of `asset_2`.
    pub fn price_2(&self) -> Price {
        self.price_2
    }

    /// Compute the outputs of a swap that contributed `t1` and `t2` to this
    /// batch, after paying `fee`.
    ///
    /// Returns `(output_1, output_2)`, denominated in `asset_1` and
    /// `asset_2`. Each output is the other side's contribution converted at
    /// its clearing price, plus this side's pro-rata share of the unfilled
    /// amount. The fee is split between the outputs in proportion to their
    /// size, and each output stops at zero.
    ///
    /// Conversions use the exact ratio that each published price rounds,
    /// `t2 * lambda_1 / delta_2` and `t1 * lambda_2 / delta_1`. Every division
    /// rounds toward zero, so the outputs of all the swaps in a batch never
    /// exceed what the batch pays out.
    ///
    /// Fails if an output does not fit in an [`Amount`].
    pub fn output_amounts(
        &self,
        t1: Amount,
        t2: Amount,
        fee: Amount,
    ) -> Result<(Amount, Amount), amount::Error> {
        let t1 = u128::from(t1);
        let t2 = u128::from(t2);

        let out_1 = mul_div(t2, self.fill.lambda_1, self.delta_2)
            .saturating_add(mul_div(t1, self.fill.unfilled_1, self.delta_1));
        let out_2 = mul_div(t1, self.fill.lambda_2, self.delta_1)
            .saturating_add(mul_div(t2, self.fill.unfilled_2, self.delta_2));

        let fee = u128::from(fee);
        let fee_1 = mul_div(fee, out_1, out_1.saturating_add(out_2));
        let fee_2 = fee - fee_1;

        Ok((
            Amount::try_from_u128(out_1.saturating_sub(fee_1))?,
            Amount::try_from_u128(out_2.saturating_sub(fee_2))?,
        ))
    }
}

/// The batch output data published by one finalized block, by trading pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOutputs {
    height: block::Height,
    anchor: tree::Root,
    batches: BTreeMap<TradingPair, BatchSwapOutputData>,
}

impl BlockOutputs {
    /// Collect the batches settled by the block at `height` with note
    /// commitment tree root `anchor`.
    pub fn new(
        height: block::Height,
        anchor: tree::Root,
        batches: impl IntoIterator<Item = BatchSwapOutputData>,
    ) -> Result<Self, BatchError> {
        let mut by_pair = BTreeMap::new();

        for batch in batches {
            if batch.height != height {
                return Err(BatchError::HeightMismatch {
                    expected: height,
                    actual: batch.height,
                });
            }

            if by_pair.insert(batch.trading_pair, batch).is_some() {
                return Err(BatchError::DuplicateBatch(batch.trading_pair));
            }
        }

        Ok(BlockOutputs {
            height,
            anchor,
            batches: by_pair,
        })
    }

    /// The height of the block.
    pub fn height(&self) -> block::Height {
        self.height
    }

    /// The block's note commitment tree root.
    pub fn anchor(&self) -> tree::Root {
        self.anchor
    }

    /// Returns the batch for `trading_pair`, if the block settled one.
    pub fn get(&self, trading_pair: &TradingPair) -> Option<&BatchSwapOutputData> {
        self.batches.get(trading_pair)
    }

    /// Iterate over the batches in trading pair order.
    pub fn batches(&self) -> impl Iterator<Item = &BatchSwapOutputData> {
        self.batches.values()
    }

    /// The number of batches.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Returns `true` if the block settled no batches.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
