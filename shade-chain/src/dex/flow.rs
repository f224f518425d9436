use std::{collections::BTreeMap, iter::Sum, ops};

use serde::{Deserialize, Serialize};

use crate::{amount::Amount, proto, serialization::SerializationError};

use super::TradingPair;

/// A homomorphically addable encryption of a swap amount.
///
/// This is a mock of a threshold-decryptable additively homomorphic
/// ciphertext: the "encryption" is the amount itself, and addition is
/// integer addition. Callers must treat it as opaque and only combine
/// ciphertexts with [`MockFlowCiphertext::add`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MockFlowCiphertext(u128);

impl MockFlowCiphertext {
    /// Encrypt `amount`.
    pub fn new(amount: Amount) -> Self {
        MockFlowCiphertext(amount.into())
    }

    /// The encryption of zero.
    pub fn identity() -> Self {
        MockFlowCiphertext(0)
    }

    /// Homomorphically add two ciphertexts.
    ///
    /// Addition saturates, so it stays associative and commutative for
    /// every input.
    pub fn add(self, other: MockFlowCiphertext) -> MockFlowCiphertext {
        MockFlowCiphertext(self.0.saturating_add(other.0))
    }

    /// Returns the mock plaintext.
    ///
    /// Only a flow decryptor should call this, once per finalized aggregate.
    pub fn mock_plaintext(&self) -> u128 {
        self.0
    }
}

impl ops::Add for MockFlowCiphertext {
    type Output = MockFlowCiphertext;

    fn add(self, rhs: MockFlowCiphertext) -> MockFlowCiphertext {
        MockFlowCiphertext::add(self, rhs)
    }
}

impl Sum for MockFlowCiphertext {
    fn sum<I: Iterator<Item = MockFlowCiphertext>>(iter: I) -> Self {
        iter.fold(MockFlowCiphertext::identity(), MockFlowCiphertext::add)
    }
}

/// Individual swap ciphertexts always fit in the wire's `u64`. Larger
/// aggregates saturate.
impl From<MockFlowCiphertext> for proto::MockFlowCiphertext {
    fn from(ct: MockFlowCiphertext) -> Self {
        proto::MockFlowCiphertext {
            value: u64::try_from(ct.0).unwrap_or(u64::MAX),
        }
    }
}

impl TryFrom<proto::MockFlowCiphertext> for MockFlowCiphertext {
    type Error = SerializationError;

    fn try_from(msg: proto::MockFlowCiphertext) -> Result<Self, Self::Error> {
        Ok(MockFlowCiphertext(msg.value.into()))
    }
}

/// The aggregate flow ciphertexts of one block, per canonical trading pair.
///
/// Each entry holds the running totals of `asset_1` and `asset_2`
/// contributions. A pair's totals start at the identity the first time the
/// pair is seen. Because the fold is associative and commutative, the final
/// aggregates do not depend on the order swaps were folded in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockFlows {
    flows: BTreeMap<TradingPair, (MockFlowCiphertext, MockFlowCiphertext)>,
}

impl BlockFlows {
    /// Returns empty flows for a new block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one swap's flow ciphertexts into the totals for `trading_pair`.
    ///
    /// A non-canonical pair is folded into its canonical entry, with the
    /// ciphertexts swapped to match.
    pub fn fold(
        mut self,
        trading_pair: TradingPair,
        enc_amount_1: MockFlowCiphertext,
        enc_amount_2: MockFlowCiphertext,
    ) -> Self {
        let (pair, enc_amount_1, enc_amount_2) = if trading_pair.is_canonical() {
            (trading_pair, enc_amount_1, enc_amount_2)
        } else {
            (trading_pair.canonical(), enc_amount_2, enc_amount_1)
        };

        let entry = self.flows.entry(pair).or_insert((
            MockFlowCiphertext::identity(),
            MockFlowCiphertext::identity(),
        ));
        entry.0 = entry.0.add(enc_amount_1);
        entry.1 = entry.1.add(enc_amount_2);

        self
    }

    /// Combine two partial aggregates of the same block.
    pub fn merge(self, other: BlockFlows) -> Self {
        other
            .flows
            .into_iter()
            .fold(self, |flows, (pair, (enc_1, enc_2))| {
                flows.fold(pair, enc_1, enc_2)
            })
    }

    /// Returns the aggregates for `trading_pair`, if any swap used it.
    pub fn get(&self, trading_pair: &TradingPair) -> Option<(MockFlowCiphertext, MockFlowCiphertext)> {
        self.flows.get(trading_pair).copied()
    }

    /// Iterate over the aggregates in trading pair order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&TradingPair, &(MockFlowCiphertext, MockFlowCiphertext))> {
        self.flows.iter()
    }

    /// The number of trading pairs with flow in this block.
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    /// Returns `true` if no swaps were folded in.
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
