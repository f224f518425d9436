use proptest::{arbitrary::any, prelude::*};

use crate::{amount::Amount, asset};

use super::{MockFlowCiphertext, Price, TradingPair};

impl Arbitrary for TradingPair {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (any::<asset::Id>(), any::<asset::Id>())
            .prop_filter_map("trading pair assets must be distinct", |(a, b)| {
                TradingPair::new(a, b).ok()
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for MockFlowCiphertext {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        any::<u64>()
            .prop_map(|amount| MockFlowCiphertext::new(Amount::from(amount)))
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for Price {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        any::<[u8; 32]>().prop_map(Price::from_bytes).boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
