//! Block heights.

use std::ops::Add;

use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// The height of a block in the ledger.
///
/// Each block settles at most one batch per trading pair, so a height and a
/// trading pair together identify a batch.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Height(pub u32);

impl Height {
    /// The first block height.
    pub const MIN: Height = Height(0);

    /// The largest block height.
    pub const MAX: Height = Height(u32::MAX);

    /// Returns the next height, or `None` if `self` is [`Height::MAX`].
    pub fn next(self) -> Option<Height> {
        self + 1
    }
}

impl Add<u32> for Height {
    type Output = Option<Height>;

    fn add(self, rhs: u32) -> Option<Height> {
        self.0.checked_add(rhs).map(Height)
    }
}
