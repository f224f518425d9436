//! Strongly-typed asset amounts that prevent under/overflows.
//!
//! In contrast to regular arithmetic operations, which return values,
//! arithmetic on [`Amount`]s returns [`Result`](std::result::Result)s.

use std::{fmt, iter::Sum, ops};

use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// The result of an amount operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A non-negative quantity of a single asset.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
#[serde(transparent)]
pub struct Amount(u64);

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Amount").field(&self.0).finish()
    }
}

impl Amount {
    /// The zero amount.
    pub const fn zero() -> Self {
        Amount(0)
    }

    /// Returns the inner value as a `u64`.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Subtract `other`, stopping at zero instead of failing.
    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    /// Convert a wide intermediate result into an amount, if it fits.
    pub fn try_from_u128(value: u128) -> Result<Amount> {
        u64::try_from(value)
            .map(Amount)
            .map_err(|source| Error::Convert { value, source })
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for u128 {
    fn from(amount: Amount) -> Self {
        amount.0.into()
    }
}

impl From<Amount> for jubjub::Fr {
    fn from(amount: Amount) -> Self {
        jubjub::Fr::from(amount.0)
    }
}

impl ops::Add<Amount> for Amount {
    type Output = Result<Amount>;

    fn add(self, rhs: Amount) -> Self::Output {
        self.0
            .checked_add(rhs.0)
            .map(Amount)
            .ok_or(Error::AdditionOverflow {
                lhs: self.0,
                rhs: rhs.0,
            })
    }
}

impl ops::Add<Amount> for Result<Amount> {
    type Output = Result<Amount>;

    fn add(self, rhs: Amount) -> Self::Output {
        self? + rhs
    }
}

impl ops::Sub<Amount> for Amount {
    type Output = Result<Amount>;

    fn sub(self, rhs: Amount) -> Self::Output {
        self.0
            .checked_sub(rhs.0)
            .map(Amount)
            .ok_or(Error::SubtractionUnderflow {
                lhs: self.0,
                rhs: rhs.0,
            })
    }
}

impl<'amt> Sum<&'amt Amount> for Result<Amount> {
    fn sum<I: Iterator<Item = &'amt Amount>>(iter: I) -> Self {
        iter.fold(Ok(Amount::zero()), |acc, amount| acc + *amount)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
/// Errors that can be returned when validating `Amount`s
pub enum Error {
    #[error("u64 overflow when adding amounts {lhs} and {rhs}")]
    AdditionOverflow { lhs: u64, rhs: u64 },

    #[error("amount {lhs} is smaller than subtracted amount {rhs}")]
    SubtractionUnderflow { lhs: u64, rhs: u64 },

    #[error("{value} could not be converted to a u64 amount")]
    Convert {
        value: u128,
        source: std::num::TryFromIntError,
    },
}
