//! Module for a 256-bit big int structure.
// This is a separate module to make it easier to disable clippy because
// it raises a lot of issues in the macro.
#![allow(clippy::all)]
#![allow(clippy::range_plus_one)]
#![allow(clippy::fallible_impl_from)]
#![allow(missing_docs)]

use uint::construct_uint;

construct_uint! {
    pub struct U256(4);
}

/// Computes `a * b / c` without intermediate overflow, rounding toward zero.
///
/// Returns zero when `c` is zero, and saturates at `u128::MAX`.
pub fn mul_div(a: u128, b: u128, c: u128) -> u128 {
    if c == 0 {
        return 0;
    }

    let result = U256::from(a) * U256::from(b) / U256::from(c);

    if result > U256::from(u128::MAX) {
        u128::MAX
    } else {
        result.as_u128()
    }
}
