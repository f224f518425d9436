//! External primitives used by settlement.

mod proof;

pub use proof::Proof;
