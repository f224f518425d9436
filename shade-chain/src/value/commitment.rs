use std::{fmt, iter::Sum, ops};

use once_cell::sync::Lazy;
use rand_core::{CryptoRng, RngCore};

use crate::{asset, serialization::SerializationError};

use super::Value;

/// The personalization for value commitment generators.
const VALUE_COMMITMENT_PERSONALIZATION: [u8; 8] = *b"Shade_cv";

/// The generator for the blinding term of every value commitment.
static BLINDING_GENERATOR: Lazy<jubjub::ExtendedPoint> =
    Lazy::new(|| find_group_hash(VALUE_COMMITMENT_PERSONALIZATION, b"r"));

/// Hash `m` under personalization `d` to a point in the prime-order
/// subgroup of Jubjub, if the hash is a valid encoding.
fn jubjub_group_hash(d: [u8; 8], m: &[u8]) -> Option<jubjub::ExtendedPoint> {
    let hash = blake2s_simd::Params::new()
        .hash_length(32)
        .personal(&d)
        .to_state()
        .update(m)
        .finalize();

    let point: Option<jubjub::AffinePoint> =
        jubjub::AffinePoint::from_bytes(*hash.as_array()).into();

    point
        .map(|point| point.mul_by_cofactor())
        .filter(|point| *point != jubjub::ExtendedPoint::identity())
}

/// Find a generator by appending a counter to `m` until the group hash
/// succeeds.
fn find_group_hash(d: [u8; 8], m: &[u8]) -> jubjub::ExtendedPoint {
    let mut tag = m.to_vec();
    let i = tag.len();
    tag.push(0u8);

    loop {
        if let Some(point) = jubjub_group_hash(d, &tag[..]) {
            break point;
        }

        // We don't want to overflow and start reusing generators
        assert!(tag[i] != u8::MAX);
        tag[i] += 1;
    }
}

/// The value generator of `asset_id`.
fn value_generator(asset_id: &asset::Id) -> jubjub::ExtendedPoint {
    find_group_hash(VALUE_COMMITMENT_PERSONALIZATION, &asset_id.to_bytes()[..])
}

/// The blinding factor of a value commitment.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Blinding(jubjub::Fr);

impl fmt::Debug for Blinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Blinding(..)")
    }
}

impl Blinding {
    /// Generate a uniformly random blinding factor.
    pub fn new<T>(csprng: &mut T) -> Self
    where
        T: RngCore + CryptoRng,
    {
        let mut bytes = [0u8; 64];
        csprng.fill_bytes(&mut bytes);

        Blinding(jubjub::Fr::from_bytes_wide(&bytes))
    }

    /// The zero blinding factor.
    pub fn zero() -> Self {
        Blinding(<jubjub::Fr as ff::Field>::ZERO)
    }
}

impl ops::Add for Blinding {
    type Output = Blinding;

    fn add(self, rhs: Blinding) -> Blinding {
        Blinding(self.0 + rhs.0)
    }
}

/// A homomorphic Pedersen commitment to a typed value.
///
/// cv := [v] G_asset + [r] R
///
/// where `G_asset` is a group hash of the asset id, so that commitments to
/// different assets are independent and only sum to a known value when each
/// asset balances separately.
#[derive(Clone, Copy, PartialEq)]
pub struct Commitment(jubjub::AffinePoint);

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("value::Commitment")
            .field("u", &hex::encode(self.0.get_u().to_bytes()))
            .field("v", &hex::encode(self.0.get_v().to_bytes()))
            .finish()
    }
}

impl Eq for Commitment {}

impl Commitment {
    /// Commit to `value` with `blinding`.
    #[allow(non_snake_case)]
    pub fn new(value: Value, blinding: &Blinding) -> Self {
        let V = value_generator(&value.asset_id);
        let R = *BLINDING_GENERATOR;

        Self::from(V * jubjub::Fr::from(value.amount) + R * blinding.0)
    }

    /// Returns the canonical encoding of the commitment point.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

impl From<jubjub::ExtendedPoint> for Commitment {
    fn from(extended_point: jubjub::ExtendedPoint) -> Self {
        Self(jubjub::AffinePoint::from(extended_point))
    }
}

/// Decodes a commitment, rejecting non-canonical encodings and points of
/// small order.
impl TryFrom<[u8; 32]> for Commitment {
    type Error = SerializationError;

    fn try_from(bytes: [u8; 32]) -> Result<Self, Self::Error> {
        let point: Option<jubjub::AffinePoint> = jubjub::AffinePoint::from_bytes(bytes).into();
        let point = point.ok_or(SerializationError::Parse("invalid value commitment point"))?;

        if bool::from(jubjub::ExtendedPoint::from(point).is_small_order()) {
            return Err(SerializationError::Parse(
                "value commitment must not be of small order",
            ));
        }

        Ok(Self(point))
    }
}

impl TryFrom<Vec<u8>> for Commitment {
    type Error = SerializationError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SerializationError::Parse("value commitment must be 32 bytes"))?;

        Commitment::try_from(bytes)
    }
}

impl ops::Add for Commitment {
    type Output = Commitment;

    fn add(self, rhs: Commitment) -> Commitment {
        Commitment::from(jubjub::ExtendedPoint::from(self.0) + jubjub::ExtendedPoint::from(rhs.0))
    }
}

impl Sum for Commitment {
    fn sum<I: Iterator<Item = Commitment>>(iter: I) -> Self {
        iter.fold(
            Commitment::from(jubjub::ExtendedPoint::identity()),
            ops::Add::add,
        )
    }
}
