use crate::{
    amount::Amount,
    note::{NotePayload, Nullifier},
    primitives::Proof,
    proto,
    serialization::{DomainType, SerializationError},
    tree,
};

use super::{Price, TradingPair};

/// A claim of a swap's share of its batch's outputs.
///
/// The claim spends the swap NFT, revealing its nullifier, and creates one
/// output note per asset of the pair. It copies the clearing prices of the
/// batch it redeems, so a claim built against one batch can't be replayed
/// against another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapClaim {
    /// The proof that the outputs are the swap's share of the batch.
    pub zkproof: Proof,
    /// The nullifier of the spent swap NFT.
    pub nullifier: Nullifier,
    /// The fee paid by the claim.
    pub fee: Amount,
    /// The output note in `asset_1`.
    pub output_1: NotePayload,
    /// The output note in `asset_2`.
    pub output_2: NotePayload,
    /// The note commitment tree root of the block that included the swap.
    pub anchor: tree::Root,
    /// The batch's `asset_1` clearing price.
    pub price_1: Price,
    /// The batch's `asset_2` clearing price.
    pub price_2: Price,
    /// The pair of the batch being redeemed.
    pub trading_pair: TradingPair,
}

impl DomainType for SwapClaim {
    type Proto = proto::SwapClaim;
}

impl From<SwapClaim> for proto::SwapClaim {
    fn from(claim: SwapClaim) -> Self {
        proto::SwapClaim {
            zkproof: claim.zkproof.0,
            nullifier: claim.nullifier.to_bytes().to_vec(),
            fee: claim.fee.into(),
            output_1: Some(claim.output_1.into()),
            output_2: Some(claim.output_2.into()),
            anchor: claim.anchor.to_bytes().to_vec(),
            price_1: claim.price_1.to_bytes().to_vec(),
            price_2: claim.price_2.to_bytes().to_vec(),
            trading_pair: Some(claim.trading_pair.into()),
        }
    }
}

impl TryFrom<proto::SwapClaim> for SwapClaim {
    type Error = SerializationError;

    fn try_from(msg: proto::SwapClaim) -> Result<Self, Self::Error> {
        Ok(SwapClaim {
            zkproof: Proof(msg.zkproof),
            nullifier: msg.nullifier.try_into()?,
            fee: msg.fee.into(),
            output_1: msg
                .output_1
                .ok_or(SerializationError::MissingField("SwapClaim.output_1"))?
                .try_into()?,
            output_2: msg
                .output_2
                .ok_or(SerializationError::MissingField("SwapClaim.output_2"))?
                .try_into()?,
            anchor: msg.anchor.try_into()?,
            price_1: msg.price_1.try_into()?,
            price_2: msg.price_2.try_into()?,
            trading_pair: msg
                .trading_pair
                .ok_or(SerializationError::MissingField("SwapClaim.trading_pair"))?
                .try_into()?,
        })
    }
}
