use std::fmt;

use crate::{
    amount::Amount,
    asset,
    keys::Address,
    note::{self, NotePayload},
    primitives::Proof,
    proto,
    serialization::{DomainType, SerializationError},
    value::{self, Value},
};

use super::{MockFlowCiphertext, TradingPair};

/// The private details of a swap order.
///
/// Only the submitter knows the plaintext. It is encrypted into the
/// [`SwapBody::swap_ciphertext`] so the submitter can recover it to claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapPlaintext {
    /// The pair being traded.
    pub trading_pair: TradingPair,
    /// The amount of `asset_1` contributed.
    pub t1: Amount,
    /// The amount of `asset_2` contributed.
    pub t2: Amount,
    /// The fee paid by the swap.
    pub fee: Amount,
    /// The address entitled to claim the outputs.
    pub claim_address: Address,
}

impl SwapPlaintext {
    /// The value of `asset_1` contributed.
    pub fn value_1(&self) -> Value {
        Value {
            amount: self.t1,
            asset_id: self.trading_pair.asset_1(),
        }
    }

    /// The value of `asset_2` contributed.
    pub fn value_2(&self) -> Value {
        Value {
            amount: self.t2,
            asset_id: self.trading_pair.asset_2(),
        }
    }

    /// The single unit of the swap NFT denomination that this swap mints.
    pub fn swap_nft_value() -> Value {
        Value {
            amount: Amount::from(1),
            asset_id: asset::Id::swap_nft(),
        }
    }

    /// The commitment to this swap's NFT note, with trapdoor `rcm`.
    pub fn swap_nft_commitment(&self, rcm: [u8; 32]) -> note::Commitment {
        note::Commitment::derive(&Self::swap_nft_value(), &self.claim_address, rcm)
    }
}

impl DomainType for SwapPlaintext {
    type Proto = proto::SwapPlaintext;
}

impl From<SwapPlaintext> for proto::SwapPlaintext {
    fn from(plaintext: SwapPlaintext) -> Self {
        proto::SwapPlaintext {
            trading_pair: Some(plaintext.trading_pair.into()),
            t1: plaintext.t1.into(),
            t2: plaintext.t2.into(),
            fee: plaintext.fee.into(),
            b_d: plaintext.claim_address.diversified_basepoint.to_vec(),
            pk_d: plaintext.claim_address.transmission_key.to_vec(),
        }
    }
}

impl TryFrom<proto::SwapPlaintext> for SwapPlaintext {
    type Error = SerializationError;

    fn try_from(msg: proto::SwapPlaintext) -> Result<Self, Self::Error> {
        Ok(SwapPlaintext {
            trading_pair: msg
                .trading_pair
                .ok_or(SerializationError::MissingField("SwapPlaintext.trading_pair"))?
                .try_into()?,
            t1: msg.t1.into(),
            t2: msg.t2.into(),
            fee: msg.fee.into(),
            claim_address: Address::from_wire(msg.b_d, msg.pk_d)?,
        })
    }
}

/// The encrypted [`SwapPlaintext`].
#[derive(Clone, PartialEq, Eq)]
pub struct SwapCiphertext(pub Vec<u8>);

impl fmt::Debug for SwapCiphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SwapCiphertext")
            .field(&format_args!("{} bytes", self.0.len()))
            .finish()
    }
}

/// The authorized, publicly verifiable part of a swap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapBody {
    /// The pair being traded, as submitted.
    pub trading_pair: TradingPair,
    /// Commitment to the `asset_1` input.
    pub ca1: value::Commitment,
    /// Commitment to the `asset_2` input.
    pub ca2: value::Commitment,
    /// Commitment to the fee.
    pub cf: value::Commitment,
    /// The swap NFT note minted for the submitter.
    pub swap_nft: NotePayload,
    /// The encrypted swap plaintext.
    pub swap_ciphertext: SwapCiphertext,
}

impl From<SwapBody> for proto::SwapBody {
    fn from(body: SwapBody) -> Self {
        proto::SwapBody {
            trading_pair: Some(body.trading_pair.into()),
            ca1: body.ca1.to_bytes().to_vec(),
            ca2: body.ca2.to_bytes().to_vec(),
            cf: body.cf.to_bytes().to_vec(),
            swap_nft: Some(body.swap_nft.into()),
            swap_ciphertext: body.swap_ciphertext.0,
        }
    }
}

impl TryFrom<proto::SwapBody> for SwapBody {
    type Error = SerializationError;

    fn try_from(msg: proto::SwapBody) -> Result<Self, Self::Error> {
        Ok(SwapBody {
            trading_pair: msg
                .trading_pair
                .ok_or(SerializationError::MissingField("SwapBody.trading_pair"))?
                .try_into()?,
            ca1: msg.ca1.try_into()?,
            ca2: msg.ca2.try_into()?,
            cf: msg.cf.try_into()?,
            swap_nft: msg
                .swap_nft
                .ok_or(SerializationError::MissingField("SwapBody.swap_nft"))?
                .try_into()?,
            swap_ciphertext: SwapCiphertext(msg.swap_ciphertext),
        })
    }
}

/// A swap action: contributes hidden amounts of both assets of a trading
/// pair to the batch of the block it is included in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Swap {
    /// The proof that the body, the flow ciphertexts, and the swap NFT all
    /// encode the same plaintext, and that the swap balances.
    pub zkproof: Proof,
    /// The encrypted `asset_1` contribution.
    pub enc_amount_1: MockFlowCiphertext,
    /// The encrypted `asset_2` contribution.
    pub enc_amount_2: MockFlowCiphertext,
    /// The swap body.
    pub body: SwapBody,
}

impl Swap {
    /// The commitment to the total value this swap consumes: both inputs and
    /// the fee.
    ///
    /// The surrounding transaction balances this against its spends.
    pub fn balance_commitment(&self) -> value::Commitment {
        [self.body.ca1, self.body.ca2, self.body.cf]
            .into_iter()
            .sum()
    }
}

impl DomainType for Swap {
    type Proto = proto::Swap;
}

impl From<Swap> for proto::Swap {
    fn from(swap: Swap) -> Self {
        proto::Swap {
            zkproof: swap.zkproof.0,
            enc_amount_1: Some(swap.enc_amount_1.into()),
            enc_amount_2: Some(swap.enc_amount_2.into()),
            body: Some(swap.body.into()),
        }
    }
}

impl TryFrom<proto::Swap> for Swap {
    type Error = SerializationError;

    fn try_from(msg: proto::Swap) -> Result<Self, Self::Error> {
        Ok(Swap {
            zkproof: Proof(msg.zkproof),
            enc_amount_1: msg
                .enc_amount_1
                .ok_or(SerializationError::MissingField("Swap.enc_amount_1"))?
                .try_into()?,
            enc_amount_2: msg
                .enc_amount_2
                .ok_or(SerializationError::MissingField("Swap.enc_amount_2"))?
                .try_into()?,
            body: msg
                .body
                .ok_or(SerializationError::MissingField("Swap.body"))?
                .try_into()?,
        })
    }
}
