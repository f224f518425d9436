//! Protobuf wire messages.
//!
//! Field numbers are part of the compatibility contract. They must never be
//! reused or renumbered.

#![allow(missing_docs)]

/// An opaque asset identifier.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct AssetId {
    #[prost(bytes = "vec", tag = "1")]
    pub inner: Vec<u8>,
}

/// A pair of assets, in the order chosen by the submitter.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TradingPair {
    #[prost(message, optional, tag = "1")]
    pub asset_1: Option<AssetId>,
    #[prost(message, optional, tag = "2")]
    pub asset_2: Option<AssetId>,
}

/// A homomorphically addable encryption of a swap amount.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MockFlowCiphertext {
    #[prost(uint64, tag = "1")]
    pub value: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Value {
    #[prost(uint64, tag = "1")]
    pub amount: u64,
    #[prost(message, optional, tag = "2")]
    pub asset_id: Option<AssetId>,
}

/// The public part of a new note. `swap_nft` is present only on swap NFTs.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NotePayload {
    #[prost(bytes = "vec", tag = "1")]
    pub note_commitment: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub ephemeral_key: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub encrypted_note: Vec<u8>,
    #[prost(message, optional, tag = "4")]
    pub swap_nft: Option<Value>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SwapPlaintext {
    #[prost(message, optional, tag = "1")]
    pub trading_pair: Option<TradingPair>,
    #[prost(uint64, tag = "2")]
    pub t1: u64,
    #[prost(uint64, tag = "3")]
    pub t2: u64,
    #[prost(uint64, tag = "4")]
    pub fee: u64,
    #[prost(bytes = "vec", tag = "5")]
    pub b_d: Vec<u8>,
    #[prost(bytes = "vec", tag = "6")]
    pub pk_d: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SwapBody {
    #[prost(message, optional, tag = "1")]
    pub trading_pair: Option<TradingPair>,
    #[prost(bytes = "vec", tag = "2")]
    pub ca1: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub ca2: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub cf: Vec<u8>,
    #[prost(message, optional, tag = "5")]
    pub swap_nft: Option<NotePayload>,
    #[prost(bytes = "vec", tag = "6")]
    pub swap_ciphertext: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Swap {
    #[prost(bytes = "vec", tag = "1")]
    pub zkproof: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub enc_amount_1: Option<MockFlowCiphertext>,
    #[prost(message, optional, tag = "3")]
    pub enc_amount_2: Option<MockFlowCiphertext>,
    #[prost(message, optional, tag = "4")]
    pub body: Option<SwapBody>,
}

/// Prices are 32-byte little-endian fixed-point numbers.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SwapClaim {
    #[prost(bytes = "vec", tag = "1")]
    pub zkproof: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub nullifier: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub fee: u64,
    #[prost(message, optional, tag = "4")]
    pub output_1: Option<NotePayload>,
    #[prost(message, optional, tag = "5")]
    pub output_2: Option<NotePayload>,
    #[prost(bytes = "vec", tag = "6")]
    pub anchor: Vec<u8>,
    #[prost(bytes = "vec", tag = "7")]
    pub price_1: Vec<u8>,
    #[prost(bytes = "vec", tag = "8")]
    pub price_2: Vec<u8>,
    #[prost(message, optional, tag = "9")]
    pub trading_pair: Option<TradingPair>,
}
