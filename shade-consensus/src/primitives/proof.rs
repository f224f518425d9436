//! Zero-knowledge proof verification.
//!
//! Settlement treats the proving system as an oracle: a [`ProofVerifier`]
//! answers whether a proof is valid for a set of [`PublicInputs`]. The public
//! inputs of each action are built by its [`Description`] impl, so every
//! verifier sees exactly the same statement.

use shade_chain::{
    amount::Amount,
    dex::{MockFlowCiphertext, Price, Swap, SwapClaim, TradingPair},
    note::{self, Nullifier},
    primitives::Proof,
    tree, value,
};


/// The public inputs of an action's proof statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicInputs {
    /// The statement that a swap's commitments, flow ciphertexts, and swap
    /// NFT all encode the same plaintext, and that the swap balances.
    ///
    /// `swap_nft_value` is the value the swap NFT payload declares in the
    /// clear, or `None` if the payload is not tagged as a swap NFT.
    Swap {
        ca1: value::Commitment,
        ca2: value::Commitment,
        cf: value::Commitment,
        trading_pair: TradingPair,
        enc_amount_1: MockFlowCiphertext,
        enc_amount_2: MockFlowCiphertext,
        swap_nft_commitment: note::Commitment,
        swap_nft_value: Option<value::Value>,
    },

    /// The statement that a claim's outputs are its swap's share of the
    /// batch priced at `price_1` and `price_2`, less `fee`.
    SwapClaim {
        nullifier: Nullifier,
        fee: Amount,
        output_1_commitment: note::Commitment,
        output_2_commitment: note::Commitment,
        anchor: tree::Root,
        trading_pair: TradingPair,
        price_1: Price,
        price_2: Price,
    },
}

impl PublicInputs {
    /// Encode the public inputs as bytes, prefixed with a statement tag.
    ///
    /// Trading pairs are encoded in the order they were submitted. A declared
    /// swap NFT value is a `1` byte, then its amount and asset id; a payload
    /// with no declared value is a single `0` byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        match self {
            PublicInputs::Swap {
                ca1,
                ca2,
                cf,
                trading_pair,
                enc_amount_1,
                enc_amount_2,
                swap_nft_commitment,
                swap_nft_value,
            } => {
                bytes.push(b'S');
                bytes.extend_from_slice(&ca1.to_bytes());
                bytes.extend_from_slice(&ca2.to_bytes());
                bytes.extend_from_slice(&cf.to_bytes());
                bytes.extend_from_slice(&trading_pair.asset_1().to_bytes());
                bytes.extend_from_slice(&trading_pair.asset_2().to_bytes());
                bytes.extend_from_slice(&enc_amount_1.mock_plaintext().to_le_bytes());
                bytes.extend_from_slice(&enc_amount_2.mock_plaintext().to_le_bytes());
                bytes.extend_from_slice(&swap_nft_commitment.to_bytes());
                match swap_nft_value {
                    Some(value) => {
                        bytes.push(1);
                        bytes.extend_from_slice(&u64::from(value.amount).to_le_bytes());
                        bytes.extend_from_slice(&value.asset_id.to_bytes());
                    }
                    None => bytes.push(0),
                }
            }
            PublicInputs::SwapClaim {
                nullifier,
                fee,
                output_1_commitment,
                output_2_commitment,
                anchor,
                trading_pair,
                price_1,
                price_2,
            } => {
                bytes.push(b'C');
                bytes.extend_from_slice(&nullifier.to_bytes());
                bytes.extend_from_slice(&u64::from(*fee).to_le_bytes());
                bytes.extend_from_slice(&output_1_commitment.to_bytes());
                bytes.extend_from_slice(&output_2_commitment.to_bytes());
                bytes.extend_from_slice(&anchor.to_bytes());
                bytes.extend_from_slice(&trading_pair.asset_1().to_bytes());
                bytes.extend_from_slice(&trading_pair.asset_2().to_bytes());
                bytes.extend_from_slice(&price_1.to_bytes());
                bytes.extend_from_slice(&price_2.to_bytes());
            }
        }

        bytes
    }
}

/// An action with a proof and the public inputs it is checked against.
pub trait Description {
    /// The proof of this action.
    fn proof(&self) -> &Proof;

    /// The public inputs for this action's proof statement.
    fn public_inputs(&self) -> PublicInputs;
}

impl Description for Swap {
    fn proof(&self) -> &Proof {
        &self.zkproof
    }

    fn public_inputs(&self) -> PublicInputs {
        PublicInputs::Swap {
            ca1: self.body.ca1,
            ca2: self.body.ca2,
            cf: self.body.cf,
            trading_pair: self.body.trading_pair,
            enc_amount_1: self.enc_amount_1,
            enc_amount_2: self.enc_amount_2,
            swap_nft_commitment: self.body.swap_nft.note_commitment,
            swap_nft_value: self.body.swap_nft.swap_nft_value(),
        }
    }
}

impl Description for SwapClaim {
    fn proof(&self) -> &Proof {
        &self.zkproof
    }

    fn public_inputs(&self) -> PublicInputs {
        PublicInputs::SwapClaim {
            nullifier: self.nullifier,
            fee: self.fee,
            output_1_commitment: self.output_1.note_commitment,
            output_2_commitment: self.output_2.note_commitment,
            anchor: self.anchor,
            trading_pair: self.trading_pair,
            price_1: self.price_1,
            price_2: self.price_2,
        }
    }
}

/// A proof verification oracle.
///
/// Verifiers are assumed to be sound and complete, and must give the same
/// answer for the same inputs on every validator.
pub trait ProofVerifier: Send + Sync + 'static {
    /// Returns `true` if `proof` is valid for `public_inputs`.
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> bool;
}

impl<F> ProofVerifier for F
where
    F: Fn(&Proof, &PublicInputs) -> bool + Send + Sync + 'static,
{
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> bool {
        self(proof, public_inputs)
    }
}

/// A deterministic development proof backend.
///
/// A proof is valid if and only if it is the personalized BLAKE2b-512 digest
/// of the public inputs. This binds proofs to their statements, but proves
/// nothing about the private witness.
#[derive(Clone, Copy, Debug, Default)]
pub struct DigestProofVerifier;

impl DigestProofVerifier {
    /// Produce the proof this verifier accepts for `public_inputs`.
    ///
    /// Proof := BLAKE2b-512("Shade_ProofDgst_", public inputs)
    pub fn prove(public_inputs: &PublicInputs) -> Proof {
        let hash = blake2b_simd::Params::new()
            .hash_length(64)
            .personal(b"Shade_ProofDgst_")
            .to_state()
            .update(&public_inputs.to_bytes())
            .finalize();

        Proof(hash.as_bytes().to_vec())
    }
}

impl ProofVerifier for DigestProofVerifier {
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> bool {
        let valid = *proof == Self::prove(public_inputs);
        tracing::trace!(?valid, "checked digest proof");

        valid
    }
}
