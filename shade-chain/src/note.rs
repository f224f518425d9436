//! Note payloads, note commitments, and nullifiers.
//!
//! A note payload is the public part of a newly created note. Regular notes
//! hide their value entirely. Swap NFT notes are a tagged variant of the same
//! payload that also reveal their denomination flag, so that a swap's claim
//! right can be checked without a separate note type.

mod commitment;
mod nullifier;


use std::fmt;

use crate::{proto, serialization::SerializationError, value::Value};

pub use commitment::Commitment;
pub use nullifier::Nullifier;

/// The ephemeral public key used to encrypt a note to its recipient.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EphemeralKey(pub [u8; 32]);

impl fmt::Debug for EphemeralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EphemeralKey")
            .field(&hex::encode(self.0))
            .finish()
    }
}

/// The note plaintext, encrypted to the recipient.
///
/// Settlement never opens this ciphertext.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedNote(pub Vec<u8>);

impl fmt::Debug for EncryptedNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncryptedNote")
            .field(&format_args!("{} bytes", self.0.len()))
            .finish()
    }
}

/// What kind of note a payload creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteKind {
    /// A note whose value is hidden.
    Regular,

    /// A swap NFT, which reveals its value so that validators can check that
    /// it is exactly one unit of the swap NFT denomination.
    SwapNft {
        /// The declared value of the NFT.
        value: Value,
    },
}

/// The public part of a newly created note.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotePayload {
    /// The commitment to the note's contents.
    pub note_commitment: Commitment,
    /// The ephemeral key for the note ciphertext.
    pub ephemeral_key: EphemeralKey,
    /// The encrypted note plaintext.
    pub encrypted_note: EncryptedNote,
    /// The note kind tag.
    pub kind: NoteKind,
}

impl NotePayload {
    /// Returns the declared value, if this payload is tagged as a swap NFT.
    pub fn swap_nft_value(&self) -> Option<Value> {
        match self.kind {
            NoteKind::SwapNft { value } => Some(value),
            NoteKind::Regular => None,
        }
    }
}

impl From<NotePayload> for proto::NotePayload {
    fn from(payload: NotePayload) -> Self {
        let swap_nft = payload.swap_nft_value().map(Into::into);
        proto::NotePayload {
            note_commitment: payload.note_commitment.to_bytes().to_vec(),
            ephemeral_key: payload.ephemeral_key.0.to_vec(),
            encrypted_note: payload.encrypted_note.0,
            swap_nft,
        }
    }
}

impl TryFrom<proto::NotePayload> for NotePayload {
    type Error = SerializationError;

    fn try_from(msg: proto::NotePayload) -> Result<Self, Self::Error> {
        let note_commitment = Commitment::try_from(msg.note_commitment)?;
        let ephemeral_key = EphemeralKey(
            msg.ephemeral_key
                .try_into()
                .map_err(|_| SerializationError::Parse("ephemeral key must be 32 bytes"))?,
        );

        let kind = match msg.swap_nft {
            Some(value) => NoteKind::SwapNft {
                value: value.try_into()?,
            },
            None => NoteKind::Regular,
        };

        Ok(NotePayload {
            note_commitment,
            ephemeral_key,
            encrypted_note: EncryptedNote(msg.encrypted_note),
            kind,
        })
    }
}
