//! Consensus-critical serialization.
//!
//! Every wire type has a protobuf message in [`proto`](crate::proto) and a
//! domain type that only holds structurally valid values. Decoding goes
//! through the message and then through `TryFrom`, so malformed input is
//! rejected before any other check runs.

mod error;

use std::io;

pub use error::SerializationError;

/// A domain type with a protobuf wire encoding.
pub trait DomainType:
    Clone + Into<Self::Proto> + TryFrom<Self::Proto, Error = SerializationError>
{
    /// The wire message for this type.
    type Proto: prost::Message + Default;
}

/// Consensus-critical serialization.
///
/// Serialization is infallible up to errors in the underlying writer:
/// domain types make illegal states unrepresentable.
pub trait ShadeSerialize: Sized {
    /// Write `self` to the given `writer` using the canonical format.
    fn shade_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error>;

    /// Helper function to construct a vec to serialize the current struct into
    fn shade_serialize_to_vec(&self) -> Vec<u8> {
        let mut data = Vec::new();
        self.shade_serialize(&mut data)
            .expect("writing to a Vec never fails");
        data
    }
}

/// Consensus-critical deserialization.
pub trait ShadeDeserialize: Sized {
    /// Try to read `self` from the given `reader`.
    fn shade_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError>;
}

/// Helper for deserializing more succinctly via type inference
pub trait ShadeDeserializeInto {
    /// Deserialize based on type inference
    fn shade_deserialize_into<T>(self) -> Result<T, SerializationError>
    where
        T: ShadeDeserialize;
}

impl<R: io::Read> ShadeDeserializeInto for R {
    fn shade_deserialize_into<T>(self) -> Result<T, SerializationError>
    where
        T: ShadeDeserialize,
    {
        T::shade_deserialize(self)
    }
}

impl<T: DomainType> ShadeSerialize for T {
    fn shade_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        let msg: T::Proto = self.clone().into();
        writer.write_all(&prost::Message::encode_to_vec(&msg))
    }
}

impl<T: DomainType> ShadeDeserialize for T {
    fn shade_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let msg = <T::Proto as prost::Message>::decode(&bytes[..])?;
        T::try_from(msg)
    }
}
