use std::io;

use thiserror::Error;

/// A serialization error.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// An io error that prevented deserialization
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The bytes were not a valid protobuf message.
    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// The data to be deserialized was malformed.
    #[error("parse error: {0}")]
    Parse(&'static str),

    /// A required message field was absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
