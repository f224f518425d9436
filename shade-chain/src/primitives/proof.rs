use std::fmt;

/// An opaque zero-knowledge proof.
///
/// Proof bytes are only interpreted by a proof verifier.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Proof(pub Vec<u8>);

impl fmt::Debug for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Proof")
            .field(&hex::encode(&self.0))
            .finish()
    }
}

impl AsRef<[u8]> for Proof {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Proof {
    fn from(bytes: Vec<u8>) -> Self {
        Proof(bytes)
    }
}
