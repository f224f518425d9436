//! Opening aggregate flow ciphertexts.

use std::fmt;

use shade_chain::dex::MockFlowCiphertext;

/// Opens the aggregate flow ciphertexts of a finalized block.
///
/// In a deployment this is threshold decryption by the validators. It is
/// invoked once for each asset of each trading pair with flows in the block,
/// and never on an individual swap's ciphertext.
pub trait FlowDecryptor: fmt::Debug + Send + Sync + 'static {
    /// Returns the plaintext total encrypted by `ciphertext`.
    fn open(&self, ciphertext: &MockFlowCiphertext) -> u128;
}

/// Opens mock flow ciphertexts, which hold their plaintext.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockFlowDecryptor;

impl FlowDecryptor for MockFlowDecryptor {
    fn open(&self, ciphertext: &MockFlowCiphertext) -> u128 {
        ciphertext.mock_plaintext()
    }
}
