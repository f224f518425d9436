//! Verification of cryptographic primitives: proofs and flow decryption.

use crate::BoxError;

pub mod decryption;
pub mod proof;

/// Fires off a task into the Rayon threadpool and awaits the result through a
/// oneshot channel.
///
/// Proof checks are CPU-bound, so they run on Rayon rather than on the async
/// executor.
pub(crate) async fn spawn_fifo<T, F>(f: F) -> Result<T, BoxError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (rsp_tx, rsp_rx) = tokio::sync::oneshot::channel();

    rayon::spawn_fifo(move || {
        // The receiver may have been dropped if the caller was cancelled.
        let _ = rsp_tx.send(f());
    });

    rsp_rx
        .await
        .map_err(|_| BoxError::from("verification task panicked or was dropped"))
}
