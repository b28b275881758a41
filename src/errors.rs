//! Error types for the overlay.

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Debug, Clone, Error)]
pub enum CryptoError {
    /// Armored text could not be parsed as a key.
    #[error("key format error: {0}")]
    KeyFormat(String),

    /// Key generation, encryption, or decryption failed at the engine.
    #[error("crypto operation failed: {0}")]
    Operation(String),
}

/// Errors from the key store.
///
/// `Clone` because one flush of the write queue can answer several
/// coalesced waiters with the same outcome.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Loading or saving the key blob against the substrate failed.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Persistence(err.to_string())
    }
}
