//! Shared data types used across the overlay.
//!
//! All DTOs that cross the host boundary serialize with camelCase field
//! names to match the host application's storage and event payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{CryptoError, StoreError};

// ========== Key Material ==========

/// Armored key material held for a single correspondent.
///
/// Either side may be empty: a record with only a `public_key` can encrypt
/// to the correspondent, a record with only a `private_key` can decrypt
/// what they send. A record with both sides empty is treated as deleted.
#[derive(Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    /// Armored public key, or empty when none is stored
    #[serde(default)]
    pub public_key: String,
    /// Armored private key, or empty when none is stored
    #[serde(default)]
    pub private_key: String,
}

impl KeyRecord {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    pub fn has_public_key(&self) -> bool {
        !self.public_key.is_empty()
    }

    pub fn has_private_key(&self) -> bool {
        !self.private_key.is_empty()
    }

    /// Both sides empty, the marker for a deleted record.
    pub fn is_empty(&self) -> bool {
        !self.has_public_key() && !self.has_private_key()
    }
}

// Private key material must never leak through debug logging.
impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("has_public_key", &self.has_public_key())
            .field("has_private_key", &self.has_private_key())
            .finish()
    }
}

/// A freshly generated armored key pair, returned to the caller without
/// being stored anywhere.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct ArmoredKeyPair {
    /// Armored public key
    pub public_key: String,
    /// Armored private key
    pub private_key: String,
}

impl fmt::Debug for ArmoredKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmoredKeyPair")
            .field("public_key", &"<armored>")
            .field("private_key", &"<redacted>")
            .finish()
    }
}

// ========== Policy Settings ==========

/// User-facing toggles controlling the automatic pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicySettings {
    /// Decrypt incoming envelopes automatically
    pub auto_decrypt: bool,
    /// Encrypt outgoing plaintext automatically
    pub auto_encrypt: bool,
    /// Prefix decrypted message content with a visual indicator
    pub show_indicator: bool,
    /// Emit verbose per-message diagnostics
    pub log_debug: bool,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            auto_decrypt: true,
            auto_encrypt: false,
            show_indicator: true,
            log_debug: false,
        }
    }
}

// ========== Message DTOs ==========

/// An incoming message as delivered by the host pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    /// Host-assigned message identifier
    pub id: String,
    /// Conversation the message belongs to
    pub conversation_id: String,
    /// Sender identifier, absent for system-generated entries
    pub sender: Option<String>,
    /// Text content, empty when the message carries no text
    #[serde(default)]
    pub content: String,
}

/// Replacement content for an already-delivered message, republished to
/// the host after successful decryption.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageUpdate {
    /// Identifier of the message being replaced
    pub message_id: String,
    /// Conversation the message belongs to
    pub conversation_id: String,
    /// New content, the recovered plaintext
    pub content: String,
    /// Original ciphertext, kept so the envelope is never lost
    pub pgp_original_content: Option<String>,
    /// Marks the content as the product of decryption
    pub pgp_decrypted: bool,
}

// ========== API Errors ==========

/// Standardized error envelope returned from command handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::new("CRYPTO_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<CryptoError> for ApiError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::KeyFormat(msg) => Self::new("KEY_FORMAT_ERROR", msg),
            CryptoError::Operation(msg) => Self::crypto(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Persistence(msg) => Self::new("PERSISTENCE_ERROR", msg),
        }
    }
}
