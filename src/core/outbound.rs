//! Pre-send interception of outgoing messages.

use crate::core::classifier;
use crate::crypto::pgp;
use crate::state::OverlayState;

/// What the interceptor decided about one outgoing message.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundOutcome {
    /// Send the content exactly as typed
    Unchanged,
    /// Send this ciphertext instead of the typed content
    Encrypted(String),
    /// Encryption was attempted and failed; send the original content
    Failed(String),
}

/// Decide whether an outgoing message should be replaced with ciphertext.
///
/// Every failure path keeps the original content: a send is never
/// blocked because encryption did not happen.
pub async fn intercept_outgoing(
    state: &OverlayState,
    conversation_id: &str,
    content: &str,
) -> OutboundOutcome {
    let settings = state.policy_settings().await;
    if !settings.auto_encrypt {
        return OutboundOutcome::Unchanged;
    }

    let counterpart = match state.directory.direct_counterpart(conversation_id).await {
        Ok(Some(counterpart)) => counterpart,
        Ok(None) => {
            // Group and broadcast conversations are never auto-encrypted.
            if settings.log_debug {
                tracing::debug!(
                    "Conversation {} has no single counterpart, sending as is",
                    conversation_id
                );
            }
            return OutboundOutcome::Unchanged;
        }
        Err(e) => {
            tracing::warn!(
                "Counterpart lookup failed for conversation {}, sending as is: {}",
                conversation_id,
                e
            );
            return OutboundOutcome::Unchanged;
        }
    };

    if classifier::is_pgp_message(content) {
        if settings.log_debug {
            tracing::debug!(
                "Outgoing message to {} is already an envelope, not re-encrypting",
                counterpart
            );
        }
        return OutboundOutcome::Unchanged;
    }

    if let Err(e) = state.keys.init().await {
        tracing::warn!(
            "Key store load failed before send, continuing without keys: {}",
            e
        );
    }

    let public_key = match state.keys.get(&counterpart) {
        Some(record) if record.has_public_key() => record.public_key.clone(),
        _ => {
            if settings.log_debug {
                tracing::debug!(
                    "No public key stored for {}, sending plaintext",
                    counterpart
                );
            }
            return OutboundOutcome::Unchanged;
        }
    };

    match pgp::encrypt(content.to_string(), public_key).await {
        Ok(ciphertext) => {
            if settings.log_debug {
                tracing::debug!(
                    "Encrypted outgoing message for {} ({} chars of ciphertext)",
                    counterpart,
                    ciphertext.len()
                );
            }
            OutboundOutcome::Encrypted(ciphertext)
        }
        Err(e) => {
            tracing::error!(
                "Failed to encrypt outgoing message for {}: {}",
                counterpart,
                e
            );
            OutboundOutcome::Failed(e.to_string())
        }
    }
}
