//! Automatic decryption of received envelopes.

use crate::core::classifier;
use crate::crypto::pgp;
use crate::state::OverlayState;
use crate::types::{IncomingMessage, MessageUpdate};

/// Prefix marking republished content as decrypted.
pub const DECRYPTED_INDICATOR: &str = "\u{1F513} ";

/// What the processor did with one incoming message.
#[derive(Debug, Clone)]
pub enum InboundOutcome {
    /// Leave the message exactly as delivered
    Unchanged,
    /// The message was decrypted and republished with this update
    Decrypted(MessageUpdate),
    /// Decryption or republish failed; the ciphertext stays visible
    Failed(String),
}

/// Process one incoming message.
///
/// Failure never surfaces into the conversation: when anything goes
/// wrong the delivered ciphertext simply stays as it is.
pub async fn process_incoming(state: &OverlayState, message: &IncomingMessage) -> InboundOutcome {
    let settings = state.policy_settings().await;
    if !settings.auto_decrypt {
        return InboundOutcome::Unchanged;
    }

    let sender = match &message.sender {
        Some(sender) if !message.content.is_empty() => sender,
        _ => return InboundOutcome::Unchanged,
    };

    if !classifier::is_pgp_message(&message.content) {
        return InboundOutcome::Unchanged;
    }

    if let Err(e) = state.keys.init().await {
        tracing::warn!(
            "Key store load failed before decrypt, continuing without keys: {}",
            e
        );
    }

    let private_key = match state.keys.get(sender) {
        Some(record) if record.has_private_key() => record.private_key.clone(),
        _ => {
            if settings.log_debug {
                tracing::debug!(
                    "No private key stored for sender {}, leaving ciphertext",
                    sender
                );
            }
            return InboundOutcome::Unchanged;
        }
    };

    let plaintext = match pgp::decrypt(message.content.clone(), private_key).await {
        Ok(plaintext) => plaintext,
        Err(e) => {
            tracing::error!(
                "Failed to decrypt message {} from {}: {}",
                message.id,
                sender,
                e
            );
            return InboundOutcome::Failed(e.to_string());
        }
    };

    if plaintext == message.content {
        return InboundOutcome::Unchanged;
    }

    let content = if settings.show_indicator {
        format!("{}{}", DECRYPTED_INDICATOR, plaintext)
    } else {
        plaintext
    };

    let update = MessageUpdate {
        message_id: message.id.clone(),
        conversation_id: message.conversation_id.clone(),
        content,
        pgp_original_content: Some(message.content.clone()),
        pgp_decrypted: true,
    };

    if let Err(e) = state.republisher.republish(update.clone()).await {
        tracing::error!(
            "Failed to republish decrypted message {}: {}",
            message.id,
            e
        );
        return InboundOutcome::Failed(e.to_string());
    }

    state
        .events
        .message_decrypted(update.message_id.clone(), update.conversation_id.clone());

    if settings.log_debug {
        tracing::debug!(
            "Decrypted and republished message {} from {}",
            update.message_id,
            sender
        );
    }

    InboundOutcome::Decrypted(update)
}
