//! Messaging commands.

use crate::crypto::pgp;
use crate::state::OverlayState;
use crate::types::ApiError;

/// Encrypt one message for the conversation's counterpart and send it.
///
/// Unlike the automatic interceptor this is a user-initiated action, so
/// every failure is surfaced instead of falling back to plaintext.
/// Returns the transmitted ciphertext.
pub async fn encrypt_and_send_once(
    state: &OverlayState,
    conversation_id: String,
    plaintext: String,
) -> Result<String, ApiError> {
    tracing::info!(
        "One-shot encrypted send in conversation {}",
        conversation_id
    );

    if plaintext.is_empty() {
        return Err(ApiError::validation("Message content must not be empty"));
    }

    let counterpart = state
        .directory
        .direct_counterpart(&conversation_id)
        .await
        .map_err(|e| ApiError::internal(format!("Counterpart lookup failed: {}", e)))?
        .ok_or_else(|| {
            ApiError::validation("Encrypted send requires a one-to-one conversation")
        })?;

    state.keys.init().await?;
    let public_key = match state.keys.get(&counterpart) {
        Some(record) if record.has_public_key() => record.public_key.clone(),
        _ => {
            return Err(ApiError::not_found(format!(
                "No public key stored for {}",
                counterpart
            )))
        }
    };

    let ciphertext = pgp::encrypt(plaintext, public_key).await?;

    if let Err(e) = state
        .transmitter
        .transmit(&conversation_id, &ciphertext)
        .await
    {
        tracing::error!("Failed to transmit encrypted message: {}", e);
        return Err(ApiError::internal(format!("Transmission failed: {}", e)));
    }

    tracing::info!("Encrypted message sent in conversation {}", conversation_id);
    Ok(ciphertext)
}

/// Flip the automatic-encryption flag from within a conversation.
///
/// The flag always flips; a missing counterpart key is advisory, not a
/// reason to refuse. Returns the new flag value.
pub async fn toggle_auto_encrypt(
    state: &OverlayState,
    conversation_id: String,
) -> Result<bool, ApiError> {
    let counterpart = state
        .directory
        .direct_counterpart(&conversation_id)
        .await
        .map_err(|e| ApiError::internal(format!("Counterpart lookup failed: {}", e)))?
        .ok_or_else(|| {
            ApiError::validation("Automatic encryption applies to one-to-one conversations")
        })?;

    let enabled = state.toggle_auto_encrypt().await?;
    tracing::info!(
        "Automatic encryption {} (from conversation {})",
        if enabled { "enabled" } else { "disabled" },
        conversation_id
    );
    state.events.encryption_toggled(conversation_id, enabled);

    if enabled {
        if let Err(e) = state.keys.init().await {
            tracing::warn!("Key store load failed during toggle: {}", e);
        }
        let missing_key = state
            .keys
            .get(&counterpart)
            .map(|record| !record.has_public_key())
            .unwrap_or(true);
        if missing_key {
            state.events.system_notification(format!(
                "Automatic encryption is on, but no public key is stored for {}. \
                 Messages will be sent unencrypted until one is saved.",
                counterpart
            ));
        }
    }

    Ok(enabled)
}
