//! Key management commands.

use std::collections::HashMap;

use crate::crypto::pgp;
use crate::crypto::pgp::KeyAlgorithm;
use crate::state::OverlayState;
use crate::types::{ApiError, ArmoredKeyPair, KeyRecord};

/// Fetch the key record stored for a correspondent.
pub async fn get_keys(
    state: &OverlayState,
    correspondent_id: String,
) -> Result<Option<KeyRecord>, ApiError> {
    if correspondent_id.is_empty() {
        return Err(ApiError::validation("Correspondent id must not be empty"));
    }

    state.keys.init().await?;
    Ok(state.keys.get(&correspondent_id))
}

/// Store a key record for a correspondent.
///
/// Each provided side is validated before anything is written. A record
/// with both sides empty deletes the stored entry.
pub async fn save_keys(
    state: &OverlayState,
    correspondent_id: String,
    record: KeyRecord,
) -> Result<(), ApiError> {
    tracing::info!("Saving key record for correspondent {}", correspondent_id);

    if correspondent_id.is_empty() {
        return Err(ApiError::validation("Correspondent id must not be empty"));
    }
    if record.has_public_key() {
        pgp::validate_public_key(&record.public_key)?;
    }
    if record.has_private_key() {
        pgp::validate_private_key(&record.private_key)?;
    }

    state.keys.put(&correspondent_id, record).await?;
    state.events.keys_changed(correspondent_id);
    Ok(())
}

/// Generate a fresh key pair.
///
/// The pair is returned to the caller and deliberately not stored; the
/// caller decides which correspondent record it belongs to.
pub async fn generate_keys(
    state: &OverlayState,
    algorithm: Option<KeyAlgorithm>,
    identity: String,
) -> Result<ArmoredKeyPair, ApiError> {
    let algorithm = algorithm.unwrap_or_default();
    tracing::info!("Generating {} key pair", algorithm.label());

    if identity.is_empty() {
        return Err(ApiError::validation("Identity must not be empty"));
    }

    // Touch the store so a following save does not pay the first-load
    // cost while the user is looking at the result.
    if let Err(e) = state.keys.init().await {
        tracing::warn!("Key store load failed during generation: {}", e);
    }

    let pair = pgp::generate_armored(algorithm, identity).await?;
    Ok(pair)
}

/// Check that armored text parses as a public key.
pub async fn validate_public_key(armored: String) -> Result<(), ApiError> {
    pgp::validate_public_key(&armored)?;
    Ok(())
}

/// Check that armored text parses as a private key.
pub async fn validate_private_key(armored: String) -> Result<(), ApiError> {
    pgp::validate_private_key(&armored)?;
    Ok(())
}

/// Delete the key record stored for a correspondent.
pub async fn delete_keys(
    state: &OverlayState,
    correspondent_id: String,
) -> Result<(), ApiError> {
    tracing::info!("Deleting key record for correspondent {}", correspondent_id);

    if correspondent_id.is_empty() {
        return Err(ApiError::validation("Correspondent id must not be empty"));
    }

    state.keys.delete(&correspondent_id).await?;
    state.events.keys_changed(correspondent_id);
    Ok(())
}

/// Export every stored key record.
pub async fn export_keys(
    state: &OverlayState,
) -> Result<HashMap<String, KeyRecord>, ApiError> {
    let records = state.keys.get_all().await?;
    tracing::info!("Exporting {} key record(s)", records.len());
    Ok(records)
}

/// Remove every stored key record.
pub async fn clear_keys(state: &OverlayState) -> Result<(), ApiError> {
    tracing::info!("Clearing all key records");
    state.keys.clear().await?;
    state.events.keys_cleared();
    Ok(())
}
