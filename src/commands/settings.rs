//! Policy settings commands.

use crate::state::OverlayState;
use crate::types::{ApiError, PolicySettings};

/// Current policy settings.
pub async fn get_policy_settings(state: &OverlayState) -> Result<PolicySettings, ApiError> {
    Ok(state.policy_settings().await)
}

/// Replace the policy settings and persist them.
pub async fn update_policy_settings(
    state: &OverlayState,
    settings: PolicySettings,
) -> Result<(), ApiError> {
    tracing::info!(
        "Updating policy settings: autoDecrypt={} autoEncrypt={} showIndicator={} logDebug={}",
        settings.auto_decrypt,
        settings.auto_encrypt,
        settings.show_indicator,
        settings.log_debug
    );
    state.update_policy_settings(settings).await?;
    Ok(())
}
