//! Inbound processing loop.
//!
//! Drains the host's incoming-message channel and runs each message
//! through the automatic decryption stage.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::inbound::{self, InboundOutcome};
use crate::state::OverlayState;
use crate::types::IncomingMessage;

/// Spawn the loop. It runs until the channel closes or the handle is
/// aborted.
pub fn start_inbound_loop(
    mut rx: mpsc::UnboundedReceiver<IncomingMessage>,
    state: OverlayState,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Inbound processing loop started");

        while let Some(message) = rx.recv().await {
            match inbound::process_incoming(&state, &message).await {
                InboundOutcome::Decrypted(update) => {
                    tracing::debug!(
                        "Decrypted message {} in conversation {}",
                        update.message_id,
                        update.conversation_id
                    );
                }
                InboundOutcome::Failed(reason) => {
                    tracing::warn!("Message {} left encrypted: {}", message.id, reason);
                }
                InboundOutcome::Unchanged => {}
            }
        }

        tracing::info!("Inbound processing loop ended");
    })
}
