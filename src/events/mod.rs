//! Event system for updates from the overlay to its host.
//!
//! The overlay pushes events into a channel; the host drains the
//! receiver and decides how to surface each event (frontend push,
//! toast, log line).

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// All events the overlay can emit toward the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum OverlayEvent {
    /// An incoming envelope was decrypted and republished
    MessageDecrypted {
        #[serde(rename = "messageId")]
        message_id: String,
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },

    /// Automatic encryption was switched on or off for a conversation
    EncryptionToggled {
        #[serde(rename = "conversationId")]
        conversation_id: String,
        enabled: bool,
    },

    /// Key material for a correspondent was stored or deleted
    KeysChanged {
        #[serde(rename = "correspondentId")]
        correspondent_id: String,
    },

    /// Every stored key record was removed
    KeysCleared,

    /// Free-form notification for the user
    SystemNotification {
        /// The notification message
        message: String,
    },
}

/// Event emitter helper.
#[derive(Clone)]
pub struct EventEmitter {
    tx: mpsc::UnboundedSender<OverlayEvent>,
}

impl EventEmitter {
    /// Create an emitter together with the receiver the host drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OverlayEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Push an event toward the host.
    pub fn emit(&self, event: OverlayEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::error!("Failed to emit event: {}", e);
        }
    }

    /// Emit a message decrypted event
    pub fn message_decrypted(&self, message_id: String, conversation_id: String) {
        self.emit(OverlayEvent::MessageDecrypted {
            message_id,
            conversation_id,
        });
    }

    /// Emit an encryption toggled event
    pub fn encryption_toggled(&self, conversation_id: String, enabled: bool) {
        self.emit(OverlayEvent::EncryptionToggled {
            conversation_id,
            enabled,
        });
    }

    /// Emit a keys changed event
    pub fn keys_changed(&self, correspondent_id: String) {
        self.emit(OverlayEvent::KeysChanged { correspondent_id });
    }

    /// Emit a keys cleared event
    pub fn keys_cleared(&self) {
        self.emit(OverlayEvent::KeysCleared);
    }

    /// Emit a system notification event
    pub fn system_notification(&self, message: String) {
        self.emit(OverlayEvent::SystemNotification { message });
    }
}
