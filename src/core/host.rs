//! Seams between the overlay and its host application.
//!
//! The overlay never touches a UI, a database, or a network directly.
//! The host wires these traits in at startup; the pipeline stages,
//! commands, and key store reach the outside world only through them.

use anyhow::Result;
use async_trait::async_trait;

use crate::types::MessageUpdate;

// ========== Conversation Lookup ==========

/// Resolves the conversation metadata the overlay needs for policy checks.
#[async_trait]
pub trait ConversationDirectory: Send + Sync {
    /// The single counterpart of a one-to-one conversation, or `None`
    /// for group and broadcast conversations.
    async fn direct_counterpart(&self, conversation_id: &str) -> Result<Option<String>>;
}

// ========== Message Paths ==========

/// Hands outgoing message content to the host's delivery path.
#[async_trait]
pub trait MessageTransmitter: Send + Sync {
    async fn transmit(&self, conversation_id: &str, content: &str) -> Result<()>;
}

/// Replaces the content of an already-delivered message in the host's view.
#[async_trait]
pub trait MessageRepublisher: Send + Sync {
    async fn republish(&self, update: MessageUpdate) -> Result<()>;
}

// ========== Persistence ==========

/// Byte-blob persistence offered by the host.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set_blob(&self, key: &str, value: Vec<u8>) -> Result<()>;
}

/// Combined bound for hosts that implement every seam on one object.
pub trait HostAdapter:
    ConversationDirectory + MessageTransmitter + MessageRepublisher + BlobStore
{
}

impl<T: ConversationDirectory + MessageTransmitter + MessageRepublisher + BlobStore> HostAdapter
    for T
{
}
