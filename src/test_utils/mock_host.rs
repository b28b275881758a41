//! Mock host implementation for testing.
//!
//! Provides a `MockHost` implementing every host seam in memory:
//! counterpart lookups, recorded transmissions and republishes, and a
//! blob store with read counters and fault injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::core::host::{
    BlobStore, ConversationDirectory, MessageRepublisher, MessageTransmitter,
};
use crate::types::MessageUpdate;

/// In-memory host double. Clones share state.
#[derive(Clone, Default)]
pub struct MockHost {
    /// Conversation id to single counterpart
    counterparts: Arc<Mutex<HashMap<String, String>>>,
    /// Blobs stored through the persistence seam
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    /// Everything handed to `transmit`, as (conversation id, content)
    sent: Arc<Mutex<Vec<(String, String)>>>,
    /// Everything handed to `republish`
    republished: Arc<Mutex<Vec<MessageUpdate>>>,
    /// Number of blob reads performed
    blob_reads: Arc<AtomicUsize>,
    fail_blob_reads: Arc<AtomicBool>,
    fail_blob_writes: Arc<AtomicBool>,
    fail_transmit: Arc<AtomicBool>,
    fail_republish: Arc<AtomicBool>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a one-to-one conversation.
    pub fn with_counterpart(self, conversation_id: &str, counterpart: &str) -> Self {
        lock(&self.counterparts).insert(conversation_id.to_string(), counterpart.to_string());
        self
    }

    /// Pre-populate a blob, as if a previous session had written it.
    pub fn seed_blob(&self, key: &str, value: Vec<u8>) {
        lock(&self.blobs).insert(key.to_string(), value);
    }

    /// The blob currently stored under `key`.
    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        lock(&self.blobs).get(key).cloned()
    }

    /// Number of blob reads performed so far.
    pub fn blob_read_count(&self) -> usize {
        self.blob_reads.load(Ordering::SeqCst)
    }

    /// Everything handed to `transmit`.
    pub fn transmitted(&self) -> Vec<(String, String)> {
        lock(&self.sent).clone()
    }

    /// Everything handed to `republish`.
    pub fn republished(&self) -> Vec<MessageUpdate> {
        lock(&self.republished).clone()
    }

    pub fn fail_blob_reads(&self, fail: bool) {
        self.fail_blob_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_blob_writes(&self, fail: bool) {
        self.fail_blob_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_transmit(&self, fail: bool) {
        self.fail_transmit.store(fail, Ordering::SeqCst);
    }

    pub fn fail_republish(&self, fail: bool) {
        self.fail_republish.store(fail, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ConversationDirectory for MockHost {
    async fn direct_counterpart(&self, conversation_id: &str) -> Result<Option<String>> {
        Ok(lock(&self.counterparts).get(conversation_id).cloned())
    }
}

#[async_trait]
impl MessageTransmitter for MockHost {
    async fn transmit(&self, conversation_id: &str, content: &str) -> Result<()> {
        if self.fail_transmit.load(Ordering::SeqCst) {
            return Err(anyhow!("mock transmit failure"));
        }
        lock(&self.sent).push((conversation_id.to_string(), content.to_string()));
        Ok(())
    }
}

#[async_trait]
impl MessageRepublisher for MockHost {
    async fn republish(&self, update: MessageUpdate) -> Result<()> {
        if self.fail_republish.load(Ordering::SeqCst) {
            return Err(anyhow!("mock republish failure"));
        }
        lock(&self.republished).push(update);
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MockHost {
    async fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.blob_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_blob_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("mock blob read failure"));
        }
        Ok(lock(&self.blobs).get(key).cloned())
    }

    async fn set_blob(&self, key: &str, value: Vec<u8>) -> Result<()> {
        if self.fail_blob_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("mock blob write failure"));
        }
        lock(&self.blobs).insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_transmissions_and_republishes() {
        let host = MockHost::new();

        host.transmit("conv-1", "hello").await.unwrap();
        host.republish(MessageUpdate {
            message_id: "m1".to_string(),
            conversation_id: "conv-1".to_string(),
            content: "decrypted".to_string(),
            pgp_original_content: None,
            pgp_decrypted: true,
        })
        .await
        .unwrap();

        assert_eq!(host.transmitted(), vec![("conv-1".to_string(), "hello".to_string())]);
        assert_eq!(host.republished().len(), 1);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let host = MockHost::new().with_counterpart("conv-1", "alice");
        let clone = host.clone();

        clone.transmit("conv-1", "hi").await.unwrap();
        assert_eq!(host.transmitted().len(), 1);
        assert_eq!(
            host.direct_counterpart("conv-1").await.unwrap().as_deref(),
            Some("alice")
        );
    }

    #[tokio::test]
    async fn blob_faults_and_counters_work() {
        let host = MockHost::new();

        host.set_blob("k", b"v".to_vec()).await.unwrap();
        assert_eq!(host.get_blob("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(host.blob_read_count(), 1);

        host.fail_blob_reads(true);
        assert!(host.get_blob("k").await.is_err());
        assert_eq!(host.blob_read_count(), 2);

        host.fail_blob_writes(true);
        assert!(host.set_blob("k", b"w".to_vec()).await.is_err());
    }
}
