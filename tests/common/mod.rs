//! Common test setup and utilities for integration tests
//!
//! This module provides shared setup code for all integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio::sync::mpsc;

use pgp_overlay::core::db::{run_migrations, SqliteBlobStore};
use pgp_overlay::core::host::{
    BlobStore, ConversationDirectory, MessageRepublisher, MessageTransmitter,
};
use pgp_overlay::events::OverlayEvent;
use pgp_overlay::state::{OverlayBuilder, OverlayState};
use pgp_overlay::types::{IncomingMessage, MessageUpdate};

/// Initialize test logging (call once per test module)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("pgp_overlay=debug,test=debug")
        .with_test_writer()
        .try_init();
}

/// Create a blob store backed by an in-memory database with full schema
pub async fn setup_blob_store() -> Result<SqliteBlobStore> {
    // One connection only, every sqlite::memory: connection is its own
    // database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    run_migrations(&pool).await?;
    Ok(SqliteBlobStore::new(pool))
}

/// Create a blob store over a temporary database file for tests that
/// need persistence across store instances
pub async fn setup_persistent_blob_store() -> Result<(SqliteBlobStore, tempfile::TempDir)> {
    let temp_dir = tempfile::tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path.display())).await?;
    run_migrations(&pool).await?;
    Ok((SqliteBlobStore::new(pool), temp_dir))
}

/// In-memory host double implementing every overlay seam.
///
/// Clones share state, so a test can keep one handle for inspection
/// while the overlay drives another.
#[derive(Clone, Default)]
pub struct TestHost {
    counterparts: Arc<Mutex<HashMap<String, String>>>,
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    sent: Arc<Mutex<Vec<(String, String)>>>,
    republished: Arc<Mutex<Vec<MessageUpdate>>>,
    blob_reads: Arc<AtomicUsize>,
    fail_blob_reads: Arc<AtomicBool>,
    fail_blob_writes: Arc<AtomicBool>,
}

impl TestHost {
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
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ConversationDirectory for TestHost {
    async fn direct_counterpart(&self, conversation_id: &str) -> Result<Option<String>> {
        Ok(lock(&self.counterparts).get(conversation_id).cloned())
    }
}

#[async_trait]
impl MessageTransmitter for TestHost {
    async fn transmit(&self, conversation_id: &str, content: &str) -> Result<()> {
        lock(&self.sent).push((conversation_id.to_string(), content.to_string()));
        Ok(())
    }
}

#[async_trait]
impl MessageRepublisher for TestHost {
    async fn republish(&self, update: MessageUpdate) -> Result<()> {
        lock(&self.republished).push(update);
        Ok(())
    }
}

#[async_trait]
impl BlobStore for TestHost {
    async fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.blob_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_blob_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("test blob read failure"));
        }
        Ok(lock(&self.blobs).get(key).cloned())
    }

    async fn set_blob(&self, key: &str, value: Vec<u8>) -> Result<()> {
        if self.fail_blob_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("test blob write failure"));
        }
        lock(&self.blobs).insert(key.to_string(), value);
        Ok(())
    }
}

/// Test context pairing a host double with an overlay built on it
pub struct TestContext {
    pub host: TestHost,
    pub state: OverlayState,
    pub events: mpsc::UnboundedReceiver<OverlayEvent>,
}

impl TestContext {
    /// Create a new test context over a fresh host
    pub fn new() -> Result<Self> {
        Self::with_host(TestHost::new())
    }

    /// Create a test context whose host knows one direct conversation
    pub fn with_conversation(conversation_id: &str, counterpart: &str) -> Result<Self> {
        Self::with_host(TestHost::new().with_counterpart(conversation_id, counterpart))
    }

    /// Create a test context over a prepared host
    pub fn with_host(host: TestHost) -> Result<Self> {
        init_test_logging();
        let (state, events) = OverlayBuilder::new().host(Arc::new(host.clone())).build()?;
        Ok(Self {
            host,
            state,
            events,
        })
    }
}

/// Wait until the host has seen at least `count` republishes
pub async fn wait_for_republishes(host: &TestHost, count: usize) {
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        loop {
            if host.republished().len() >= count {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("republishes should arrive in time");
}

/// Build an incoming message the way the host pipeline delivers them
pub fn incoming(
    id: &str,
    conversation_id: &str,
    sender: Option<&str>,
    content: &str,
) -> IncomingMessage {
    IncomingMessage {
        id: id.to_string(),
        conversation_id: conversation_id.to_string(),
        sender: sender.map(str::to_string),
        content: content.to_string(),
    }
}

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(e) => panic!("Expected Ok but got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(val) => panic!("Expected Err but got Ok: {:?}", val),
            Err(_) => {}
        }
    };
}
