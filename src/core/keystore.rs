//! Correspondent-keyed cache of encryption key records.
//!
//! The store goes through three phases: untouched, loading, and ready.
//! `init` moves it to ready exactly once no matter how many callers race
//! it. Reads are synchronous against the in-memory cache; mutations
//! update the cache immediately and then flush the whole record map
//! through a single writer task, so overlapping writes can never
//! interleave partial blobs in the substrate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{mpsc, oneshot, Mutex};

use crate::core::host::BlobStore;
use crate::errors::StoreError;
use crate::types::KeyRecord;

/// Substrate key under which the whole record map is persisted.
pub const KEY_STORAGE_KEY: &str = "pgp-encryption-keys";

type RecordMap = HashMap<String, KeyRecord>;

struct PersistRequest {
    ack: oneshot::Sender<Result<(), StoreError>>,
}

/// Shared key store. Create once and hand out behind an [`Arc`].
pub struct KeyStore {
    blobs: Arc<dyn BlobStore>,
    cache: Arc<RwLock<RecordMap>>,
    ready: AtomicBool,
    init_gate: Mutex<()>,
    persist_tx: mpsc::UnboundedSender<PersistRequest>,
}

impl KeyStore {
    /// Create the store and spawn its writer task. Must be called from
    /// within a Tokio runtime.
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        let cache = Arc::new(RwLock::new(RecordMap::new()));
        let (persist_tx, persist_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_writer(persist_rx, cache.clone(), blobs.clone()));

        Self {
            blobs,
            cache,
            ready: AtomicBool::new(false),
            init_gate: Mutex::new(()),
            persist_tx,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Load the record map from the substrate.
    ///
    /// Concurrent callers share a single substrate read. A failed load
    /// still moves the store to ready with an empty cache, so the
    /// message pipeline keeps running; only the caller that performed
    /// the load sees the error.
    pub async fn init(&self) -> Result<(), StoreError> {
        if self.is_ready() {
            return Ok(());
        }

        let _gate = self.init_gate.lock().await;
        if self.is_ready() {
            return Ok(());
        }

        tracing::info!("Loading key records from persistent storage");
        let outcome = self.load_from_substrate().await;

        {
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            match &outcome {
                Ok(records) => {
                    *cache = records.clone();
                    tracing::info!("Loaded {} key record(s)", cache.len());
                }
                Err(e) => {
                    cache.clear();
                    tracing::error!("Failed to load key records, starting empty: {}", e);
                }
            }
        }
        self.ready.store(true, Ordering::Release);

        outcome.map(|_| ())
    }

    /// Synchronous cache lookup.
    ///
    /// Before `init` has completed this warns and reports the
    /// correspondent as keyless rather than blocking the caller.
    pub fn get(&self, correspondent_id: &str) -> Option<KeyRecord> {
        if !self.is_ready() {
            tracing::warn!(
                "Key store read before initialization, treating correspondent {} as keyless",
                correspondent_id
            );
            return None;
        }

        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(correspondent_id)
            .cloned()
    }

    /// Store or delete the record for a correspondent.
    ///
    /// A record with both sides empty deletes the entry. The returned
    /// future resolves once the change has been flushed to the
    /// substrate.
    pub async fn put(&self, correspondent_id: &str, record: KeyRecord) -> Result<(), StoreError> {
        self.init().await?;

        let id = correspondent_id.to_string();
        if record.is_empty() {
            tracing::debug!("Deleting key record for correspondent {}", id);
            self.mutate_and_flush(move |cache| {
                cache.remove(&id);
            })
            .await
        } else {
            tracing::debug!("Storing key record for correspondent {}", id);
            self.mutate_and_flush(move |cache| {
                cache.insert(id, record);
            })
            .await
        }
    }

    /// Delete the record for a correspondent.
    pub async fn delete(&self, correspondent_id: &str) -> Result<(), StoreError> {
        self.put(correspondent_id, KeyRecord::default()).await
    }

    /// Snapshot of every stored record.
    pub async fn get_all(&self) -> Result<RecordMap, StoreError> {
        self.init().await?;
        Ok(self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    /// Remove every record.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.init().await?;
        tracing::info!("Clearing all key records");
        self.mutate_and_flush(|cache| cache.clear()).await
    }

    async fn load_from_substrate(&self) -> Result<RecordMap, StoreError> {
        let blob = self
            .blobs
            .get_blob(KEY_STORAGE_KEY)
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        match blob {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(RecordMap::new()),
        }
    }

    async fn mutate_and_flush(
        &self,
        mutate: impl FnOnce(&mut RecordMap),
    ) -> Result<(), StoreError> {
        {
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            mutate(&mut cache);
        }

        let (ack_tx, ack_rx) = oneshot::channel();
        self.persist_tx
            .send(PersistRequest { ack: ack_tx })
            .map_err(|_| StoreError::Persistence("key store writer is gone".to_string()))?;
        ack_rx
            .await
            .map_err(|_| StoreError::Persistence("key store writer dropped the request".to_string()))?
    }
}

/// Writer task: serializes flushes so the substrate only ever sees whole
/// snapshots, and coalesces requests that queued up behind a slow write.
async fn run_writer(
    mut rx: mpsc::UnboundedReceiver<PersistRequest>,
    cache: Arc<RwLock<RecordMap>>,
    blobs: Arc<dyn BlobStore>,
) {
    tracing::info!("Key store writer started");

    while let Some(request) = rx.recv().await {
        let mut waiters = vec![request.ack];
        while let Ok(queued) = rx.try_recv() {
            waiters.push(queued.ack);
        }

        let snapshot = cache.read().unwrap_or_else(PoisonError::into_inner).clone();
        let outcome = persist_snapshot(&snapshot, blobs.as_ref()).await;

        if let Err(e) = &outcome {
            tracing::error!("Failed to persist key records: {}", e);
        } else if waiters.len() > 1 {
            tracing::debug!("Coalesced {} key store flushes into one write", waiters.len());
        }

        for ack in waiters {
            let _ = ack.send(outcome.clone());
        }
    }

    tracing::info!("Key store writer ended");
}

async fn persist_snapshot(snapshot: &RecordMap, blobs: &dyn BlobStore) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(snapshot)?;
    blobs
        .set_blob(KEY_STORAGE_KEY, bytes)
        .await
        .map_err(|e| StoreError::Persistence(e.to_string()))
}
