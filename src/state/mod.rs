//! Shared overlay state.
//!
//! One [`OverlayState`] is built at startup from the host's seam
//! implementations and then cloned into every command handler and
//! pipeline stage. All fields are cheap to clone; the heavy pieces sit
//! behind [`Arc`]s.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, RwLock};

use crate::core::host::{
    BlobStore, ConversationDirectory, HostAdapter, MessageRepublisher, MessageTransmitter,
};
use crate::core::keystore::KeyStore;
use crate::events::{EventEmitter, OverlayEvent};
use crate::tasks::BackgroundTasks;
use crate::types::{IncomingMessage, PolicySettings};

/// Shared state for the whole overlay.
#[derive(Clone)]
pub struct OverlayState {
    /// Key records for every correspondent
    pub keys: Arc<KeyStore>,
    /// Conversation metadata lookups
    pub directory: Arc<dyn ConversationDirectory>,
    /// Outgoing delivery path
    pub transmitter: Arc<dyn MessageTransmitter>,
    /// Republish path for decrypted content
    pub republisher: Arc<dyn MessageRepublisher>,
    /// Event channel toward the host
    pub events: EventEmitter,
    /// Pipeline policy settings
    settings: Arc<RwLock<PolicySettings>>,
    /// Where policy settings are persisted, if anywhere
    settings_path: Option<PathBuf>,
    /// Background task handles
    background_tasks: Arc<RwLock<BackgroundTasks>>,
}

impl OverlayState {
    /// Current policy settings.
    pub async fn policy_settings(&self) -> PolicySettings {
        self.settings.read().await.clone()
    }

    /// Replace the policy settings and persist them.
    pub async fn update_policy_settings(&self, settings: PolicySettings) -> Result<()> {
        {
            let mut current = self.settings.write().await;
            *current = settings.clone();
        }
        self.persist_settings(&settings).await
    }

    /// Flip the automatic-encryption flag, persist, and return the new
    /// value.
    pub async fn toggle_auto_encrypt(&self) -> Result<bool> {
        let updated = {
            let mut settings = self.settings.write().await;
            settings.auto_encrypt = !settings.auto_encrypt;
            settings.clone()
        };
        self.persist_settings(&updated).await?;
        Ok(updated.auto_encrypt)
    }

    async fn persist_settings(&self, settings: &PolicySettings) -> Result<()> {
        if let Some(path) = &self.settings_path {
            let contents = serde_json::to_string_pretty(settings)?;
            std::fs::write(path, contents)?;
            tracing::debug!("Persisted policy settings to {}", path.display());
        }
        Ok(())
    }

    // ========== Background Task Management ==========

    /// Start the inbound processing loop.
    ///
    /// Returns the sender the host pushes incoming messages into.
    pub async fn start_background_tasks(&self) -> mpsc::UnboundedSender<IncomingMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut tasks = self.background_tasks.write().await;
        tasks.start_inbound_loop(rx, self.clone());
        tx
    }

    /// Stop all background tasks.
    pub async fn stop_background_tasks(&self) {
        let mut tasks = self.background_tasks.write().await;
        tasks.stop();
    }

    /// Whether the inbound loop is currently running.
    pub async fn background_tasks_running(&self) -> bool {
        self.background_tasks.read().await.is_running()
    }
}

/// Builder wiring the host's seams into an [`OverlayState`].
#[derive(Default)]
pub struct OverlayBuilder {
    directory: Option<Arc<dyn ConversationDirectory>>,
    transmitter: Option<Arc<dyn MessageTransmitter>>,
    republisher: Option<Arc<dyn MessageRepublisher>>,
    blobs: Option<Arc<dyn BlobStore>>,
    settings_path: Option<PathBuf>,
}

impl OverlayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directory(mut self, directory: Arc<dyn ConversationDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn transmitter(mut self, transmitter: Arc<dyn MessageTransmitter>) -> Self {
        self.transmitter = Some(transmitter);
        self
    }

    pub fn republisher(mut self, republisher: Arc<dyn MessageRepublisher>) -> Self {
        self.republisher = Some(republisher);
        self
    }

    pub fn blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    /// Wire every seam to one host object.
    pub fn host<H: HostAdapter + 'static>(mut self, host: Arc<H>) -> Self {
        self.directory = Some(host.clone());
        self.transmitter = Some(host.clone());
        self.republisher = Some(host.clone());
        self.blobs = Some(host);
        self
    }

    /// File the policy settings are loaded from and persisted to. Without
    /// one, settings live in memory only.
    pub fn settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Build the state and the event receiver the host drains.
    ///
    /// Must be called from within a Tokio runtime; the key store writer
    /// is spawned here.
    pub fn build(self) -> Result<(OverlayState, mpsc::UnboundedReceiver<OverlayEvent>)> {
        let directory = self
            .directory
            .ok_or_else(|| anyhow!("conversation directory not provided"))?;
        let transmitter = self
            .transmitter
            .ok_or_else(|| anyhow!("message transmitter not provided"))?;
        let republisher = self
            .republisher
            .ok_or_else(|| anyhow!("message republisher not provided"))?;
        let blobs = self.blobs.ok_or_else(|| anyhow!("blob store not provided"))?;

        let settings = match &self.settings_path {
            Some(path) => load_settings_file(path),
            None => PolicySettings::default(),
        };

        let (events, events_rx) = EventEmitter::channel();
        let keys = Arc::new(KeyStore::new(blobs));

        let state = OverlayState {
            keys,
            directory,
            transmitter,
            republisher,
            events,
            settings: Arc::new(RwLock::new(settings)),
            settings_path: self.settings_path,
            background_tasks: Arc::new(RwLock::new(BackgroundTasks::new())),
        };

        Ok((state, events_rx))
    }
}

fn load_settings_file(path: &std::path::Path) -> PolicySettings {
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    "Malformed settings file {}, using defaults: {}",
                    path.display(),
                    e
                );
                PolicySettings::default()
            }
        },
        // Missing file is the first-run case.
        Err(_) => PolicySettings::default(),
    }
}
