//! Background tasks module.
//!
//! This module contains the overlay's long-running tasks:
//! - Inbound processing loop (decrypting newly received messages)

pub mod inbound_loop;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::state::OverlayState;
use crate::types::IncomingMessage;

/// Manager for background tasks.
///
/// Holds handles to running tasks and provides methods for starting and
/// stopping them.
pub struct BackgroundTasks {
    /// Handle to the inbound processing loop task
    pub inbound_loop: Option<JoinHandle<()>>,
}

impl BackgroundTasks {
    /// Create a new manager with nothing running.
    pub fn new() -> Self {
        Self { inbound_loop: None }
    }

    /// Start the inbound processing loop.
    ///
    /// An already-running loop is stopped first, so the host can rewire
    /// its message channel on reconnection.
    pub fn start_inbound_loop(
        &mut self,
        rx: mpsc::UnboundedReceiver<IncomingMessage>,
        state: OverlayState,
    ) {
        if let Some(handle) = self.inbound_loop.take() {
            handle.abort();
        }

        self.inbound_loop = Some(inbound_loop::start_inbound_loop(rx, state));
        tracing::info!("Inbound processing loop started");
    }

    /// Stop all background tasks.
    pub fn stop(&mut self) {
        if let Some(handle) = self.inbound_loop.take() {
            handle.abort();
            tracing::debug!("Inbound loop stopped");
        }
    }

    /// Check if the inbound loop is running.
    pub fn is_running(&self) -> bool {
        self.inbound_loop
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BackgroundTasks {
    fn drop(&mut self) {
        self.stop();
    }
}
