//! Per-correspondent OpenPGP encryption overlay for chat clients.
//!
//! The overlay sits between a chat client and its message pipeline.
//! Outgoing plaintext can be replaced with an armored envelope for the
//! conversation's counterpart, incoming envelopes are decrypted and
//! republished with a visual indicator, and the key material for every
//! correspondent is cached in memory and persisted through the host's
//! [`BlobStore`] seam.
//!
//! A host embeds the overlay by implementing the traits in
//! [`core::host`], building an [`OverlayState`] through
//! [`OverlayBuilder`], and feeding its message pipeline through the
//! interception points in [`core::outbound`] and [`core::inbound`] or
//! the background loop in [`tasks`].
//!
//! [`BlobStore`]: core::host::BlobStore

pub mod commands;
pub mod core;
pub mod crypto;
pub mod errors;
pub mod events;
pub mod state;
pub mod tasks;
pub mod types;

// Test utilities module (only available in tests)
#[cfg(test)]
pub mod test_utils;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub use state::{OverlayBuilder, OverlayState};

/// Initialize logging
pub fn init_logging() {
    let filter = EnvFilter::from_default_env().add_directive(
        "pgp_overlay=info"
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into()),
    );

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
