//! SQLite persistence.
//!
//! The overlay itself only ever persists through the [`BlobStore`] seam;
//! this module is the bundled implementation of that seam:
//! - `schema`: table creation, run once at startup
//! - `kv`: whole-blob key-value storage and the [`SqliteBlobStore`] adapter
//!
//! [`BlobStore`]: crate::core::host::BlobStore
//! [`SqliteBlobStore`]: kv::SqliteBlobStore

pub mod kv;
pub mod schema;

pub use kv::{KvDb, SqliteBlobStore};
pub use schema::run_migrations;
