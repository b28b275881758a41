//! Core overlay logic.
//!
//! - `classifier`: envelope detection
//! - `db`: bundled SQLite persistence substrate
//! - `host`: seams implemented by the host application
//! - `keystore`: correspondent-keyed key records
//! - `outbound` / `inbound`: the two automatic pipeline stages

pub mod classifier;
pub mod db;
pub mod host;
pub mod inbound;
pub mod keystore;
pub mod outbound;
