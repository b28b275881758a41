//! Test utilities.
//!
//! Shared fixtures for unit tests: the in-memory host double and data
//! builders. Only compiled for tests.

pub mod mock_host;

pub use builders::*;
pub use mock_host::*;
