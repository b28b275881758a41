//! Cryptographic operations.

pub mod pgp;
