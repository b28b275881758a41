//! OpenPGP engine built on rPGP.
//!
//! Split by concern:
//! - `keypair`: generation, parsing, and validation of armored keys
//! - `message`: encryption and decryption of message payloads

pub mod keypair;
pub mod message;

pub use keypair::{
    generate_armored, parse_private_key, parse_public_key, validate_private_key,
    validate_public_key, KeyAlgorithm,
};
pub use message::{decrypt, encrypt};
