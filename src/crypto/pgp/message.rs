//! Encryption and decryption of message payloads.

use pgp::composed::{Message, MessageBuilder, SignedPublicKey, SignedPublicSubKey};
use pgp::crypto::sym::SymmetricKeyAlgorithm;
use pgp::types::Password;
use rand::thread_rng;

use super::keypair;
use crate::errors::CryptoError;

/// Encrypt `plaintext` to the given armored public key, producing an
/// armored envelope.
pub async fn encrypt(
    plaintext: String,
    recipient_public_key: String,
) -> Result<String, CryptoError> {
    tokio::task::spawn_blocking(move || encrypt_blocking(&plaintext, &recipient_public_key))
        .await
        .map_err(|e| CryptoError::Operation(format!("encryption task failed: {}", e)))?
}

/// Decrypt an armored envelope with the given armored private key,
/// returning the recovered plaintext.
pub async fn decrypt(ciphertext: String, own_private_key: String) -> Result<String, CryptoError> {
    tokio::task::spawn_blocking(move || decrypt_blocking(&ciphertext, &own_private_key))
        .await
        .map_err(|e| CryptoError::Operation(format!("decryption task failed: {}", e)))?
}

/// Inside encrypt and decrypt every failure counts as an operation
/// failure, key parsing included. `KeyFormat` is reserved for the
/// standalone validate calls.
fn op_error(err: CryptoError) -> CryptoError {
    match err {
        CryptoError::KeyFormat(msg) => CryptoError::Operation(msg),
        other => other,
    }
}

fn encrypt_blocking(plaintext: &str, recipient_public_key: &str) -> Result<String, CryptoError> {
    log::debug!("Encrypting {} chars of plaintext", plaintext.len());

    let public_key = keypair::parse_public_key(recipient_public_key).map_err(op_error)?;
    let mut rng = thread_rng();

    let mut builder = MessageBuilder::from_bytes("", plaintext.as_bytes().to_vec())
        .seipd_v1(&mut rng, SymmetricKeyAlgorithm::AES256);

    match encryption_subkey(&public_key) {
        Some(subkey) => builder
            .encrypt_to_key(&mut rng, subkey)
            .map_err(|e| CryptoError::Operation(format!("encryption failed: {}", e)))?,
        None => builder
            .encrypt_to_key(&mut rng, &public_key)
            .map_err(|e| CryptoError::Operation(format!("encryption failed: {}", e)))?,
    };

    builder
        .to_armored_string(&mut rng, Default::default())
        .map_err(|e| CryptoError::Operation(format!("failed to armor ciphertext: {}", e)))
}

fn decrypt_blocking(ciphertext: &str, own_private_key: &str) -> Result<String, CryptoError> {
    log::debug!("Decrypting {} chars of ciphertext", ciphertext.len());

    let secret_key = keypair::parse_private_key(own_private_key).map_err(op_error)?;

    let (message, _headers) = Message::from_armor(ciphertext.as_bytes())
        .map_err(|e| CryptoError::Operation(format!("not a valid encrypted message: {}", e)))?;

    let mut message = message
        .decrypt(&Password::empty(), &secret_key)
        .map_err(|e| CryptoError::Operation(format!("decryption failed: {}", e)))?;

    // Senders using other OpenPGP tools usually compress before encrypting.
    if message.is_compressed() {
        message = message
            .decompress()
            .map_err(|e| CryptoError::Operation(format!("failed to decompress message: {}", e)))?;
    }

    let data = message
        .as_data_vec()
        .map_err(|e| CryptoError::Operation(format!("failed to read message contents: {}", e)))?;

    String::from_utf8(data)
        .map_err(|e| CryptoError::Operation(format!("decrypted payload is not valid UTF-8: {}", e)))
}

/// Pick the subkey bound with an encryption key flag. Certificates
/// without one fall back to the primary key.
fn encryption_subkey(public_key: &SignedPublicKey) -> Option<&SignedPublicSubKey> {
    public_key.public_subkeys.iter().find(|subkey| {
        subkey.signatures.iter().any(|sig| {
            sig.config().map_or(false, |config| {
                config.hashed_subpackets.iter().any(|subpkt| {
                    matches!(
                        &subpkt.data,
                        pgp::packet::SubpacketData::KeyFlags(flags)
                            if flags.encrypt_comms() || flags.encrypt_storage()
                    )
                })
            })
        })
    })
}
