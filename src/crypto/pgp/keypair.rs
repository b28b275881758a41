//! Key-pair generation, parsing, and validation.
//!
//! Generated certificates follow the conventional three-key layout: a
//! certify-only primary key with a signing subkey and an encryption
//! subkey. Private keys are generated without a passphrase; protection
//! at rest is the key store's concern.

use pgp::composed::{
    Deserializable, KeyType, SecretKeyParamsBuilder, SignedPublicKey, SignedSecretKey,
    SubkeyParamsBuilder,
};
use pgp::crypto::ecc_curve::ECCCurve;
use pgp::types::Password;
use rand::thread_rng;
use serde::{Deserialize, Serialize};

use crate::errors::CryptoError;
use crate::types::ArmoredKeyPair;

/// Supported key-generation algorithms.
///
/// Serialized names match the labels the host UI presents, so the enum
/// deserializes straight out of command arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    #[serde(rename = "RSA-2048")]
    Rsa2048,
    #[default]
    #[serde(rename = "RSA-4096")]
    Rsa4096,
    #[serde(rename = "Curve25519")]
    Curve25519,
    #[serde(rename = "NIST P-256")]
    NistP256,
    #[serde(rename = "NIST P-384")]
    NistP384,
    #[serde(rename = "NIST P-521")]
    NistP521,
    #[serde(rename = "secp256k1")]
    Secp256k1,
    #[serde(rename = "Brainpool-256")]
    Brainpool256,
    #[serde(rename = "Brainpool-384")]
    Brainpool384,
    #[serde(rename = "Brainpool-512")]
    Brainpool512,
}

impl KeyAlgorithm {
    pub fn label(self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa2048 => "RSA-2048",
            KeyAlgorithm::Rsa4096 => "RSA-4096",
            KeyAlgorithm::Curve25519 => "Curve25519",
            KeyAlgorithm::NistP256 => "NIST P-256",
            KeyAlgorithm::NistP384 => "NIST P-384",
            KeyAlgorithm::NistP521 => "NIST P-521",
            KeyAlgorithm::Secp256k1 => "secp256k1",
            KeyAlgorithm::Brainpool256 => "Brainpool-256",
            KeyAlgorithm::Brainpool384 => "Brainpool-384",
            KeyAlgorithm::Brainpool512 => "Brainpool-512",
        }
    }

    fn curve(self) -> Option<ECCCurve> {
        match self {
            KeyAlgorithm::NistP256 => Some(ECCCurve::P256),
            KeyAlgorithm::NistP384 => Some(ECCCurve::P384),
            KeyAlgorithm::NistP521 => Some(ECCCurve::P521),
            KeyAlgorithm::Secp256k1 => Some(ECCCurve::Secp256k1),
            KeyAlgorithm::Brainpool256 => Some(ECCCurve::BrainpoolP256r1),
            KeyAlgorithm::Brainpool384 => Some(ECCCurve::BrainpoolP384r1),
            KeyAlgorithm::Brainpool512 => Some(ECCCurve::BrainpoolP512r1),
            _ => None,
        }
    }

    /// Key type of the certify-only primary key.
    fn primary_key_type(self) -> KeyType {
        match self {
            KeyAlgorithm::Rsa2048 => KeyType::Rsa(2048),
            KeyAlgorithm::Rsa4096 => KeyType::Rsa(4096),
            KeyAlgorithm::Curve25519 => KeyType::Ed25519Legacy,
            other => KeyType::ECDSA(other.curve().unwrap_or(ECCCurve::P256)),
        }
    }

    /// Key type of the signing subkey.
    fn signing_key_type(self) -> KeyType {
        self.primary_key_type()
    }

    /// Key type of the encryption subkey.
    fn encryption_key_type(self) -> KeyType {
        match self {
            KeyAlgorithm::Rsa2048 => KeyType::Rsa(2048),
            KeyAlgorithm::Rsa4096 => KeyType::Rsa(4096),
            KeyAlgorithm::Curve25519 => KeyType::ECDH(ECCCurve::Curve25519),
            other => KeyType::ECDH(other.curve().unwrap_or(ECCCurve::P256)),
        }
    }
}

/// Generate an armored key pair for `identity`.
///
/// Generation is CPU-bound, RSA variants take seconds, so the work runs
/// on the blocking pool.
pub async fn generate_armored(
    algorithm: KeyAlgorithm,
    identity: String,
) -> Result<ArmoredKeyPair, CryptoError> {
    tokio::task::spawn_blocking(move || generate_armored_blocking(algorithm, &identity))
        .await
        .map_err(|e| CryptoError::Operation(format!("key generation task failed: {}", e)))?
}

fn generate_armored_blocking(
    algorithm: KeyAlgorithm,
    identity: &str,
) -> Result<ArmoredKeyPair, CryptoError> {
    log::info!(
        "Generating {} keypair for identity: {}",
        algorithm.label(),
        identity
    );

    let mut signkey = SubkeyParamsBuilder::default();
    signkey
        .key_type(algorithm.signing_key_type())
        .can_sign(true)
        .can_encrypt(false)
        .can_authenticate(false);

    let mut encryptkey = SubkeyParamsBuilder::default();
    encryptkey
        .key_type(algorithm.encryption_key_type())
        .can_sign(false)
        .can_encrypt(true)
        .can_authenticate(false);

    let mut key_params = SecretKeyParamsBuilder::default();
    key_params
        .key_type(algorithm.primary_key_type())
        .can_certify(true)
        .can_sign(false)
        .can_encrypt(false)
        .primary_user_id(identity.into())
        .subkeys(vec![
            signkey
                .build()
                .map_err(|e| {
                    CryptoError::Operation(format!("failed to build signing subkey: {}", e))
                })?,
            encryptkey
                .build()
                .map_err(|e| {
                    CryptoError::Operation(format!("failed to build encryption subkey: {}", e))
                })?,
        ]);

    let secret_key_params = key_params
        .build()
        .map_err(|e| CryptoError::Operation(format!("failed to build key params: {}", e)))?;
    let secret_key = secret_key_params
        .generate(thread_rng())
        .map_err(|e| CryptoError::Operation(format!("key generation failed: {}", e)))?;

    let signed_secret_key = secret_key
        .sign(&mut thread_rng(), &Password::empty())
        .map_err(|e| CryptoError::Operation(format!("key self-signing failed: {}", e)))?;

    let signed_public_key = SignedPublicKey::from(signed_secret_key.clone());

    let private_key = signed_secret_key
        .to_armored_string(Default::default())
        .map_err(|e| CryptoError::Operation(format!("failed to armor private key: {}", e)))?;

    let public_key = signed_public_key
        .to_armored_string(Default::default())
        .map_err(|e| CryptoError::Operation(format!("failed to armor public key: {}", e)))?;

    log::info!(
        "Successfully generated {} keypair for identity: {}",
        algorithm.label(),
        identity
    );

    Ok(ArmoredKeyPair {
        public_key,
        private_key,
    })
}

/// Parse an armored public key.
pub fn parse_public_key(armored: &str) -> Result<SignedPublicKey, CryptoError> {
    let (public_key, _headers) = SignedPublicKey::from_string(armored)
        .map_err(|e| CryptoError::KeyFormat(format!("invalid public key: {}", e)))?;
    Ok(public_key)
}

/// Parse an armored private key.
pub fn parse_private_key(armored: &str) -> Result<SignedSecretKey, CryptoError> {
    let (secret_key, _headers) = SignedSecretKey::from_string(armored)
        .map_err(|e| CryptoError::KeyFormat(format!("invalid private key: {}", e)))?;
    Ok(secret_key)
}

/// Check that `armored` parses as a public key, without using it.
pub fn validate_public_key(armored: &str) -> Result<(), CryptoError> {
    parse_public_key(armored).map(|_| ())
}

/// Check that `armored` parses as a private key, without using it.
pub fn validate_private_key(armored: &str) -> Result<(), CryptoError> {
    parse_private_key(armored).map(|_| ())
}
