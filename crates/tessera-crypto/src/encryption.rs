//! Authenticated symmetric encryption for message bodies
//!
//! AES-256-GCM with a random 96-bit nonce per message. This protects
//! confidential payloads exchanged between parties; it plays no part in
//! claim integrity.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce as AesNonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

const NONCE_SIZE: usize = 12;

/// 256-bit symmetric key, wiped on drop
pub type SymmetricKey = Zeroizing<[u8; 32]>;

#[derive(Error, Debug)]
pub enum EncryptionError {
    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Ciphertext together with the nonce it was sealed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

/// Generate a fresh random key
pub fn generate_key() -> SymmetricKey {
    let mut key = Zeroizing::new([0u8; 32]);
    rand::rngs::OsRng.fill_bytes(&mut key[..]);
    key
}

/// Encrypt `plaintext` under `key`
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<EncryptedMessage, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| EncryptionError::Encryption(format!("cipher init failed: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = AesNonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| EncryptionError::Encryption(e.to_string()))?;

    Ok(EncryptedMessage {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypt a message; fails on a wrong key or any tampering
pub fn decrypt(key: &SymmetricKey, message: &EncryptedMessage) -> Result<Vec<u8>, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| EncryptionError::Decryption(format!("cipher init failed: {}", e)))?;

    let nonce = AesNonce::from_slice(&message.nonce);

    cipher
        .decrypt(nonce, message.ciphertext.as_ref())
        .map_err(|e| EncryptionError::Decryption(e.to_string()))
}

/// Serialize a value to JSON and encrypt it
pub fn encrypt_value<T: Serialize>(
    key: &SymmetricKey,
    value: &T,
) -> Result<EncryptedMessage, EncryptionError> {
    let plaintext =
        serde_json::to_vec(value).map_err(|e| EncryptionError::Serialization(e.to_string()))?;
    encrypt(key, &plaintext)
}

/// Decrypt a message and deserialize the JSON payload
pub fn decrypt_value<T: for<'de> Deserialize<'de>>(
    key: &SymmetricKey,
    message: &EncryptedMessage,
) -> Result<T, EncryptionError> {
    let plaintext = decrypt(key, message)?;
    serde_json::from_slice(&plaintext).map_err(|e| EncryptionError::Serialization(e.to_string()))
}
