//! Tessera Crypto
//!
//! Cryptographic primitives for Tessera: SHA3-256 commitments, Dilithium
//! signatures (NIST ML-DSA), AES-256-GCM message encryption and salt sources.

pub mod encryption;
pub mod hash;
pub mod identity;
pub mod salt;
pub mod signature;

pub use encryption::{
    decrypt, decrypt_value, encrypt, encrypt_value, generate_key, EncryptedMessage, EncryptionError,
    SymmetricKey,
};
pub use hash::{address_from_public_key, hash, hash_multi, salted_hash, sha3_256};
pub use identity::{ExportedIdentity, Identity, SignatureEnvelope};
pub use salt::{OsSaltSource, SaltSource, SeededSaltSource};
pub use signature::{DilithiumError, DilithiumKeypair, DilithiumPublicKey, DilithiumSignature};
