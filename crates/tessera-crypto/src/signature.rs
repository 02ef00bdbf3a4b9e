//! Dilithium signatures (NIST ML-DSA)
//!
//! Post-quantum secure digital signatures using the Dilithium algorithm,
//! a NIST PQC standardized signature scheme. Claimers sign request root
//! hashes and delegates sign delegation authorizations with these keys.

use pqcrypto_dilithium::dilithium3;
use pqcrypto_traits::sign::{PublicKey, SecretKey, SignedMessage};
use serde::{Deserialize, Serialize};
use tessera_core::Address;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::hash::address_from_public_key;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DilithiumError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid secret key")]
    InvalidSecretKey,

    #[error("Signature verification failed")]
    VerificationFailed,
}

/// Dilithium public key (Dilithium3 - NIST Level 3)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DilithiumPublicKey {
    #[serde(with = "hex_vec")]
    bytes: Vec<u8>,
}

impl DilithiumPublicKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DilithiumError> {
        dilithium3::PublicKey::from_bytes(bytes).map_err(|_| DilithiumError::InvalidPublicKey)?;
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Address of the account controlled by this key
    pub fn address(&self) -> Address {
        address_from_public_key(&self.bytes)
    }

    /// Verify a signature over `message`
    pub fn verify(&self, message: &[u8], signature: &DilithiumSignature) -> Result<(), DilithiumError> {
        let pk = dilithium3::PublicKey::from_bytes(&self.bytes)
            .map_err(|_| DilithiumError::InvalidPublicKey)?;

        let signed_msg = dilithium3::SignedMessage::from_bytes(&signature.bytes)
            .map_err(|_| DilithiumError::InvalidSignature)?;

        let opened =
            dilithium3::open(&signed_msg, &pk).map_err(|_| DilithiumError::VerificationFailed)?;

        // The signed message embeds the payload; it must be the one we expect
        if opened != message {
            return Err(DilithiumError::VerificationFailed);
        }

        Ok(())
    }

    /// Non-failing form of [`verify`](Self::verify)
    pub fn is_valid(&self, message: &[u8], signature: &DilithiumSignature) -> bool {
        self.verify(message, signature).is_ok()
    }
}

impl std::fmt::Debug for DilithiumPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DilithiumPublicKey({} bytes)", self.bytes.len())
    }
}

/// Dilithium secret key (zeroed on drop for security)
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DilithiumSecretKey {
    bytes: Vec<u8>,
}

impl DilithiumSecretKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DilithiumError> {
        dilithium3::SecretKey::from_bytes(bytes).map_err(|_| DilithiumError::InvalidSecretKey)?;
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Get raw bytes (use carefully!)
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Sign a message
    pub fn sign(&self, message: &[u8]) -> Result<DilithiumSignature, DilithiumError> {
        let sk = dilithium3::SecretKey::from_bytes(&self.bytes)
            .map_err(|_| DilithiumError::InvalidSecretKey)?;
        let signed_msg = dilithium3::sign(message, &sk);
        Ok(DilithiumSignature {
            bytes: signed_msg.as_bytes().to_vec(),
        })
    }
}

impl std::fmt::Debug for DilithiumSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DilithiumSecretKey([REDACTED])")
    }
}

/// Dilithium signature (signed-message form, payload included)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DilithiumSignature {
    #[serde(with = "hex_vec")]
    bytes: Vec<u8>,
}

impl DilithiumSignature {
    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for DilithiumSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DilithiumSignature({} bytes)", self.bytes.len())
    }
}

/// Dilithium keypair
pub struct DilithiumKeypair {
    pub public_key: DilithiumPublicKey,
    pub secret_key: DilithiumSecretKey,
}

impl DilithiumKeypair {
    /// Generate a new keypair
    pub fn generate() -> Self {
        let (pk, sk) = dilithium3::keypair();
        Self {
            public_key: DilithiumPublicKey {
                bytes: pk.as_bytes().to_vec(),
            },
            secret_key: DilithiumSecretKey {
                bytes: sk.as_bytes().to_vec(),
            },
        }
    }

    /// Sign a message
    pub fn sign(&self, message: &[u8]) -> Result<DilithiumSignature, DilithiumError> {
        self.secret_key.sign(message)
    }

    /// Verify a signature
    pub fn verify(&self, message: &[u8], signature: &DilithiumSignature) -> Result<(), DilithiumError> {
        self.public_key.verify(message, signature)
    }
}

impl std::fmt::Debug for DilithiumKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DilithiumKeypair")
            .field("public_key", &self.public_key)
            .field("secret_key", &self.secret_key)
            .finish()
    }
}

/// Hex serialization for variable-length byte strings
mod hex_vec {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_multi;

    fn root_hash(label: &[u8]) -> tessera_core::Digest {
        hash_multi(&[&b"tessera:root:v1"[..], label])
    }

    #[test]
    fn test_keypair_address_is_public_key_hash() {
        let keypair = DilithiumKeypair::generate();
        let address = keypair.public_key.address();

        assert_eq!(address, address_from_public_key(keypair.public_key.as_bytes()));
        assert!(address.as_str().starts_with("0x"));
        assert_ne!(address, DilithiumKeypair::generate().public_key.address());
    }

    #[test]
    fn test_root_hash_signature() {
        let claimer = DilithiumKeypair::generate();
        let root = root_hash(b"claim");

        let signature = claimer.sign(root.as_bytes()).unwrap();
        assert!(signature.as_bytes().len() > root.as_bytes().len());
        assert_eq!(claimer.verify(root.as_bytes(), &signature), Ok(()));
    }

    #[test]
    fn test_signature_bound_to_its_root_hash() {
        let claimer = DilithiumKeypair::generate();
        let signed = root_hash(b"claim");
        let other = root_hash(b"other claim");

        let signature = claimer.sign(signed.as_bytes()).unwrap();
        assert_eq!(
            claimer.verify(other.as_bytes(), &signature),
            Err(DilithiumError::VerificationFailed)
        );
    }

    #[test]
    fn test_verify_wrong_key() {
        let signer = DilithiumKeypair::generate();
        let other = DilithiumKeypair::generate();
        let signature = signer.sign(b"msg").unwrap();

        assert!(!other.public_key.is_valid(b"msg", &signature));
    }

    #[test]
    fn test_truncated_and_garbage_signatures_rejected() {
        let keypair = DilithiumKeypair::generate();
        let signature = keypair.sign(b"msg").unwrap();

        let truncated = DilithiumSignature::from_bytes(&signature.as_bytes()[..64]);
        assert!(!keypair.public_key.is_valid(b"msg", &truncated));

        let empty = DilithiumSignature::from_bytes(&[]);
        assert!(!keypair.public_key.is_valid(b"msg", &empty));

        let mut forged = signature.as_bytes().to_vec();
        forged[10] ^= 0xff;
        assert!(!keypair
            .public_key
            .is_valid(b"msg", &DilithiumSignature::from_bytes(&forged)));
    }

    #[test]
    fn test_invalid_key_bytes() {
        assert!(DilithiumPublicKey::from_bytes(&[1, 2, 3]).is_err());
        assert!(DilithiumSecretKey::from_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_public_key_serde_roundtrip() {
        let keypair = DilithiumKeypair::generate();
        let json = serde_json::to_string(&keypair.public_key).unwrap();
        let decoded: DilithiumPublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, keypair.public_key);
        assert_eq!(decoded.address(), keypair.public_key.address());
    }
}
