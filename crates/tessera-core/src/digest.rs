//! Digest, salt and address identifiers
//!
//! Every commitment in Tessera is a 32-byte SHA3-256 digest. Digests and
//! salts travel as `0x`-prefixed lowercase hex strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::error::TesseraError;

/// A 32-byte digest (claim hashes, root hashes, cType hashes, delegation ids)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse a hex digest, with or without the `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self, TesseraError> {
        decode_hex32(s)
            .map(Self)
            .map_err(|e| TesseraError::InvalidDigest(format!("{}: {}", s, e)))
    }

    /// Generate a fresh, unpredictable identifier (delegation ids)
    pub fn generate() -> Self {
        use sha3::{Digest as _, Sha3_256};
        let mut hasher = Sha3_256::new();
        hasher.update(b"tessera:id:");
        hasher.update(uuid::Uuid::new_v4().as_bytes());
        hasher.update(uuid::Uuid::new_v4().as_bytes());
        Self(hasher.finalize().into())
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::fmt::Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Random salt blinding one disclosed unit of a claim
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Salt(pub [u8; 32]);

impl Salt {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, TesseraError> {
        decode_hex32(s)
            .map(Self)
            .map_err(|e| TesseraError::InvalidSalt(format!("{}: {}", s, e)))
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Salt({})", self.to_hex())
    }
}

impl Serialize for Salt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Account address, derived from a signing public key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(TesseraError::InvalidAddress("empty address".into()));
        }
        Ok(Self(s.to_string()))
    }
}

fn decode_hex32(s: &str) -> Result<[u8; 32], String> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(raw).map_err(|e| e.to_string())?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("expected 32 bytes, got {}", b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_hex_roundtrip() {
        let digest = Digest::from_bytes([0xab; 32]);
        let hex = digest.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(Digest::from_hex(&hex).unwrap(), digest);
        assert_eq!(Digest::from_hex(&hex[2..]).unwrap(), digest);
    }

    #[test]
    fn test_digest_rejects_wrong_length() {
        assert!(Digest::from_hex("0xabcd").is_err());
        assert!(Digest::from_hex("not hex").is_err());
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(Digest::generate(), Digest::generate());
    }

    #[test]
    fn test_digest_serializes_as_string() {
        let digest = Digest::from_bytes([1u8; 32]);
        let json = serde_json::to_value(digest).unwrap();
        assert_eq!(json, serde_json::Value::String(digest.to_hex()));
    }

    #[test]
    fn test_empty_address_rejected() {
        assert!("".parse::<Address>().is_err());
        assert_eq!("0x01".parse::<Address>().unwrap().as_str(), "0x01");
    }
}
