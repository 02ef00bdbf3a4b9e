//! Error types for Tessera

use thiserror::Error;

/// Shared error type for decoding and structural checks on core values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TesseraError {
    #[error("Invalid digest: {0}")]
    InvalidDigest(String),

    #[error("Invalid salt: {0}")]
    InvalidSalt(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Wrong arity for compressed {what}: expected {expected}, got {actual}")]
    Arity {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Malformed structure: {0}")]
    Structural(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TesseraError {
    fn from(err: serde_json::Error) -> Self {
        TesseraError::Serialization(err.to_string())
    }
}
