//! Error types for requests for attestation

use tessera_core::{Address, Digest, TesseraError};
use tessera_crypto::DilithiumError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error(transparent)]
    Decode(#[from] TesseraError),

    // ── Structural ──────────────────────────────────────────────
    #[error("No nonce entry for {0}")]
    MissingNonce(String),

    #[error("Nonce entry for {0} has no disclosed value")]
    OrphanNonce(String),

    #[error("Hash of {0} is not among the claim hashes")]
    UncommittedHash(String),

    #[error("Redacted digest {0} is not among the claim hashes")]
    UnknownRedaction(Digest),

    #[error("Digest {0} is covered more than once")]
    DuplicateCoverage(Digest),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    // ── Building ────────────────────────────────────────────────
    #[error("Claim has no owner")]
    MissingOwner,

    #[error("Claim owner {owner} does not match signer {signer}")]
    OwnerMismatch { owner: Address, signer: Address },

    #[error("Signing failed: {0}")]
    Signing(#[from] DilithiumError),

    // ── Verification ────────────────────────────────────────────
    #[error("Recomputed hash of {0} does not match its nonce entry")]
    HashMismatch(String),

    #[error("Claim hash {0} is neither disclosed nor redacted")]
    UncoveredHash(Digest),

    #[error("Root hash mismatch: stored {stored}, recomputed {computed}")]
    RootHashMismatch { stored: Digest, computed: Digest },

    #[error("Claimer signature does not cover the root hash")]
    InvalidSignature,

    #[error("Claimer signature was produced by {signer}, not the owner {owner}")]
    SignerMismatch { owner: Address, signer: Address },

    #[error("Legitimation {index} is invalid: {reason}")]
    InvalidLegitimation { index: usize, reason: String },

    #[error("Attestation does not match request: {0}")]
    AttestationMismatch(String),
}

impl RequestError {
    /// Malformed input, as opposed to a failed cryptographic check.
    ///
    /// Structural errors surface as `Err` from `verify_data`; the rest
    /// resolve to `Ok(false)`.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            RequestError::Decode(_)
                | RequestError::MissingNonce(_)
                | RequestError::OrphanNonce(_)
                | RequestError::UncommittedHash(_)
                | RequestError::UnknownRedaction(_)
                | RequestError::DuplicateCoverage(_)
                | RequestError::UnknownProperty(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RequestError>;
