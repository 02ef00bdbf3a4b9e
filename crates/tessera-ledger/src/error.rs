//! Error types for the ledger oracle and the engines built on it

use tessera_core::{Address, Digest, Permission};
use tessera_request::RequestError;
use thiserror::Error;

/// Failure reported by a ledger oracle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Entry not found: {0}")]
    NotFound(Digest),

    #[error("Entry already exists: {0}")]
    AlreadyExists(Digest),

    #[error("Ledger unavailable")]
    Unavailable,

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttestationError {
    #[error("Attestation not found: {0}")]
    NotFound(Digest),

    #[error("Claim hash already attested: {0}")]
    AlreadyAttested(Digest),

    #[error("Attestation is owned by {actual}, expected {expected}")]
    OwnerMismatch { expected: Address, actual: Address },

    #[error("Attestation has been revoked: {0}")]
    Revoked(Digest),

    #[error("{0} is not authorized for this attestation")]
    NotAuthorized(Address),

    #[error("Delegation does not permit this attestation: {0}")]
    DelegationDenied(#[from] DelegationError),

    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelegationError {
    #[error("Delegation node not found: {0}")]
    NodeNotFound(Digest),

    #[error("Delegation root not found: {0}")]
    RootNotFound(Digest),

    #[error("Delegation {0} has been revoked")]
    Revoked(Digest),

    #[error("Delegation {node} lacks the {} permission", .permission.as_str())]
    MissingPermission { node: Digest, permission: Permission },

    #[error("Delegation {node} belongs to {actual}, expected {expected}")]
    AccountMismatch {
        node: Digest,
        expected: Address,
        actual: Address,
    },

    #[error("Delegation chain revisits node {0}")]
    Cycle(Digest),

    #[error("Delegation chain exceeds {0} levels")]
    DepthExceeded(usize),

    #[error("Delegation node {node} belongs to root {actual}, expected {expected}")]
    InconsistentRoot {
        node: Digest,
        expected: Digest,
        actual: Digest,
    },

    #[error("Delegation root cType {actual} does not match {expected}")]
    CTypeMismatch { expected: Digest, actual: Digest },

    #[error("Delegate signature is invalid")]
    InvalidDelegateSignature,

    #[error("{0} may not revoke this delegation")]
    NotAuthorized(Address),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

pub type Result<T> = std::result::Result<T, AttestationError>;
