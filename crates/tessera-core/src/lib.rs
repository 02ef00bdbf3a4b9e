//! Tessera Core
//!
//! Core domain types for Tessera attested claims.
//! This crate defines the value objects exchanged between claimers,
//! attesters and verifiers, and their compact positional encoding.

pub mod attestation;
pub mod claim;
pub mod compress;
pub mod delegation;
pub mod digest;
pub mod error;

pub use attestation::Attestation;
pub use claim::{canonical_json, Claim, PropertyName};
pub use delegation::{
    decode_permissions, DelegationNode, DelegationRootNode, DelegationState, Permission,
    Permissions,
};
pub use digest::{Address, Digest, Salt};
pub use error::TesseraError;
