//! Ledger oracle interface
//!
//! The ledger is the authority for attestation and delegation state. Engines
//! never hold a connection of their own; every call takes the oracle as a
//! parameter. Oracles only record state: authorization is enforced by the
//! engines in [`crate::attestation`] and [`crate::delegation`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::{Address, Attestation, DelegationNode, DelegationRootNode, Digest};

use crate::error::LedgerError;

/// Inclusion receipt for a ledger write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: Digest,

    /// Position of the write in the ledger's history
    pub sequence: u64,

    /// Account that submitted the write
    pub signer: Address,

    /// When the write was included
    pub included_at: DateTime<Utc>,
}

/// Result of a revocation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// The entry was revoked by this call
    Revoked(TxReceipt),

    /// The entry was already revoked; nothing was written
    AlreadyRevoked,
}

impl RevokeOutcome {
    pub fn receipt(&self) -> Option<&TxReceipt> {
        match self {
            RevokeOutcome::Revoked(receipt) => Some(receipt),
            RevokeOutcome::AlreadyRevoked => None,
        }
    }
}

/// Read and write access to ledger state.
///
/// Queries return `Ok(None)` for absent entries; `Err` is reserved for the
/// oracle itself failing.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Look up the attestation of a claim hash
    async fn query_attestation(&self, claim_hash: &Digest) -> Result<Option<Attestation>, LedgerError>;

    /// Record a new attestation; fails if the claim hash is already attested
    async fn store_attestation(
        &self,
        attestation: &Attestation,
        signer: &Address,
    ) -> Result<TxReceipt, LedgerError>;

    /// Mark an attestation revoked
    async fn revoke_attestation(&self, claim_hash: &Digest, signer: &Address) -> Result<TxReceipt, LedgerError>;

    async fn query_delegation_root(&self, root_id: &Digest) -> Result<Option<DelegationRootNode>, LedgerError>;

    async fn query_delegation_node(&self, node_id: &Digest) -> Result<Option<DelegationNode>, LedgerError>;

    async fn store_delegation_root(
        &self,
        root: &DelegationRootNode,
        signer: &Address,
    ) -> Result<TxReceipt, LedgerError>;

    async fn store_delegation_node(
        &self,
        node: &DelegationNode,
        signer: &Address,
    ) -> Result<TxReceipt, LedgerError>;

    async fn revoke_delegation_root(&self, root_id: &Digest, signer: &Address) -> Result<TxReceipt, LedgerError>;

    async fn revoke_delegation_node(&self, node_id: &Digest, signer: &Address) -> Result<TxReceipt, LedgerError>;
}
