//! In-memory ledger (for development/testing)

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;
use tessera_core::{Address, Attestation, DelegationNode, DelegationRootNode, Digest};
use tessera_crypto::hash_multi;

use crate::error::LedgerError;
use crate::oracle::{Ledger, TxReceipt};

/// Ledger state held in process memory
#[derive(Default)]
pub struct InMemoryLedger {
    attestations: RwLock<HashMap<Digest, Attestation>>,
    roots: RwLock<HashMap<Digest, DelegationRootNode>>,
    nodes: RwLock<HashMap<Digest, DelegationNode>>,
    sequence: AtomicU64,
    unavailable: AtomicBool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`LedgerError::Unavailable`] until reset
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of writes included so far
    pub fn height(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> Result<(), LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable);
        }
        Ok(())
    }

    fn receipt(&self, kind: &str, key: &Digest, signer: &Address) -> TxReceipt {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let tx_hash = hash_multi(&[
            &b"tessera:tx:v1"[..],
            &sequence.to_be_bytes()[..],
            kind.as_bytes(),
            &key.as_bytes()[..],
            signer.as_str().as_bytes(),
        ]);
        TxReceipt {
            tx_hash,
            sequence,
            signer: signer.clone(),
            included_at: Utc::now(),
        }
    }
}

fn insert_new<T: Clone>(
    map: &RwLock<HashMap<Digest, T>>,
    key: Digest,
    value: &T,
) -> Result<(), LedgerError> {
    let mut entries = map.write().map_err(|e| LedgerError::Storage(e.to_string()))?;
    if entries.contains_key(&key) {
        return Err(LedgerError::AlreadyExists(key));
    }
    entries.insert(key, value.clone());
    Ok(())
}

fn get<T: Clone>(map: &RwLock<HashMap<Digest, T>>, key: &Digest) -> Result<Option<T>, LedgerError> {
    let entries = map.read().map_err(|e| LedgerError::Storage(e.to_string()))?;
    Ok(entries.get(key).cloned())
}

fn update<T>(
    map: &RwLock<HashMap<Digest, T>>,
    key: &Digest,
    apply: impl FnOnce(&mut T),
) -> Result<(), LedgerError> {
    let mut entries = map.write().map_err(|e| LedgerError::Storage(e.to_string()))?;
    let entry = entries.get_mut(key).ok_or(LedgerError::NotFound(*key))?;
    apply(entry);
    Ok(())
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn query_attestation(&self, claim_hash: &Digest) -> Result<Option<Attestation>, LedgerError> {
        self.ensure_available()?;
        get(&self.attestations, claim_hash)
    }

    async fn store_attestation(
        &self,
        attestation: &Attestation,
        signer: &Address,
    ) -> Result<TxReceipt, LedgerError> {
        self.ensure_available()?;
        insert_new(&self.attestations, attestation.claim_hash, attestation)?;
        Ok(self.receipt("attestation.store", &attestation.claim_hash, signer))
    }

    async fn revoke_attestation(&self, claim_hash: &Digest, signer: &Address) -> Result<TxReceipt, LedgerError> {
        self.ensure_available()?;
        update(&self.attestations, claim_hash, |a| a.revoked = true)?;
        Ok(self.receipt("attestation.revoke", claim_hash, signer))
    }

    async fn query_delegation_root(&self, root_id: &Digest) -> Result<Option<DelegationRootNode>, LedgerError> {
        self.ensure_available()?;
        get(&self.roots, root_id)
    }

    async fn query_delegation_node(&self, node_id: &Digest) -> Result<Option<DelegationNode>, LedgerError> {
        self.ensure_available()?;
        get(&self.nodes, node_id)
    }

    async fn store_delegation_root(
        &self,
        root: &DelegationRootNode,
        signer: &Address,
    ) -> Result<TxReceipt, LedgerError> {
        self.ensure_available()?;
        insert_new(&self.roots, root.id, root)?;
        Ok(self.receipt("delegation.root.store", &root.id, signer))
    }

    async fn store_delegation_node(
        &self,
        node: &DelegationNode,
        signer: &Address,
    ) -> Result<TxReceipt, LedgerError> {
        self.ensure_available()?;
        insert_new(&self.nodes, node.id, node)?;
        Ok(self.receipt("delegation.node.store", &node.id, signer))
    }

    async fn revoke_delegation_root(&self, root_id: &Digest, signer: &Address) -> Result<TxReceipt, LedgerError> {
        self.ensure_available()?;
        update(&self.roots, root_id, |r| r.revoked = true)?;
        Ok(self.receipt("delegation.root.revoke", root_id, signer))
    }

    async fn revoke_delegation_node(&self, node_id: &Digest, signer: &Address) -> Result<TxReceipt, LedgerError> {
        self.ensure_available()?;
        update(&self.nodes, node_id, |n| n.revoked = true)?;
        Ok(self.receipt("delegation.node.revoke", node_id, signer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attestation(byte: u8) -> Attestation {
        Attestation::new(
            Digest::from_bytes([byte; 32]),
            Digest::from_bytes([0xcc; 32]),
            Address::new("0xattester"),
            None,
        )
    }

    #[tokio::test]
    async fn test_store_and_query() {
        let ledger = InMemoryLedger::new();
        let signer = Address::new("0xattester");
        let att = attestation(1);

        let receipt = ledger.store_attestation(&att, &signer).await.unwrap();
        assert_eq!(receipt.sequence, 1);
        assert_eq!(receipt.signer, signer);
        assert_eq!(ledger.height(), 1);

        let found = ledger.query_attestation(&att.claim_hash).await.unwrap();
        assert_eq!(found, Some(att));
        assert_eq!(
            ledger.query_attestation(&Digest::from_bytes([2; 32])).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let ledger = InMemoryLedger::new();
        let signer = Address::new("0xattester");
        let att = attestation(1);

        ledger.store_attestation(&att, &signer).await.unwrap();
        assert_eq!(
            ledger.store_attestation(&att, &signer).await,
            Err(LedgerError::AlreadyExists(att.claim_hash))
        );
    }

    #[tokio::test]
    async fn test_revoke_missing() {
        let ledger = InMemoryLedger::new();
        let missing = Digest::from_bytes([9; 32]);
        assert_eq!(
            ledger.revoke_attestation(&missing, &Address::new("0xa")).await,
            Err(LedgerError::NotFound(missing))
        );
    }

    #[tokio::test]
    async fn test_receipts_are_distinct() {
        let ledger = InMemoryLedger::new();
        let signer = Address::new("0xattester");
        let att = attestation(1);

        let stored = ledger.store_attestation(&att, &signer).await.unwrap();
        let revoked = ledger.revoke_attestation(&att.claim_hash, &signer).await.unwrap();
        assert_ne!(stored.tx_hash, revoked.tx_hash);
        assert_eq!(revoked.sequence, 2);
        assert!(ledger.query_attestation(&att.claim_hash).await.unwrap().unwrap().revoked);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let ledger = InMemoryLedger::new();
        ledger.set_unavailable(true);
        assert_eq!(
            ledger.query_attestation(&Digest::from_bytes([1; 32])).await,
            Err(LedgerError::Unavailable)
        );

        ledger.set_unavailable(false);
        assert!(ledger.query_attestation(&Digest::from_bytes([1; 32])).await.is_ok());
    }
}
