//! Test utilities for integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use tessera_core::{Claim, DelegationNode, DelegationRootNode, Digest, Permissions};
use tessera_crypto::{Identity, SeededSaltSource};
use tessera_ledger::{delegation, EngineConfig, InMemoryLedger};
use tessera_request::{RequestBuilder, RequestForAttestation};

pub fn ctype() -> Digest {
    Digest::from_bytes([0xc7; 32])
}

/// Ledger plus the accounts of a small delegation tree:
/// root owner -> manager (ATTEST | DELEGATE) -> attester (ATTEST)
pub struct TestNetwork {
    pub ledger: InMemoryLedger,
    pub config: EngineConfig,
    pub root_owner: Identity,
    pub manager: Identity,
    pub attester: Identity,
    pub root: DelegationRootNode,
    pub manager_node: DelegationNode,
    pub attester_node: DelegationNode,
}

impl TestNetwork {
    pub async fn new() -> Self {
        let ledger = InMemoryLedger::new();
        let config = EngineConfig::default();
        let root_owner = Identity::generate();
        let manager = Identity::generate();
        let attester = Identity::generate();

        let root = DelegationRootNode::new(ctype(), root_owner.address().clone());
        delegation::store_delegation_root(&ledger, &root, root_owner.address())
            .await
            .unwrap();

        let manager_node = store_node(&ledger, &config, &root, None, &root_owner, &manager, Permissions::ALL).await;
        let attester_node = store_node(
            &ledger,
            &config,
            &root,
            Some(&manager_node),
            &manager,
            &attester,
            Permissions::ATTEST,
        )
        .await;

        Self {
            ledger,
            config,
            root_owner,
            manager,
            attester,
            root,
            manager_node,
            attester_node,
        }
    }
}

pub async fn store_node(
    ledger: &InMemoryLedger,
    config: &EngineConfig,
    root: &DelegationRootNode,
    parent: Option<&DelegationNode>,
    delegator: &Identity,
    delegate: &Identity,
    permissions: Permissions,
) -> DelegationNode {
    let node = DelegationNode::new_node(root.id, parent.map(|p| p.id), delegate.address().clone(), permissions);
    let signature = delegate.sign_digest(&node.authorization_hash()).unwrap();
    delegation::store_delegation_node(ledger, &node, delegator.address(), &signature, config)
        .await
        .unwrap();
    node
}

pub fn claim_for(claimer: &Identity, contents: Value) -> Claim {
    Claim::from_json(ctype(), claimer.address().clone(), contents).unwrap()
}

pub fn sample_contents() -> Value {
    json!({
        "name": "Alice",
        "birth_year": 1994,
        "address": {"city": "Bern", "country": "CH"}
    })
}

/// Request signed by `claimer` with deterministic salts
pub fn request(claimer: &Identity, delegation_id: Option<Digest>) -> RequestForAttestation {
    let mut builder = RequestBuilder::new(claim_for(claimer, sample_contents()));
    if let Some(id) = delegation_id {
        builder = builder.delegation(id);
    }
    builder.build(claimer, &mut SeededSaltSource::new(99)).unwrap()
}
