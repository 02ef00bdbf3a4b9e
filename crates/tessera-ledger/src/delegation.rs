//! Delegation chains
//!
//! A delegation tree starts at a root owned by an account and bound to one
//! cType. Nodes grant ATTEST and/or DELEGATE permissions to accounts and
//! point at their parent (or directly at the root). A node is usable only
//! while every node on its path to the root, and the root itself, is
//! unrevoked. Revocation is recorded on the revoked entry alone; validity is
//! recomputed by walking the chain.

use std::collections::HashSet;
use tessera_core::{Address, DelegationNode, DelegationRootNode, Digest, Permission};
use tessera_crypto::SignatureEnvelope;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::DelegationError;
use crate::oracle::{Ledger, RevokeOutcome, TxReceipt};

type Result<T> = std::result::Result<T, DelegationError>;

/// A node with its ancestors (nearest first) and its root
#[derive(Debug, Clone)]
pub struct DelegationChain {
    pub node: DelegationNode,
    pub ancestors: Vec<DelegationNode>,
    pub root: DelegationRootNode,
}

impl DelegationChain {
    /// Ancestor count plus the node itself
    pub fn depth(&self) -> usize {
        self.ancestors.len() + 1
    }

    /// True when `account` has authority over the node: the owner of an
    /// unrevoked root, or the account of an active ancestor holding DELEGATE
    pub fn is_delegator(&self, account: &Address) -> bool {
        if !self.root.revoked && &self.root.account == account {
            return true;
        }
        self.ancestors
            .iter()
            .any(|a| &a.account == account && !a.revoked && a.can_delegate())
    }

    fn ensure_active(&self) -> Result<()> {
        if self.root.revoked {
            return Err(DelegationError::Revoked(self.root.id));
        }
        if self.node.revoked {
            return Err(DelegationError::Revoked(self.node.id));
        }
        for ancestor in &self.ancestors {
            if ancestor.revoked {
                return Err(DelegationError::Revoked(ancestor.id));
            }
            if !ancestor.can_delegate() {
                return Err(DelegationError::MissingPermission {
                    node: ancestor.id,
                    permission: Permission::Delegate,
                });
            }
        }
        Ok(())
    }
}

/// Load a node and walk its parents to the root.
///
/// Missing entries, cycles, chains deeper than `max_delegation_depth` and
/// ancestors filed under a different root are errors. Revocation is not
/// checked here.
pub async fn load_chain(
    ledger: &dyn Ledger,
    node_id: &Digest,
    config: &EngineConfig,
) -> Result<DelegationChain> {
    let node = ledger
        .query_delegation_node(node_id)
        .await?
        .ok_or(DelegationError::NodeNotFound(*node_id))?;

    let mut visited = HashSet::from([node.id]);
    let mut ancestors: Vec<DelegationNode> = Vec::new();
    let mut next = node.parent_id;

    while let Some(parent_id) = next {
        if ancestors.len() + 1 >= config.max_delegation_depth {
            return Err(DelegationError::DepthExceeded(config.max_delegation_depth));
        }
        if !visited.insert(parent_id) {
            return Err(DelegationError::Cycle(parent_id));
        }

        let parent = ledger
            .query_delegation_node(&parent_id)
            .await?
            .ok_or(DelegationError::NodeNotFound(parent_id))?;
        if parent.root_id != node.root_id {
            return Err(DelegationError::InconsistentRoot {
                node: parent.id,
                expected: node.root_id,
                actual: parent.root_id,
            });
        }

        next = parent.parent_id;
        ancestors.push(parent);
    }

    let root = ledger
        .query_delegation_root(&node.root_id)
        .await?
        .ok_or(DelegationError::RootNotFound(node.root_id))?;

    debug!(node = %node.id, root = %root.id, depth = ancestors.len() + 1, "loaded delegation chain");

    Ok(DelegationChain {
        node,
        ancestors,
        root,
    })
}

/// Check that `attester` may attest under `delegation_id`.
///
/// The node must belong to the attester and hold ATTEST, its whole chain
/// must be active, and when `expected_ctype` is given the root must be
/// bound to it.
pub async fn validate_attestation_delegation(
    ledger: &dyn Ledger,
    delegation_id: &Digest,
    attester: &Address,
    expected_ctype: Option<&Digest>,
    config: &EngineConfig,
) -> Result<DelegationNode> {
    let chain = load_chain(ledger, delegation_id, config).await?;

    if &chain.node.account != attester {
        return Err(DelegationError::AccountMismatch {
            node: chain.node.id,
            expected: attester.clone(),
            actual: chain.node.account.clone(),
        });
    }
    if !chain.node.can_attest() {
        return Err(DelegationError::MissingPermission {
            node: chain.node.id,
            permission: Permission::Attest,
        });
    }
    chain.ensure_active()?;

    if let Some(ctype) = expected_ctype {
        if &chain.root.ctype_hash != ctype {
            return Err(DelegationError::CTypeMismatch {
                expected: *ctype,
                actual: chain.root.ctype_hash,
            });
        }
    }

    Ok(chain.node)
}

/// Predicate form of [`validate_attestation_delegation`]; fails closed
pub async fn is_valid_attestation_delegation(
    ledger: &dyn Ledger,
    delegation_id: &Digest,
    attester: &Address,
    expected_ctype: Option<&Digest>,
    config: &EngineConfig,
) -> bool {
    match validate_attestation_delegation(ledger, delegation_id, attester, expected_ctype, config).await {
        Ok(_) => true,
        Err(DelegationError::Ledger(e)) => {
            warn!(delegation = %delegation_id, error = %e, "ledger failure during delegation check");
            false
        }
        Err(e) => {
            debug!(delegation = %delegation_id, error = %e, "delegation denied");
            false
        }
    }
}

/// True when `account` sits above `node_id` with authority over it: the
/// root owner, or the account of an active ancestor holding DELEGATE
pub async fn is_delegator_of(
    ledger: &dyn Ledger,
    node_id: &Digest,
    account: &Address,
    config: &EngineConfig,
) -> Result<bool> {
    let chain = load_chain(ledger, node_id, config).await?;
    Ok(chain.is_delegator(account))
}

/// Record a new delegation root owned by `owner`
pub async fn store_delegation_root(
    ledger: &dyn Ledger,
    root: &DelegationRootNode,
    owner: &Address,
) -> Result<TxReceipt> {
    if &root.account != owner {
        warn!(root = %root.id, owner = %owner, "rejected delegation root for foreign account");
        return Err(DelegationError::NotAuthorized(owner.clone()));
    }

    let receipt = ledger.store_delegation_root(root, owner).await?;
    info!(root = %root.id, ctype = %root.ctype_hash, owner = %owner, "stored delegation root");
    Ok(receipt)
}

/// Record a new delegation node on behalf of `delegator`.
///
/// The delegator must own the parent node (or the root, for a node without
/// a parent), the parent chain must be active and the parent must hold
/// DELEGATE. `delegate_signature` is the new account's signature over
/// [`DelegationNode::authorization_hash`].
pub async fn store_delegation_node(
    ledger: &dyn Ledger,
    node: &DelegationNode,
    delegator: &Address,
    delegate_signature: &SignatureEnvelope,
    config: &EngineConfig,
) -> Result<TxReceipt> {
    let root = ledger
        .query_delegation_root(&node.root_id)
        .await?
        .ok_or(DelegationError::RootNotFound(node.root_id))?;
    if root.revoked {
        return Err(DelegationError::Revoked(root.id));
    }

    match &node.parent_id {
        None => {
            if &root.account != delegator {
                warn!(node = %node.id, delegator = %delegator, "delegator does not own the root");
                return Err(DelegationError::NotAuthorized(delegator.clone()));
            }
        }
        Some(parent_id) => {
            let chain = load_chain(ledger, parent_id, config).await?;
            if chain.node.root_id != node.root_id {
                return Err(DelegationError::InconsistentRoot {
                    node: chain.node.id,
                    expected: node.root_id,
                    actual: chain.node.root_id,
                });
            }
            if &chain.node.account != delegator {
                warn!(node = %node.id, delegator = %delegator, "delegator does not own the parent");
                return Err(DelegationError::NotAuthorized(delegator.clone()));
            }
            if !chain.node.can_delegate() {
                return Err(DelegationError::MissingPermission {
                    node: chain.node.id,
                    permission: Permission::Delegate,
                });
            }
            chain.ensure_active()?;
            if chain.depth() >= config.max_delegation_depth {
                return Err(DelegationError::DepthExceeded(config.max_delegation_depth));
            }
        }
    }

    if !delegate_signature.verify_for(&node.authorization_hash(), &node.account) {
        return Err(DelegationError::InvalidDelegateSignature);
    }

    let receipt = ledger.store_delegation_node(node, delegator).await?;
    info!(
        node = %node.id,
        root = %node.root_id,
        account = %node.account,
        permissions = node.permissions.bits(),
        "stored delegation node"
    );
    Ok(receipt)
}

/// Revoke a delegation node.
///
/// The node's own account may revoke, as may any delegator of the node
/// (see [`is_delegator_of`]). Revoking a revoked node is a no-op.
pub async fn revoke_delegation(
    ledger: &dyn Ledger,
    node_id: &Digest,
    revoker: &Address,
    config: &EngineConfig,
) -> Result<RevokeOutcome> {
    let chain = load_chain(ledger, node_id, config).await?;

    if &chain.node.account != revoker && !chain.is_delegator(revoker) {
        warn!(node = %node_id, revoker = %revoker, "unauthorized delegation revocation");
        return Err(DelegationError::NotAuthorized(revoker.clone()));
    }

    if chain.node.revoked {
        debug!(node = %node_id, "delegation already revoked");
        return Ok(RevokeOutcome::AlreadyRevoked);
    }

    let receipt = ledger.revoke_delegation_node(node_id, revoker).await?;
    info!(node = %node_id, revoker = %revoker, "revoked delegation node");
    Ok(RevokeOutcome::Revoked(receipt))
}

/// Revoke a delegation root; only its owner may do so
pub async fn revoke_delegation_root(
    ledger: &dyn Ledger,
    root_id: &Digest,
    revoker: &Address,
) -> Result<RevokeOutcome> {
    let root = ledger
        .query_delegation_root(root_id)
        .await?
        .ok_or(DelegationError::RootNotFound(*root_id))?;

    if &root.account != revoker {
        warn!(root = %root_id, revoker = %revoker, "unauthorized root revocation");
        return Err(DelegationError::NotAuthorized(revoker.clone()));
    }
    if root.revoked {
        return Ok(RevokeOutcome::AlreadyRevoked);
    }

    let receipt = ledger.revoke_delegation_root(root_id, revoker).await?;
    info!(root = %root_id, "revoked delegation root");
    Ok(RevokeOutcome::Revoked(receipt))
}
