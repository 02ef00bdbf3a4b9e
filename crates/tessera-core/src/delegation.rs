//! Delegation types for Tessera
//!
//! Delegation nodes form a tree anchored at a root node that fixes the cType
//! and the owning account. Each node grants its account a set of permissions.
//! Revocation is stored per node only; whether a node is usable is a
//! predicate over its whole ancestor chain.

use serde::{Deserialize, Serialize};

use crate::digest::{Address, Digest};

/// A single delegation permission flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// May attest claims under this delegation
    Attest = 0b01,
    /// May create child delegation nodes
    Delegate = 0b10,
}

impl Permission {
    /// All flags in their canonical order
    pub const ALL: [Permission; 2] = [Permission::Attest, Permission::Delegate];

    pub fn bit(&self) -> u32 {
        *self as u32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Attest => "attest",
            Permission::Delegate => "delegate",
        }
    }
}

/// Permission bitset carried by a delegation node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(u32);

impl Permissions {
    pub const NONE: Permissions = Permissions(0);
    pub const ATTEST: Permissions = Permissions(Permission::Attest as u32);
    pub const DELEGATE: Permissions = Permissions(Permission::Delegate as u32);
    pub const ALL: Permissions = Permissions(Permission::Attest as u32 | Permission::Delegate as u32);

    /// Keep only known flags from a raw bitset
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0 & permission.bit() != 0
    }

    pub fn with(self, permission: Permission) -> Self {
        Self(self.0 | permission.bit())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn to_vec(&self) -> Vec<Permission> {
        decode_permissions(self.0)
    }
}

impl FromIterator<Permission> for Permissions {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        iter.into_iter().fold(Permissions::NONE, Permissions::with)
    }
}

/// Decode a raw bitset into its flags, ordered `[Attest, Delegate]`
pub fn decode_permissions(bits: u32) -> Vec<Permission> {
    Permission::ALL
        .into_iter()
        .filter(|p| bits & p.bit() != 0)
        .collect()
}

/// Lifecycle of a delegation node. `Revoked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegationState {
    Active,
    Revoked,
}

/// Root of a delegation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRootNode {
    pub id: Digest,

    /// cType every attestation under this tree must use
    pub ctype_hash: Digest,

    /// Owning account
    pub account: Address,

    pub revoked: bool,
}

impl DelegationRootNode {
    /// Create a root with a fresh random id
    pub fn new(ctype_hash: Digest, account: Address) -> Self {
        Self {
            id: Digest::generate(),
            ctype_hash,
            account,
            revoked: false,
        }
    }

    pub fn state(&self) -> DelegationState {
        if self.revoked {
            DelegationState::Revoked
        } else {
            DelegationState::Active
        }
    }
}

/// A node in a delegation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationNode {
    pub id: Digest,

    /// Root of the tree this node belongs to
    pub root_id: Digest,

    /// Parent node; `None` when the node hangs directly off the root
    pub parent_id: Option<Digest>,

    /// Account the permissions are granted to
    pub account: Address,

    pub permissions: Permissions,

    /// Local revocation flag (ancestors are not reflected here)
    pub revoked: bool,
}

impl DelegationNode {
    /// Create a node with a fresh random id
    pub fn new_node(
        root_id: Digest,
        parent_id: Option<Digest>,
        account: Address,
        permissions: Permissions,
    ) -> Self {
        Self {
            id: Digest::generate(),
            root_id,
            parent_id,
            account,
            permissions,
            revoked: false,
        }
    }

    pub fn can_attest(&self) -> bool {
        self.permissions.contains(Permission::Attest)
    }

    pub fn can_delegate(&self) -> bool {
        self.permissions.contains(Permission::Delegate)
    }

    pub fn state(&self) -> DelegationState {
        if self.revoked {
            DelegationState::Revoked
        } else {
            DelegationState::Active
        }
    }

    /// Digest the delegate signs to accept this node.
    ///
    /// Layout: `id || root_id || (0x00 | 0x01 || parent_id) || permissions (u32 BE)`.
    pub fn authorization_hash(&self) -> Digest {
        use sha3::{Digest as _, Sha3_256};
        let mut hasher = Sha3_256::new();
        hasher.update(b"tessera:delegation:v1");
        hasher.update(self.id.as_bytes());
        hasher.update(self.root_id.as_bytes());
        match &self.parent_id {
            Some(parent) => {
                hasher.update([1u8]);
                hasher.update(parent.as_bytes());
            }
            None => hasher.update([0u8]),
        }
        hasher.update(self.permissions.bits().to_be_bytes());
        Digest::from_bytes(hasher.finalize().into())
    }
}
