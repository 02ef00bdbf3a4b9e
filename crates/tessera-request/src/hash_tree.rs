//! Salted claim hash tree
//!
//! Every disclosed unit of a claim (the owner, and each property) is
//! committed to as `H(nonce || canonical_json(unit))` with its own random
//! nonce. The owner unit is the owner address as a JSON string; a property
//! unit is the single-entry object `{name: value}`, which binds the property
//! name as well as its value.
//!
//! The per-unit digests form an unordered set. The root hash combines that
//! set with the cType hash, the root hashes of any legitimations and the
//! delegation id:
//!
//! ```text
//! root = SHA3-256(
//!     "tessera:root:v1"
//!  || ctype_hash
//!  || u32_be(|claim_hashes|) || claim_hashes sorted ascending
//!  || SHA3-256(legitimation root hashes sorted ascending)
//!  || 0x00                   (no delegation)
//!   | 0x01 || delegation_id
//! )
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tessera_core::{canonical_json, Address, Claim, Digest, PropertyName, Salt};
use tessera_crypto::{hash_multi, salted_hash, sha3_256, SaltSource};

use crate::error::{RequestError, Result};

const ROOT_DOMAIN: &[u8] = b"tessera:root:v1";

/// Commitment to one disclosed unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceEntry {
    /// `H(nonce || canonical_json(unit))`
    pub hash: Digest,
    pub nonce: Salt,
}

impl NonceEntry {
    /// Commit to `payload` under `nonce`
    pub fn commit(nonce: Salt, payload: &[u8]) -> Self {
        Self {
            hash: salted_hash(&nonce, payload),
            nonce,
        }
    }

    /// Recompute the commitment for `payload`
    pub fn recompute(&self, payload: &[u8]) -> Digest {
        salted_hash(&self.nonce, payload)
    }
}

/// Nonce entries of a request, plus the digests of units that were redacted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimNonceMap {
    /// Entry of the owner pseudo-property
    pub owner: Option<NonceEntry>,

    /// Entries keyed by property name
    pub properties: BTreeMap<PropertyName, NonceEntry>,

    /// Digests of units removed by selective disclosure
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub redacted: BTreeSet<Digest>,
}

impl ClaimNonceMap {
    /// Number of live (disclosed) entries
    pub fn live_entries(&self) -> usize {
        self.properties.len() + usize::from(self.owner.is_some())
    }
}

/// Canonical unit bytes of the claim owner
pub fn owner_unit(owner: &Address) -> Vec<u8> {
    canonical_json(&Value::String(owner.as_str().to_string()))
}

/// Canonical unit bytes of a claim property
pub fn property_unit(name: &str, value: &Value) -> Vec<u8> {
    let mut unit = serde_json::Map::new();
    unit.insert(name.to_string(), value.clone());
    canonical_json(&Value::Object(unit))
}

/// Nonce map and claim hash set of a freshly built claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimHashTree {
    pub nonce_map: ClaimNonceMap,
    pub claim_hashes: BTreeSet<Digest>,
}

impl ClaimHashTree {
    /// Commit to the owner and every property of `claim`.
    ///
    /// A fresh build always includes the owner, so a claim without one is
    /// rejected.
    pub fn build(claim: &Claim, salts: &mut dyn SaltSource) -> Result<Self> {
        let owner = claim.owner.as_ref().ok_or(RequestError::MissingOwner)?;

        let owner_entry = NonceEntry::commit(salts.next_salt(), &owner_unit(owner));
        let mut claim_hashes = BTreeSet::new();
        claim_hashes.insert(owner_entry.hash);

        let mut properties = BTreeMap::new();
        for (name, value) in &claim.contents {
            let entry = NonceEntry::commit(salts.next_salt(), &property_unit(name, value));
            claim_hashes.insert(entry.hash);
            properties.insert(name.clone(), entry);
        }

        Ok(Self {
            nonce_map: ClaimNonceMap {
                owner: Some(owner_entry),
                properties,
                redacted: BTreeSet::new(),
            },
            claim_hashes,
        })
    }
}

/// Compute the root hash over the canonical layout described above
pub fn compute_root_hash(
    ctype_hash: &Digest,
    claim_hashes: &BTreeSet<Digest>,
    legitimation_roots: &[Digest],
    delegation_id: Option<&Digest>,
) -> Digest {
    let mut sorted_roots = legitimation_roots.to_vec();
    sorted_roots.sort();
    let roots_bytes: Vec<u8> = sorted_roots.iter().flat_map(|d| *d.as_bytes()).collect();
    let legitimations_hash = sha3_256(&roots_bytes);

    let hashes_bytes: Vec<u8> = claim_hashes.iter().flat_map(|d| *d.as_bytes()).collect();
    let count = (claim_hashes.len() as u32).to_be_bytes();

    let delegation_bytes: Vec<u8> = match delegation_id {
        Some(id) => std::iter::once(1u8).chain(id.as_bytes().iter().copied()).collect(),
        None => vec![0u8],
    };

    hash_multi(&[
        ROOT_DOMAIN,
        &ctype_hash.as_bytes()[..],
        &count[..],
        &hashes_bytes[..],
        &legitimations_hash[..],
        &delegation_bytes[..],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_crypto::SeededSaltSource;

    fn claim() -> Claim {
        Claim::from_json(
            Digest::from_bytes([3u8; 32]),
            Address::new("0xbob"),
            json!({"a": "a", "b": "b", "c": "c"}),
        )
        .unwrap()
    }

    #[test]
    fn test_build_commits_every_unit() {
        let tree = ClaimHashTree::build(&claim(), &mut SeededSaltSource::new(1)).unwrap();

        assert_eq!(tree.claim_hashes.len(), 4);
        assert_eq!(tree.nonce_map.live_entries(), 4);

        let owner_entry = tree.nonce_map.owner.as_ref().unwrap();
        assert_eq!(owner_entry.recompute(&owner_unit(&Address::new("0xbob"))), owner_entry.hash);

        let a = &tree.nonce_map.properties["a"];
        assert_eq!(a.recompute(&property_unit("a", &json!("a"))), a.hash);
        assert!(tree.claim_hashes.contains(&a.hash));
    }

    #[test]
    fn test_empty_contents_commit_owner_only() {
        let claim =
            Claim::from_json(Digest::from_bytes([3u8; 32]), Address::new("0xbob"), json!({}))
                .unwrap();
        let tree = ClaimHashTree::build(&claim, &mut SeededSaltSource::new(1)).unwrap();
        assert_eq!(tree.claim_hashes.len(), 1);
        assert!(tree.nonce_map.properties.is_empty());
    }

    #[test]
    fn test_build_requires_owner() {
        let mut claim = claim();
        claim.owner = None;
        assert_eq!(
            ClaimHashTree::build(&claim, &mut SeededSaltSource::new(1)),
            Err(RequestError::MissingOwner)
        );
    }

    #[test]
    fn test_property_unit_binds_name() {
        assert_ne!(property_unit("a", &json!("x")), property_unit("b", &json!("x")));
    }

    #[test]
    fn test_key_order_does_not_change_commitment() {
        let nonce = Salt::from_bytes([8u8; 32]);
        let v1 = json!({"street": "Main", "city": "Berlin"});
        let v2 = json!({"city": "Berlin", "street": "Main"});
        assert_eq!(
            NonceEntry::commit(nonce, &property_unit("address", &v1)).hash,
            NonceEntry::commit(nonce, &property_unit("address", &v2)).hash
        );
    }

    #[test]
    fn test_root_hash_order_independent() {
        let ctype = Digest::from_bytes([1u8; 32]);
        let hashes: BTreeSet<Digest> = [Digest::from_bytes([5u8; 32]), Digest::from_bytes([4u8; 32])]
            .into_iter()
            .collect();
        let l1 = Digest::from_bytes([6u8; 32]);
        let l2 = Digest::from_bytes([7u8; 32]);

        assert_eq!(
            compute_root_hash(&ctype, &hashes, &[l1, l2], None),
            compute_root_hash(&ctype, &hashes, &[l2, l1], None)
        );
    }

    #[test]
    fn test_root_hash_binds_every_input() {
        let ctype = Digest::from_bytes([1u8; 32]);
        let hashes: BTreeSet<Digest> = [Digest::from_bytes([5u8; 32])].into_iter().collect();
        let base = compute_root_hash(&ctype, &hashes, &[], None);

        let delegation = Digest::from_bytes([9u8; 32]);
        assert_ne!(base, compute_root_hash(&ctype, &hashes, &[], Some(&delegation)));
        assert_ne!(
            base,
            compute_root_hash(&Digest::from_bytes([2u8; 32]), &hashes, &[], None)
        );
        assert_ne!(
            base,
            compute_root_hash(&ctype, &hashes, &[Digest::from_bytes([6u8; 32])], None)
        );
        assert_ne!(base, compute_root_hash(&ctype, &BTreeSet::new(), &[], None));
    }
}
