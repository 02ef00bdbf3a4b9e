//! Requests for attestation
//!
//! A request binds a claim to its salted hash tree and to the claimer's
//! signature over the root hash. The claimer may later redact properties
//! (or the owner) without invalidating the signature: redaction only drops
//! values and nonces, and records the digest of each dropped unit.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use tessera_core::compress::{expect_array, field};
use tessera_core::{Claim, Digest, TesseraError};
use tessera_crypto::{Identity, OsSaltSource, SaltSource, SignatureEnvelope};
use tracing::debug;

use crate::attested::AttestedClaim;
use crate::error::{RequestError, Result};
use crate::hash_tree::{compute_root_hash, owner_unit, property_unit, ClaimHashTree, ClaimNonceMap, NonceEntry};

/// Number of positional fields in a compressed request
pub const COMPRESSED_REQUEST_ARITY: usize = 7;

/// A claim committed to by a salted hash tree and signed by its claimer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestForAttestation {
    pub claim: Claim,
    pub claim_nonce_map: ClaimNonceMap,
    pub claim_hashes: BTreeSet<Digest>,
    pub claimer_signature: SignatureEnvelope,
    pub root_hash: Digest,

    /// Attested claims vouching for the claimer
    #[serde(default)]
    pub legitimations: Vec<AttestedClaim>,

    /// Delegation node the attester is expected to act under
    #[serde(default)]
    pub delegation_id: Option<Digest>,
}

/// Builder for [`RequestForAttestation`]
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    claim: Claim,
    legitimations: Vec<AttestedClaim>,
    delegation_id: Option<Digest>,
}

impl RequestBuilder {
    pub fn new(claim: Claim) -> Self {
        Self {
            claim,
            legitimations: Vec::new(),
            delegation_id: None,
        }
    }

    pub fn legitimations(mut self, legitimations: impl IntoIterator<Item = AttestedClaim>) -> Self {
        self.legitimations.extend(legitimations);
        self
    }

    pub fn legitimation(mut self, legitimation: AttestedClaim) -> Self {
        self.legitimations.push(legitimation);
        self
    }

    pub fn delegation(mut self, delegation_id: Digest) -> Self {
        self.delegation_id = Some(delegation_id);
        self
    }

    /// Commit to the claim and sign the root hash with `identity`.
    ///
    /// The claim owner must be the identity's address, and every
    /// legitimation must verify on its own.
    pub fn build(self, identity: &Identity, salts: &mut dyn SaltSource) -> Result<RequestForAttestation> {
        let owner = self.claim.owner.as_ref().ok_or(RequestError::MissingOwner)?;
        if owner != identity.address() {
            return Err(RequestError::OwnerMismatch {
                owner: owner.clone(),
                signer: identity.address().clone(),
            });
        }

        for (index, legitimation) in self.legitimations.iter().enumerate() {
            legitimation
                .validate()
                .map_err(|e| RequestError::InvalidLegitimation {
                    index,
                    reason: e.to_string(),
                })?;
        }

        let tree = ClaimHashTree::build(&self.claim, salts)?;
        let legitimation_roots: Vec<Digest> =
            self.legitimations.iter().map(|l| l.request.root_hash).collect();
        let root_hash = compute_root_hash(
            &self.claim.ctype_hash,
            &tree.claim_hashes,
            &legitimation_roots,
            self.delegation_id.as_ref(),
        );
        let claimer_signature = identity.sign_digest(&root_hash)?;

        debug!(
            root_hash = %root_hash,
            units = tree.claim_hashes.len(),
            legitimations = self.legitimations.len(),
            "built request for attestation"
        );

        Ok(RequestForAttestation {
            claim: self.claim,
            claim_nonce_map: tree.nonce_map,
            claim_hashes: tree.claim_hashes,
            claimer_signature,
            root_hash,
            legitimations: self.legitimations,
            delegation_id: self.delegation_id,
        })
    }
}

impl RequestForAttestation {
    /// Build a request with OS-random salts, no legitimations and no delegation
    pub fn from_claim(claim: Claim, identity: &Identity) -> Result<Self> {
        RequestBuilder::new(claim).build(identity, &mut OsSaltSource)
    }

    /// Remove properties from the disclosed claim.
    ///
    /// Every name is checked before anything is removed, so an unknown name
    /// leaves the request unchanged.
    pub fn remove_claim_properties<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: BTreeSet<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();

        for name in &names {
            if !self.claim.contents.contains_key(name) {
                return Err(RequestError::UnknownProperty(name.clone()));
            }
            if !self.claim_nonce_map.properties.contains_key(name) {
                return Err(RequestError::MissingNonce(name.clone()));
            }
        }

        for name in &names {
            self.claim.contents.remove(name);
            if let Some(entry) = self.claim_nonce_map.properties.remove(name) {
                self.claim_nonce_map.redacted.insert(entry.hash);
            }
        }

        debug!(root_hash = %self.root_hash, removed = names.len(), "redacted claim properties");
        Ok(())
    }

    /// Remove the owner from the disclosed claim
    pub fn remove_claim_owner(&mut self) {
        if let Some(entry) = self.claim_nonce_map.owner.take() {
            self.claim_nonce_map.redacted.insert(entry.hash);
            debug!(root_hash = %self.root_hash, "redacted claim owner");
        }
        self.claim.owner = None;
    }

    /// Root hashes of the legitimations, in stored order
    pub fn legitimation_root_hashes(&self) -> Vec<Digest> {
        self.legitimations.iter().map(|l| l.request.root_hash).collect()
    }

    /// Root hash recomputed from the stored claim hashes
    pub fn recompute_root_hash(&self) -> Digest {
        compute_root_hash(
            &self.claim.ctype_hash,
            &self.claim_hashes,
            &self.legitimation_root_hashes(),
            self.delegation_id.as_ref(),
        )
    }

    /// Verify the request.
    ///
    /// Malformed requests are an `Err`; a well-formed request whose
    /// commitments or signature do not check out is `Ok(false)`.
    pub fn verify_data(&self) -> Result<bool> {
        match self.check() {
            Ok(()) => Ok(true),
            Err(e) if e.is_structural() => Err(e),
            Err(e) => {
                debug!(root_hash = %self.root_hash, error = %e, "request failed verification");
                Ok(false)
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.verify_data(), Ok(true))
    }

    /// Verify the request, reporting the first failure as an error
    pub fn validate(&self) -> Result<()> {
        self.check()
    }

    fn check(&self) -> Result<()> {
        let map = &self.claim_nonce_map;
        let mut covered = BTreeSet::new();

        match (&self.claim.owner, &map.owner) {
            (Some(owner), Some(entry)) => {
                self.check_unit("owner", entry, &owner_unit(owner), &mut covered)?
            }
            (Some(_), None) => return Err(RequestError::MissingNonce("owner".into())),
            (None, Some(_)) => return Err(RequestError::OrphanNonce("owner".into())),
            (None, None) => {}
        }

        if let Some(name) = map.properties.keys().find(|n| !self.claim.contents.contains_key(*n)) {
            return Err(RequestError::OrphanNonce(name.clone()));
        }
        for (name, value) in &self.claim.contents {
            let entry = map
                .properties
                .get(name)
                .ok_or_else(|| RequestError::MissingNonce(name.clone()))?;
            self.check_unit(name, entry, &property_unit(name, value), &mut covered)?;
        }

        for digest in &map.redacted {
            if !self.claim_hashes.contains(digest) {
                return Err(RequestError::UnknownRedaction(*digest));
            }
            if !covered.insert(*digest) {
                return Err(RequestError::DuplicateCoverage(*digest));
            }
        }

        if let Some(uncovered) = self.claim_hashes.difference(&covered).next() {
            return Err(RequestError::UncoveredHash(*uncovered));
        }

        let computed = self.recompute_root_hash();
        if computed != self.root_hash {
            return Err(RequestError::RootHashMismatch {
                stored: self.root_hash,
                computed,
            });
        }

        if !self.claimer_signature.verify(&self.root_hash) {
            return Err(RequestError::InvalidSignature);
        }
        if let Some(owner) = &self.claim.owner {
            let signer = self.claimer_signature.signer();
            if &signer != owner {
                return Err(RequestError::SignerMismatch {
                    owner: owner.clone(),
                    signer,
                });
            }
        }

        for (index, legitimation) in self.legitimations.iter().enumerate() {
            legitimation
                .validate()
                .map_err(|e| RequestError::InvalidLegitimation {
                    index,
                    reason: e.to_string(),
                })?;
        }

        Ok(())
    }

    fn check_unit(
        &self,
        label: &str,
        entry: &NonceEntry,
        unit: &[u8],
        covered: &mut BTreeSet<Digest>,
    ) -> Result<()> {
        if entry.recompute(unit) != entry.hash {
            return Err(RequestError::HashMismatch(label.to_string()));
        }
        if !self.claim_hashes.contains(&entry.hash) {
            return Err(RequestError::UncommittedHash(label.to_string()));
        }
        if !covered.insert(entry.hash) {
            return Err(RequestError::DuplicateCoverage(entry.hash));
        }
        Ok(())
    }

    /// Encode as `[claim, claim_nonce_map, claimer_signature, claim_hashes,
    /// root_hash, legitimations, delegation_id]`
    pub fn compress(&self) -> std::result::Result<Value, TesseraError> {
        let legitimations = self
            .legitimations
            .iter()
            .map(AttestedClaim::compress)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Value::Array(vec![
            self.claim.compress()?,
            serde_json::to_value(&self.claim_nonce_map)?,
            serde_json::to_value(&self.claimer_signature)?,
            serde_json::to_value(&self.claim_hashes)?,
            serde_json::to_value(self.root_hash)?,
            Value::Array(legitimations),
            serde_json::to_value(self.delegation_id)?,
        ]))
    }

    /// Decode the positional encoding produced by [`Self::compress`]
    pub fn decompress(value: &Value) -> std::result::Result<Self, TesseraError> {
        let items = expect_array(value, "request", COMPRESSED_REQUEST_ARITY)?;

        let legitimations = match &items[5] {
            Value::Array(entries) => entries
                .iter()
                .map(AttestedClaim::decompress)
                .collect::<std::result::Result<Vec<_>, _>>()?,
            _ => {
                return Err(TesseraError::Structural(
                    "request legitimations must be an array".into(),
                ))
            }
        };

        Ok(Self {
            claim: Claim::decompress(&items[0])?,
            claim_nonce_map: field(items, 1, "request")?,
            claimer_signature: field(items, 2, "request")?,
            claim_hashes: field(items, 3, "request")?,
            root_hash: field(items, 4, "request")?,
            legitimations,
            delegation_id: field(items, 6, "request")?,
        })
    }
}
