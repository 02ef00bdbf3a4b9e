//! Attestation records
//!
//! An attestation anchors the root hash of a request for attestation on the
//! ledger, naming the attester and optionally the delegation node that
//! authorised it. The ledger is authoritative; values here are snapshots.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compress::{expect_array, field};
use crate::digest::{Address, Digest};
use crate::error::TesseraError;

/// Number of positional fields in a compressed attestation
pub const COMPRESSED_ATTESTATION_ARITY: usize = 5;

/// An on-ledger attestation of a claim hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// Root hash of the attested request
    pub claim_hash: Digest,

    /// Hash of the claim type
    pub ctype_hash: Digest,

    /// The attester's address
    pub owner: Address,

    /// Whether the attestation has been revoked
    pub revoked: bool,

    /// Delegation node the attester acted under, if any
    pub delegation_id: Option<Digest>,
}

impl Attestation {
    pub fn new(
        claim_hash: Digest,
        ctype_hash: Digest,
        owner: Address,
        delegation_id: Option<Digest>,
    ) -> Self {
        Self {
            claim_hash,
            ctype_hash,
            owner,
            revoked: false,
            delegation_id,
        }
    }

    /// True when this snapshot is not revoked and names `expected_owner`
    pub fn is_held_by(&self, expected_owner: &Address) -> bool {
        !self.revoked && &self.owner == expected_owner
    }

    /// Encode as `[claim_hash, ctype_hash, owner, revoked, delegation_id]`
    pub fn compress(&self) -> Result<Value, TesseraError> {
        Ok(Value::Array(vec![
            serde_json::to_value(self.claim_hash)?,
            serde_json::to_value(self.ctype_hash)?,
            serde_json::to_value(&self.owner)?,
            Value::Bool(self.revoked),
            serde_json::to_value(self.delegation_id)?,
        ]))
    }

    /// Decode a compressed attestation, rejecting any other shape
    pub fn decompress(value: &Value) -> Result<Self, TesseraError> {
        let items = expect_array(value, "attestation", COMPRESSED_ATTESTATION_ARITY)?;
        Ok(Self {
            claim_hash: field(items, 0, "attestation")?,
            ctype_hash: field(items, 1, "attestation")?,
            owner: field(items, 2, "attestation")?,
            revoked: field(items, 3, "attestation")?,
            delegation_id: field(items, 4, "attestation")?,
        })
    }
}
