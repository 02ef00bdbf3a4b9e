//! Attested claims
//!
//! An attested claim pairs a request for attestation with the attestation
//! that anchors its root hash. It is what a claimer presents to a verifier,
//! and what another request may carry as a legitimation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessera_core::compress::expect_array;
use tessera_core::{Attestation, Digest, TesseraError};

use crate::error::{RequestError, Result};
use crate::request::RequestForAttestation;

/// Number of positional fields in a compressed attested claim
pub const COMPRESSED_ATTESTED_CLAIM_ARITY: usize = 2;

/// A request for attestation together with its attestation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttestedClaim {
    pub request: RequestForAttestation,
    pub attestation: Attestation,
}

impl AttestedClaim {
    /// Pair a request with its attestation; the two must describe the same claim
    pub fn new(request: RequestForAttestation, attestation: Attestation) -> Result<Self> {
        check_pairing(&request, &attestation)?;
        Ok(Self { request, attestation })
    }

    /// Verify the request and its pairing with the attestation.
    ///
    /// Ledger state is not consulted here.
    pub fn verify_data(&self) -> Result<bool> {
        if !self.request.verify_data()? {
            return Ok(false);
        }
        Ok(check_pairing(&self.request, &self.attestation).is_ok())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.verify_data(), Ok(true))
    }

    pub fn validate(&self) -> Result<()> {
        self.request.validate()?;
        check_pairing(&self.request, &self.attestation)
    }

    /// Derive a presentation that hides `properties` and, optionally, the owner
    pub fn create_presentation<I, S>(&self, properties: I, hide_owner: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut presentation = self.clone();
        presentation.request.remove_claim_properties(properties)?;
        if hide_owner {
            presentation.request.remove_claim_owner();
        }
        Ok(presentation)
    }

    /// Encode as `[request, attestation]`
    pub fn compress(&self) -> std::result::Result<Value, TesseraError> {
        Ok(Value::Array(vec![
            self.request.compress()?,
            self.attestation.compress()?,
        ]))
    }

    /// Decode the `[request, attestation]` encoding
    pub fn decompress(value: &Value) -> std::result::Result<Self, TesseraError> {
        let items = expect_array(value, "attested claim", COMPRESSED_ATTESTED_CLAIM_ARITY)?;
        Ok(Self {
            request: RequestForAttestation::decompress(&items[0])?,
            attestation: Attestation::decompress(&items[1])?,
        })
    }
}

fn check_pairing(request: &RequestForAttestation, attestation: &Attestation) -> Result<()> {
    if attestation.claim_hash != request.root_hash {
        return Err(RequestError::AttestationMismatch(format!(
            "attestation covers {}, request root is {}",
            attestation.claim_hash, request.root_hash
        )));
    }
    if attestation.ctype_hash != request.claim.ctype_hash {
        return Err(RequestError::AttestationMismatch(format!(
            "attestation cType {} differs from claim cType {}",
            attestation.ctype_hash, request.claim.ctype_hash
        )));
    }
    if attestation.delegation_id != request.delegation_id {
        return Err(RequestError::AttestationMismatch(format!(
            "attestation delegation {} differs from the signed request delegation {}",
            display_delegation(attestation.delegation_id.as_ref()),
            display_delegation(request.delegation_id.as_ref())
        )));
    }
    Ok(())
}

fn display_delegation(id: Option<&Digest>) -> String {
    id.map_or_else(|| "none".to_string(), Digest::to_hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestBuilder;
    use serde_json::json;
    use tessera_core::Claim;
    use tessera_crypto::{Identity, SeededSaltSource};

    fn attested_claim() -> (AttestedClaim, Identity) {
        let claimer = Identity::generate();
        let attester = Identity::generate();
        let claim = Claim::from_json(
            Digest::from_bytes([7u8; 32]),
            claimer.address().clone(),
            json!({"name": "Alice", "age": 29, "country": "CH"}),
        )
        .unwrap();
        let request = RequestBuilder::new(claim)
            .build(&claimer, &mut SeededSaltSource::new(3))
            .unwrap();
        let attestation = Attestation::new(
            request.root_hash,
            request.claim.ctype_hash,
            attester.address().clone(),
            None,
        );
        (AttestedClaim::new(request, attestation).unwrap(), attester)
    }

    #[test]
    fn test_attested_claim_valid() {
        let (attested, _) = attested_claim();
        assert!(attested.is_valid());
        assert!(attested.validate().is_ok());
    }

    #[test]
    fn test_new_rejects_foreign_attestation() {
        let (attested, attester) = attested_claim();
        let foreign = Attestation::new(
            Digest::from_bytes([1u8; 32]),
            attested.attestation.ctype_hash,
            attester.address().clone(),
            None,
        );
        assert!(matches!(
            AttestedClaim::new(attested.request.clone(), foreign),
            Err(RequestError::AttestationMismatch(_))
        ));
    }

    #[test]
    fn test_ctype_mismatch_is_invalid() {
        let (mut attested, _) = attested_claim();
        attested.attestation.ctype_hash = Digest::from_bytes([8u8; 32]);

        assert_eq!(attested.verify_data(), Ok(false));
        assert!(matches!(
            attested.validate(),
            Err(RequestError::AttestationMismatch(_))
        ));
    }

    #[test]
    fn test_delegation_mismatch_is_invalid() {
        let (attested, attester) = attested_claim();
        let mut claimed = attested.attestation.clone();
        claimed.delegation_id = Some(Digest::from_bytes([0x22; 32]));

        assert!(matches!(
            AttestedClaim::new(attested.request.clone(), claimed.clone()),
            Err(RequestError::AttestationMismatch(_))
        ));

        let swapped = AttestedClaim {
            request: attested.request.clone(),
            attestation: claimed,
        };
        assert_eq!(swapped.verify_data(), Ok(false));
        assert!(!swapped.is_valid());

        let undelegated = Attestation::new(
            attested.request.root_hash,
            attested.request.claim.ctype_hash,
            attester.address().clone(),
            None,
        );
        assert!(AttestedClaim::new(attested.request, undelegated).is_ok());
    }

    #[test]
    fn test_presentation_hides_properties_and_owner() {
        let (attested, _) = attested_claim();
        let presentation = attested.create_presentation(["age", "country"], true).unwrap();

        assert!(presentation.is_valid());
        assert!(presentation.request.claim.owner.is_none());
        assert_eq!(
            presentation.request.claim.property_names().collect::<Vec<_>>(),
            vec!["name"]
        );
        assert_eq!(presentation.attestation, attested.attestation);
        assert!(attested.request.claim.property("age").is_some());
    }

    #[test]
    fn test_presentation_rejects_unknown_property() {
        let (attested, _) = attested_claim();
        assert_eq!(
            attested.create_presentation(["height"], false).unwrap_err(),
            RequestError::UnknownProperty("height".into())
        );
    }

    #[test]
    fn test_compress_roundtrip() {
        let (attested, _) = attested_claim();
        let compressed = attested.compress().unwrap();
        assert_eq!(AttestedClaim::decompress(&compressed).unwrap(), attested);
    }

    #[test]
    fn test_decompress_rejects_wrong_arity() {
        let (attested, _) = attested_claim();
        let mut compressed = attested.compress().unwrap();
        compressed.as_array_mut().unwrap().push(json!(null));

        assert_eq!(
            AttestedClaim::decompress(&compressed).unwrap_err(),
            TesseraError::Arity {
                what: "attested claim",
                expected: 2,
                actual: 3
            }
        );
    }
}
