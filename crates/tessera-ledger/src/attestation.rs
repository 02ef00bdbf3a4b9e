//! Attestation state
//!
//! Attesters anchor the root hash of a verified request on the ledger.
//! Verifiers then check that the anchored attestation exists, names the
//! expected attester and has not been revoked.

use tessera_core::{Address, Attestation, Digest};
use tessera_request::{AttestedClaim, RequestError, RequestForAttestation};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::delegation;
use crate::error::{AttestationError, DelegationError, LedgerError, Result};
use crate::oracle::{Ledger, RevokeOutcome, TxReceipt};

/// Attestation of `request` by `attester`, not yet stored
pub fn from_request(request: &RequestForAttestation, attester: &Address) -> Attestation {
    Attestation::new(
        request.root_hash,
        request.claim.ctype_hash,
        attester.clone(),
        request.delegation_id,
    )
}

/// Look up the attestation of a claim hash
pub async fn query(ledger: &dyn Ledger, claim_hash: &Digest) -> std::result::Result<Option<Attestation>, LedgerError> {
    ledger.query_attestation(claim_hash).await
}

/// Store an attestation on behalf of `attester`.
///
/// Rejects an attester other than the attestation owner, a claim hash that
/// is already attested, and a delegation under which the attester may not
/// attest this cType. The attestation is taken as given: [`attest`] pairs it
/// with its request before storing, and verifiers check the pairing again.
pub async fn store(
    ledger: &dyn Ledger,
    attestation: &Attestation,
    attester: &Address,
    config: &EngineConfig,
) -> Result<TxReceipt> {
    if &attestation.owner != attester {
        warn!(claim_hash = %attestation.claim_hash, attester = %attester, "attester does not own attestation");
        return Err(AttestationError::NotAuthorized(attester.clone()));
    }

    if ledger.query_attestation(&attestation.claim_hash).await?.is_some() {
        return Err(AttestationError::AlreadyAttested(attestation.claim_hash));
    }

    if let Some(delegation_id) = &attestation.delegation_id {
        delegation::validate_attestation_delegation(
            ledger,
            delegation_id,
            attester,
            Some(&attestation.ctype_hash),
            config,
        )
        .await
        .map_err(|e| {
            warn!(claim_hash = %attestation.claim_hash, delegation = %delegation_id, error = %e, "delegation denied");
            AttestationError::DelegationDenied(e)
        })?;
    }

    let receipt = ledger
        .store_attestation(attestation, attester)
        .await
        .map_err(|e| match e {
            LedgerError::AlreadyExists(hash) => AttestationError::AlreadyAttested(hash),
            other => AttestationError::Ledger(other),
        })?;

    info!(
        claim_hash = %attestation.claim_hash,
        attester = %attester,
        sequence = receipt.sequence,
        "stored attestation"
    );
    Ok(receipt)
}

/// Verify `request`, then attest and store it.
///
/// Returns the attested claim the attester hands back to the claimer.
pub async fn attest(
    ledger: &dyn Ledger,
    request: &RequestForAttestation,
    attester: &Address,
    config: &EngineConfig,
) -> Result<AttestedClaim> {
    request.validate()?;
    let attested = AttestedClaim::new(request.clone(), from_request(request, attester))?;
    store(ledger, &attested.attestation, attester, config).await?;
    Ok(attested)
}

/// Revoke the attestation of `claim_hash`.
///
/// The attestation owner may always revoke. When
/// `allow_delegator_revocation` is set, the delegation root owner and any
/// active ancestor holding DELEGATE above the attestation's delegation node
/// may revoke as well.
pub async fn revoke(
    ledger: &dyn Ledger,
    claim_hash: &Digest,
    revoker: &Address,
    config: &EngineConfig,
) -> Result<RevokeOutcome> {
    let attestation = ledger
        .query_attestation(claim_hash)
        .await?
        .ok_or(AttestationError::NotFound(*claim_hash))?;

    if !may_revoke(ledger, &attestation, revoker, config).await {
        warn!(claim_hash = %claim_hash, revoker = %revoker, "unauthorized attestation revocation");
        return Err(AttestationError::NotAuthorized(revoker.clone()));
    }

    if attestation.revoked {
        debug!(claim_hash = %claim_hash, "attestation already revoked");
        return Ok(RevokeOutcome::AlreadyRevoked);
    }

    let receipt = ledger.revoke_attestation(claim_hash, revoker).await?;
    info!(claim_hash = %claim_hash, revoker = %revoker, "revoked attestation");
    Ok(RevokeOutcome::Revoked(receipt))
}

async fn may_revoke(
    ledger: &dyn Ledger,
    attestation: &Attestation,
    revoker: &Address,
    config: &EngineConfig,
) -> bool {
    if &attestation.owner == revoker {
        return true;
    }
    let Some(delegation_id) = &attestation.delegation_id else {
        return false;
    };
    if !config.allow_delegator_revocation {
        return false;
    }

    match delegation::is_delegator_of(ledger, delegation_id, revoker, config).await {
        Ok(authorized) => authorized,
        Err(e) => {
            debug!(delegation = %delegation_id, error = %e, "could not resolve delegation for revocation");
            false
        }
    }
}

/// Check that `claim_hash` is attested by `expected_owner` and not revoked
pub async fn validate(
    ledger: &dyn Ledger,
    claim_hash: &Digest,
    expected_owner: &Address,
) -> Result<Attestation> {
    let attestation = ledger
        .query_attestation(claim_hash)
        .await?
        .ok_or(AttestationError::NotFound(*claim_hash))?;

    if &attestation.owner != expected_owner {
        return Err(AttestationError::OwnerMismatch {
            expected: expected_owner.clone(),
            actual: attestation.owner,
        });
    }
    if attestation.revoked {
        return Err(AttestationError::Revoked(*claim_hash));
    }
    Ok(attestation)
}

/// Predicate form of [`validate`]; absent entries and oracle failures are `false`
pub async fn verify(ledger: &dyn Ledger, claim_hash: &Digest, expected_owner: &Address) -> bool {
    match ledger.query_attestation(claim_hash).await {
        Ok(Some(attestation)) => attestation.is_held_by(expected_owner),
        Ok(None) => {
            debug!(claim_hash = %claim_hash, "attestation not found");
            false
        }
        Err(e) => {
            warn!(claim_hash = %claim_hash, error = %e, "ledger failure during attestation check");
            false
        }
    }
}

/// Check an attested claim against its own data and against the ledger.
///
/// An attestation made under a delegation stays valid only while the
/// attester may still attest under that node: a revoked node, ancestor or
/// root invalidates every claim attested beneath it.
pub async fn validate_attested_claim(
    ledger: &dyn Ledger,
    attested: &AttestedClaim,
    config: &EngineConfig,
) -> Result<()> {
    attested.validate()?;

    let on_ledger = validate(ledger, &attested.attestation.claim_hash, &attested.attestation.owner).await?;
    if on_ledger.ctype_hash != attested.attestation.ctype_hash
        || on_ledger.delegation_id != attested.attestation.delegation_id
    {
        return Err(AttestationError::Request(RequestError::AttestationMismatch(
            "presented attestation differs from the ledger".into(),
        )));
    }

    if let Some(delegation_id) = &on_ledger.delegation_id {
        delegation::validate_attestation_delegation(
            ledger,
            delegation_id,
            &on_ledger.owner,
            Some(&on_ledger.ctype_hash),
            config,
        )
        .await?;
    }
    Ok(())
}

/// Predicate form of [`validate_attested_claim`]
pub async fn verify_attested_claim(
    ledger: &dyn Ledger,
    attested: &AttestedClaim,
    config: &EngineConfig,
) -> bool {
    match validate_attested_claim(ledger, attested, config).await {
        Ok(()) => true,
        Err(AttestationError::Ledger(e))
        | Err(AttestationError::DelegationDenied(DelegationError::Ledger(e))) => {
            warn!(claim_hash = %attested.attestation.claim_hash, error = %e, "ledger failure during attested claim check");
            false
        }
        Err(e) => {
            debug!(claim_hash = %attested.attestation.claim_hash, error = %e, "attested claim rejected");
            false
        }
    }
}
