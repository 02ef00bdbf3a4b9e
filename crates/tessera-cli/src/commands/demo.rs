//! End-to-end demo against an in-memory ledger

use anyhow::{bail, Result};
use console::style;
use serde_json::json;
use tessera_core::{Claim, DelegationNode, DelegationRootNode, Permissions};
use tessera_crypto::{decrypt_value, encrypt_value, generate_key, hash, Identity, OsSaltSource};
use tessera_ledger::{attestation, delegation, EngineConfig, InMemoryLedger};
use tessera_request::{RequestBuilder, RequestForAttestation};

fn step(n: usize, title: &str) {
    println!();
    println!("{} {}", style(format!("[{}]", n)).cyan().bold(), style(title).bold());
}

fn check(label: &str, ok: bool) {
    if ok {
        println!("  {} {}", style("✓").green(), label);
    } else {
        println!("  {} {}", style("✗").red(), label);
    }
}

/// Claimer -> attester -> verifier, with delegation, redaction and revocation
pub async fn run(config: &EngineConfig) -> Result<()> {
    println!("\n{}", style("Tessera Demo").bold().underlined());

    let ledger = InMemoryLedger::new();
    let authority = Identity::generate();
    let attester = Identity::generate();
    let claimer = Identity::generate();
    let ctype_hash = hash(b"{\"title\":\"Employee\",\"properties\":[\"name\",\"role\",\"salary\"]}");

    step(1, "Authority creates a delegation tree");
    let root = DelegationRootNode::new(ctype_hash, authority.address().clone());
    delegation::store_delegation_root(&ledger, &root, authority.address()).await?;
    let node = DelegationNode::new_node(root.id, None, attester.address().clone(), Permissions::ATTEST);
    let acceptance = attester.sign_digest(&node.authorization_hash())?;
    delegation::store_delegation_node(&ledger, &node, authority.address(), &acceptance, config).await?;
    println!("  Root:        {}", root.id);
    println!("  Attester:    {}", attester.address());
    println!(
        "  Permissions: {}",
        node.permissions
            .to_vec()
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    step(2, "Claimer builds and signs a request");
    let claim = Claim::from_json(
        ctype_hash,
        claimer.address().clone(),
        json!({"name": "Alice", "role": "engineer", "salary": 120000}),
    )?;
    let request = RequestBuilder::new(claim)
        .delegation(node.id)
        .build(&claimer, &mut OsSaltSource)?;
    check("request verifies", request.is_valid());
    println!("  Root hash:   {}", request.root_hash);

    step(3, "Claimer sends the request to the attester, encrypted");
    let session_key = generate_key();
    let sealed = encrypt_value(&session_key, &request)?;
    println!("  Ciphertext:  {} bytes", sealed.ciphertext.len());
    let received: RequestForAttestation = decrypt_value(&session_key, &sealed)?;
    check("attester decrypts the request", received == request);

    step(4, "Attester verifies and attests");
    let attested = attestation::attest(&ledger, &received, attester.address(), config).await?;
    check(
        "attestation on ledger",
        attestation::verify(&ledger, &request.root_hash, attester.address()).await,
    );

    step(5, "Claimer presents without salary and owner");
    let presentation = attested.create_presentation(["salary"], true)?;
    println!(
        "  Disclosed:   {}",
        presentation.request.claim.property_names().collect::<Vec<_>>().join(", ")
    );
    let accepted = attestation::verify_attested_claim(&ledger, &presentation, config).await;
    check("verifier accepts presentation", accepted);

    step(6, "Authority revokes the attestation");
    let outcome = attestation::revoke(&ledger, &request.root_hash, authority.address(), config).await?;
    if let Some(receipt) = outcome.receipt() {
        println!("  Tx:          {} (#{})", receipt.tx_hash, receipt.sequence);
    }
    let rejected = !attestation::verify_attested_claim(&ledger, &presentation, config).await;
    check("verifier rejects revoked presentation", rejected);

    println!();
    if !(accepted && rejected) {
        bail!("demo flow did not behave as expected");
    }
    println!("{}", style("✓ Demo complete").green().bold());
    Ok(())
}
