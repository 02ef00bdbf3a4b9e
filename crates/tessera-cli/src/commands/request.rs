//! Request for attestation commands

use anyhow::{bail, Context, Result};
use base64::Engine;
use console::style;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use tessera_core::{Claim, Digest};
use tessera_crypto::{ExportedIdentity, Identity, OsSaltSource, SaltSource, SeededSaltSource};
use tessera_request::{RequestBuilder, RequestForAttestation};

use super::{read_json, write_json};

/// Claim input file
#[derive(Deserialize)]
struct ClaimFile {
    ctype_hash: Digest,
    contents: Value,
}

/// Build and sign a request
pub fn build(identity_file: &str, claim_file: &str, output: &str, seed: Option<u64>) -> Result<()> {
    println!("\n{}", style("Building Request for Attestation").bold().underlined());
    println!();

    let exported: ExportedIdentity = read_json(identity_file)?;
    let identity = Identity::import(&exported).context("invalid identity file")?;
    let input: ClaimFile = read_json(claim_file)?;
    let claim = Claim::from_json(input.ctype_hash, identity.address().clone(), input.contents)?;

    let mut salts: Box<dyn SaltSource> = match seed {
        Some(seed) => {
            println!(
                "{}",
                style("⚠ Using seeded salts: disclosed values may be guessable").yellow()
            );
            Box::new(SeededSaltSource::new(seed))
        }
        None => Box::new(OsSaltSource),
    };
    let request = RequestBuilder::new(claim).build(&identity, salts.as_mut())?;
    write_json(output, &request)?;

    println!("{}", style("✓ Request built and signed").green().bold());
    println!("  Owner:       {}", style(identity.address()).yellow());
    println!("  Root hash:   {}", style(request.root_hash).cyan());
    println!("  Properties:  {}", request.claim.contents.len());
    println!("  Output:      {}", output);

    Ok(())
}

/// Remove properties (and optionally the owner) from a request
pub fn redact(input: &str, properties: &[String], owner: bool, output: &str) -> Result<()> {
    println!("\n{}", style("Redacting Request").bold().underlined());
    println!();

    if properties.is_empty() && !owner {
        bail!("nothing to redact: pass --properties and/or --owner");
    }

    let mut request: RequestForAttestation = read_json(input)?;
    request.remove_claim_properties(properties)?;
    if owner {
        request.remove_claim_owner();
    }
    write_json(output, &request)?;

    println!("{}", style("✓ Request redacted").green().bold());
    for name in properties {
        println!("  Removed:     {}", style(name).dim());
    }
    if owner {
        println!("  Removed:     {}", style("owner").dim());
    }
    println!(
        "  Disclosed:   {}",
        request.claim.property_names().collect::<Vec<_>>().join(", ")
    );
    println!("  Root hash:   {} (unchanged)", request.root_hash);
    println!("  Output:      {}", output);

    Ok(())
}

/// Verify a request
pub fn verify(input: &str) -> Result<()> {
    println!("\n{}", style("Verifying Request").bold().underlined());
    println!();

    let request: RequestForAttestation = read_json(input)?;

    println!("  File:        {}", input);
    println!("  Root hash:   {}", style(request.root_hash).cyan());
    println!(
        "  Owner:       {}",
        match &request.claim.owner {
            Some(owner) => style(owner.to_string()).yellow(),
            None => style("redacted".to_string()).dim(),
        }
    );
    println!("  Signer:      {}", request.claimer_signature.signer());
    println!(
        "  Disclosed:   {} of {} units",
        request.claim_nonce_map.live_entries(),
        request.claim_hashes.len()
    );
    println!("  Legitimations: {}", request.legitimations.len());
    println!();

    match request.validate() {
        Ok(()) => {
            println!("{}", style("✓ Request is valid").green().bold());
            Ok(())
        }
        Err(e) if e.is_structural() => {
            println!("{}", style("✗ Request is malformed").red().bold());
            println!("  Reason: {}", e);
            bail!("malformed request")
        }
        Err(e) => {
            println!("{}", style("✗ Request failed verification").red().bold());
            println!("  Reason: {}", e);
            bail!("invalid request")
        }
    }
}

/// Encode a request as base64 of its compact positional form
pub fn compress(input: &str, output: Option<&str>) -> Result<()> {
    let request: RequestForAttestation = read_json(input)?;
    let compressed = request.compress()?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(serde_json::to_vec(&compressed)?);

    match output {
        Some(path) => {
            fs::write(path, &encoded).with_context(|| format!("failed to write {}", path))?;
            println!("{}", style("✓ Request compressed").green().bold());
            println!("  Size:        {} bytes", encoded.len());
            println!("  Output:      {}", path);
        }
        None => println!("{}", encoded),
    }

    Ok(())
}

/// Decode a base64 compact request back to JSON
pub fn decompress(input: &str, output: &str) -> Result<()> {
    let content = fs::read_to_string(input).with_context(|| format!("failed to read {}", input))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(content.trim())
        .context("invalid base64 encoding")?;
    let value: Value = serde_json::from_slice(&bytes)?;
    let request = RequestForAttestation::decompress(&value)?;
    write_json(output, &request)?;

    println!("{}", style("✓ Request decompressed").green().bold());
    println!("  Root hash:   {}", style(request.root_hash).cyan());
    println!("  Output:      {}", output);

    Ok(())
}
