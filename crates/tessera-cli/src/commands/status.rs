//! Status command - show configuration and status

use anyhow::Result;
use console::style;
use tessera_ledger::EngineConfig;

pub fn show(config_path: &str, config: &EngineConfig) -> Result<()> {
    println!(
        "\n{}",
        style("╔════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║   Tessera Status                       ║").cyan()
    );
    println!(
        "{}",
        style("╚════════════════════════════════════════╝").cyan()
    );
    println!();

    // Version info
    println!("{}", style("Version").bold().underlined());
    println!("  tessera-cli:     {}", env!("CARGO_PKG_VERSION"));
    println!();

    // Engine configuration
    println!("{}", style("Engine").bold().underlined());
    println!("  Config file:     {} (optional)", config_path);
    println!("  Max delegation depth:       {}", config.max_delegation_depth);
    println!(
        "  Delegator revocation:       {}",
        if config.allow_delegator_revocation {
            style("allowed").green()
        } else {
            style("owner only").yellow()
        }
    );
    println!();

    // Cryptography
    println!("{}", style("Cryptography").bold().underlined());
    println!("  Signatures:      Dilithium3 (NIST ML-DSA)");
    println!("  Commitments:     SHA3-256 over salted canonical JSON");
    println!("  Addresses:       BLAKE3 of the public key");
    println!();

    // Quick help
    println!("{}", style("Quick Start").bold().underlined());
    println!("  New identity:    tessera keygen -o me.json");
    println!("  Build request:   tessera request build -i me.json -c claim.json -o request.json");
    println!("  Redact:          tessera request redact -i request.json -p salary --owner -o shared.json");
    println!("  Verify:          tessera request verify -i shared.json");
    println!("  Full flow:       tessera demo");

    Ok(())
}
