//! Identity generation

use anyhow::Result;
use console::style;
use tessera_crypto::Identity;

use super::write_json;

/// Generate a Dilithium identity and write it to `output`
pub fn run(output: &str) -> Result<()> {
    println!("\n{}", style("Generating Identity").bold().underlined());
    println!();

    let identity = Identity::generate();
    write_json(output, &identity.export())?;

    println!("{}", style("✓ Identity generated").green().bold());
    println!("  Address:   {}", style(identity.address()).yellow());
    println!("  Algorithm: Dilithium3 (NIST ML-DSA)");
    println!("  File:      {}", output);
    println!();
    println!(
        "{}",
        style("Note: the file holds the secret key. Keep it private.").dim()
    );

    Ok(())
}
