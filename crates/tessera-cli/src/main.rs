//! Tessera CLI
//!
//! Command-line interface for building, redacting and verifying requests for
//! attestation, and for running the attestation flow against a local ledger.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod settings;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(author, version, about = "Tessera: salted-hash attested claims", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "TESSERA_CONFIG", default_value = "tessera")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a signing identity
    Keygen {
        /// Output identity file
        #[arg(short, long)]
        output: String,
    },

    /// Work with requests for attestation
    Request {
        #[command(subcommand)]
        action: RequestAction,
    },

    /// Run the claimer -> attester -> verifier flow against an in-memory ledger
    Demo,

    /// Show configuration and status
    Status,
}

#[derive(Subcommand)]
enum RequestAction {
    /// Build and sign a request from a claim file
    Build {
        /// Identity file of the claimer
        #[arg(short, long)]
        identity: String,

        /// Claim file: {"ctype_hash": "0x..", "contents": {..}}
        #[arg(short, long)]
        claim: String,

        /// Output request file
        #[arg(short, long)]
        output: String,

        /// Derive salts from a fixed seed (reproducible, not for production)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Remove properties (and optionally the owner) from a request
    Redact {
        /// Request file
        #[arg(short, long)]
        input: String,

        /// Properties to remove (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        properties: Vec<String>,

        /// Also remove the owner
        #[arg(long)]
        owner: bool,

        /// Output request file
        #[arg(short, long)]
        output: String,
    },

    /// Verify a request
    Verify {
        /// Request file
        #[arg(short, long)]
        input: String,
    },

    /// Encode a request in the compact positional form (base64)
    Compress {
        /// Request file
        #[arg(short, long)]
        input: String,

        /// Output file (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Decode a compact request back to JSON
    Decompress {
        /// Compressed request file (base64)
        #[arg(short, long)]
        input: String,

        /// Output request file
        #[arg(short, long)]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tessera={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let engine_config = settings::load(&cli.config)?;

    match cli.command {
        Commands::Keygen { output } => {
            commands::keygen::run(&output)?;
        }
        Commands::Request { action } => match action {
            RequestAction::Build {
                identity,
                claim,
                output,
                seed,
            } => {
                commands::request::build(&identity, &claim, &output, seed)?;
            }
            RequestAction::Redact {
                input,
                properties,
                owner,
                output,
            } => {
                commands::request::redact(&input, &properties, owner, &output)?;
            }
            RequestAction::Verify { input } => {
                commands::request::verify(&input)?;
            }
            RequestAction::Compress { input, output } => {
                commands::request::compress(&input, output.as_deref())?;
            }
            RequestAction::Decompress { input, output } => {
                commands::request::decompress(&input, &output)?;
            }
        },
        Commands::Demo => {
            commands::demo::run(&engine_config).await?;
        }
        Commands::Status => {
            commands::status::show(&cli.config, &engine_config)?;
        }
    }

    Ok(())
}
