//! Engine configuration loading
//!
//! Sources, lowest precedence first: built-in defaults, the optional config
//! file, then `TESSERA_*` environment variables (after `.env` is loaded).

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use tessera_ledger::EngineConfig;

pub fn load(path: &str) -> Result<EngineConfig> {
    let defaults = EngineConfig::default();

    let config = Config::builder()
        .set_default("max_delegation_depth", defaults.max_delegation_depth as u64)?
        .set_default("allow_delegator_revocation", defaults.allow_delegator_revocation)?
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("TESSERA")
                .try_parsing(true)
                .ignore_empty(true),
        )
        .build()
        .with_context(|| format!("failed to load configuration from {}", path))?;

    config
        .try_deserialize::<EngineConfig>()
        .context("invalid engine configuration")
}
