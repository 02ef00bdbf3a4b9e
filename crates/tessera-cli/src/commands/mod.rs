//! CLI command implementations

pub mod demo;
pub mod keygen;
pub mod request;
pub mod status;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;

pub(crate) fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let content = fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path))
}

pub(crate) fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).with_context(|| format!("failed to write {}", path))
}
