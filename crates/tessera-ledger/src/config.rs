//! Engine configuration

use serde::{Deserialize, Serialize};

/// Policy knobs for the attestation and delegation engines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest parent chain walked before a delegation is rejected
    pub max_delegation_depth: usize,

    /// Whether delegators above an attester may revoke its attestations
    pub allow_delegator_revocation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_delegation_depth: 32,
            allow_delegator_revocation: true,
        }
    }
}
