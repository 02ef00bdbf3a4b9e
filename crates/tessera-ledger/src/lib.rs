//! Tessera Ledger
//!
//! Attestation state and delegation chains, checked against a ledger oracle.
//! Engines take the oracle as a parameter; [`InMemoryLedger`] backs tests,
//! the CLI demo and local development.

pub mod attestation;
pub mod config;
pub mod delegation;
pub mod error;
pub mod memory;
pub mod oracle;

pub use config::EngineConfig;
pub use delegation::{
    is_valid_attestation_delegation, validate_attestation_delegation, DelegationChain,
};
pub use error::{AttestationError, DelegationError, LedgerError};
pub use memory::InMemoryLedger;
pub use oracle::{Ledger, RevokeOutcome, TxReceipt};
