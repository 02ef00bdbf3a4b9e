//! Tessera Request
//!
//! Claimer-side construction and verifier-side checking of requests for
//! attestation: the salted claim hash tree, selective disclosure, request
//! verification and attested claims.

pub mod attested;
pub mod error;
pub mod hash_tree;
pub mod request;

pub use attested::{AttestedClaim, COMPRESSED_ATTESTED_CLAIM_ARITY};
pub use error::RequestError;
pub use hash_tree::{compute_root_hash, ClaimHashTree, ClaimNonceMap, NonceEntry};
pub use request::{RequestBuilder, RequestForAttestation, COMPRESSED_REQUEST_ARITY};
