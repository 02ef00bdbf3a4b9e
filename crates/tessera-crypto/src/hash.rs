//! Hash functions for Tessera
//!
//! SHA3-256 backs every content commitment. Addresses are derived from
//! public keys with BLAKE3.

use sha3::{Digest as _, Sha3_256};
use tessera_core::{Address, Digest, Salt};

/// Compute SHA3-256 hash
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute SHA3-256 hash of multiple byte slices
pub fn sha3_256_multi(data: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    for d in data {
        hasher.update(d);
    }
    hasher.finalize().into()
}

/// Hash bytes into a [`Digest`]
pub fn hash(data: &[u8]) -> Digest {
    Digest::from_bytes(sha3_256(data))
}

/// Hash several byte slices, in order, into a [`Digest`]
pub fn hash_multi(data: &[&[u8]]) -> Digest {
    Digest::from_bytes(sha3_256_multi(data))
}

/// Salted commitment: `H(salt || payload)`
pub fn salted_hash(salt: &Salt, payload: &[u8]) -> Digest {
    hash_multi(&[&salt.as_bytes()[..], payload])
}

/// Derive the account address of a public key
pub fn address_from_public_key(public_key: &[u8]) -> Address {
    let digest = blake3::hash(public_key);
    Address::new(format!("0x{}", hex::encode(digest.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha3_256() {
        let hash = sha3_256(b"hello");
        assert_eq!(hash.len(), 32);
        assert_eq!(
            hex::encode(hash),
            "3338be694f50c5f338814986cdf0686453a888b84f424d792af4b9202398f392"
        );
    }

    #[test]
    fn test_multi_matches_concatenation() {
        assert_eq!(sha3_256_multi(&[&b"hel"[..], &b"lo"[..]]), sha3_256(b"hello"));
        assert_eq!(hash_multi(&[&b"a"[..], &b"b"[..]]), hash(b"ab"));
    }

    #[test]
    fn test_salted_hash_depends_on_salt() {
        let a = salted_hash(&Salt::from_bytes([1u8; 32]), b"value");
        let b = salted_hash(&Salt::from_bytes([2u8; 32]), b"value");
        assert_ne!(a, b);
    }

    #[test]
    fn test_address_derivation() {
        let a = address_from_public_key(b"key-a");
        let b = address_from_public_key(b"key-b");
        assert_ne!(a, b);
        assert_eq!(a, address_from_public_key(b"key-a"));
        assert!(a.as_str().starts_with("0x"));
        assert_eq!(a.as_str().len(), 66);
    }
}
