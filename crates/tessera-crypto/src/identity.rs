//! Signing identities
//!
//! An identity is a Dilithium keypair together with the address derived
//! from its public key. Signatures that must be checkable without a key
//! lookup travel as a [`SignatureEnvelope`] carrying the signer's public key.

use serde::{Deserialize, Serialize};
use tessera_core::{Address, Digest};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::signature::{DilithiumError, DilithiumKeypair, DilithiumPublicKey, DilithiumSecretKey, DilithiumSignature};

/// A signing identity
pub struct Identity {
    keypair: DilithiumKeypair,
    address: Address,
}

impl Identity {
    /// Generate a fresh identity
    pub fn generate() -> Self {
        Self::from_keypair(DilithiumKeypair::generate())
    }

    pub fn from_keypair(keypair: DilithiumKeypair) -> Self {
        let address = keypair.public_key.address();
        Self { keypair, address }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn public_key(&self) -> &DilithiumPublicKey {
        &self.keypair.public_key
    }

    /// Sign arbitrary bytes
    pub fn sign(&self, message: &[u8]) -> Result<DilithiumSignature, DilithiumError> {
        self.keypair.sign(message)
    }

    /// Sign a digest and bundle the signature with this identity's public key
    pub fn sign_digest(&self, digest: &Digest) -> Result<SignatureEnvelope, DilithiumError> {
        Ok(SignatureEnvelope {
            public_key: self.keypair.public_key.clone(),
            signature: self.keypair.sign(digest.as_bytes())?,
        })
    }

    /// Export key material (for the CLI identity file)
    pub fn export(&self) -> ExportedIdentity {
        ExportedIdentity {
            address: self.address.clone(),
            public_key: hex::encode(self.keypair.public_key.as_bytes()),
            secret_key: hex::encode(self.keypair.secret_key.as_bytes()),
        }
    }

    /// Rebuild an identity from exported key material
    pub fn import(exported: &ExportedIdentity) -> Result<Self, DilithiumError> {
        let pk_bytes =
            hex::decode(&exported.public_key).map_err(|_| DilithiumError::InvalidPublicKey)?;
        let sk_bytes =
            hex::decode(&exported.secret_key).map_err(|_| DilithiumError::InvalidSecretKey)?;

        let keypair = DilithiumKeypair {
            public_key: DilithiumPublicKey::from_bytes(&pk_bytes)?,
            secret_key: DilithiumSecretKey::from_bytes(&sk_bytes)?,
        };
        let identity = Self::from_keypair(keypair);

        if identity.address != exported.address {
            return Err(DilithiumError::InvalidPublicKey);
        }
        Ok(identity)
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Hex-encoded key material of an identity
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ExportedIdentity {
    #[zeroize(skip)]
    pub address: Address,
    pub public_key: String,
    pub secret_key: String,
}

/// A signature over a digest, with the public key that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEnvelope {
    pub public_key: DilithiumPublicKey,
    pub signature: DilithiumSignature,
}

impl SignatureEnvelope {
    /// Address of the signer
    pub fn signer(&self) -> Address {
        self.public_key.address()
    }

    /// True when the signature covers `digest`
    pub fn verify(&self, digest: &Digest) -> bool {
        self.public_key.is_valid(digest.as_bytes(), &self.signature)
    }

    /// True when the signature covers `digest` and was produced by `address`
    pub fn verify_for(&self, digest: &Digest, address: &Address) -> bool {
        &self.signer() == address && self.verify(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_address_matches_key() {
        let identity = Identity::generate();
        assert_eq!(identity.address(), &identity.public_key().address());
    }

    #[test]
    fn test_sign_digest_envelope() {
        let identity = Identity::generate();
        let digest = Digest::from_bytes([5u8; 32]);

        let envelope = identity.sign_digest(&digest).unwrap();
        assert!(envelope.verify(&digest));
        assert!(envelope.verify_for(&digest, identity.address()));
        assert!(!envelope.verify(&Digest::from_bytes([6u8; 32])));
    }

    #[test]
    fn test_envelope_with_foreign_address() {
        let alice = Identity::generate();
        let mallory = Identity::generate();
        let digest = Digest::from_bytes([5u8; 32]);

        let envelope = mallory.sign_digest(&digest).unwrap();
        assert!(!envelope.verify_for(&digest, alice.address()));
    }

    #[test]
    fn test_export_import() {
        let identity = Identity::generate();
        let exported = identity.export();
        let restored = Identity::import(&exported).unwrap();
        assert_eq!(restored.address(), identity.address());

        let digest = Digest::from_bytes([1u8; 32]);
        let envelope = restored.sign_digest(&digest).unwrap();
        assert!(envelope.verify_for(&digest, identity.address()));
    }

    #[test]
    fn test_import_rejects_mismatched_address() {
        let identity = Identity::generate();
        let mut exported = identity.export();
        exported.address = Address::new("0xsomeone-else");
        assert!(Identity::import(&exported).is_err());
    }
}
