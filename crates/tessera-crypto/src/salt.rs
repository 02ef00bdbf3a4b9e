//! Salt sources for claim hash trees

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tessera_core::Salt;

/// Supplies one fresh salt per disclosed unit
pub trait SaltSource {
    fn next_salt(&mut self) -> Salt;
}

/// Salts drawn from the operating system RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSaltSource;

impl SaltSource for OsSaltSource {
    fn next_salt(&mut self) -> Salt {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Salt::from_bytes(bytes)
    }
}

/// Deterministic salts from a seeded ChaCha20 stream.
///
/// Only for fixtures and tests: salts must be unpredictable in production.
pub struct SeededSaltSource {
    rng: ChaCha20Rng,
}

impl SeededSaltSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl SaltSource for SeededSaltSource {
    fn next_salt(&mut self) -> Salt {
        let mut bytes = [0u8; 32];
        self.rng.fill_bytes(&mut bytes);
        Salt::from_bytes(bytes)
    }
}
