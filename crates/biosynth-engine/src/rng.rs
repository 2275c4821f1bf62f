//! Seeded randomness. Every simulated value is derived from the configured
//! seed plus the inputs it depends on, so identical requests reproduce.

use rand::rngs::StdRng;
use rand::SeedableRng;
use sha2::{Digest, Sha256};

/// SHA-256 over the seed and each part (length-prefixed).
pub fn digest(seed: u64, parts: &[&str]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hasher.finalize().into()
}

pub fn seeded_rng(seed: u64, parts: &[&str]) -> StdRng {
    StdRng::from_seed(digest(seed, parts))
}

/// Map eight digest bytes to a fraction in `[0, 1)`.
pub fn unit_fraction(bytes: &[u8]) -> f64 {
    let mut buf = [0u8; 8];
    let n = bytes.len().min(8);
    buf[..n].copy_from_slice(&bytes[..n]);
    (u64::from_le_bytes(buf) >> 11) as f64 / (1u64 << 53) as f64
}
