//! Random number generation behind a seam.
//!
//! Branch identifiers are drawn from an explicit generator rather than
//! ambient global state, so a run can be replayed from a seed and tests can
//! pin the identifiers they expect.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Generate a random `f64` in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;

    /// Generate a version 4 UUID from four draws of this generator.
    fn next_uuid(&mut self) -> Uuid {
        let mut bytes = [0_u8; 16];
        for chunk in bytes.chunks_exact_mut(4) {
            chunk.copy_from_slice(&self.next_u32_range(0, u32::MAX).to_be_bytes());
        }
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}

/// Production generator backed by `rand`'s `StdRng`.
#[derive(Debug, Clone)]
pub struct StdRngSource {
    inner: StdRng,
}

impl StdRngSource {
    /// Seeds from operating system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }

    /// Seeds from a fixed value; the same seed yields the same sequence.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl DeterministicRng for StdRngSource {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.inner.random_range(min..=max)
    }

    fn next_f64(&mut self) -> f64 {
        self.inner.random()
    }
}
