//! Test RNGs: scripted `DeterministicRng` implementations.

use observatory_core::rng::DeterministicRng;

/// Always returns `min` and `0.0`. Every UUID it yields is the same, which
/// makes it useful for exercising identifier collisions.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// Replays a fixed list of values, wrapping around at the end. Four values
/// make one UUID, so a list of `4 * n` values yields `n` distinct UUIDs
/// before repeating.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        assert!(!values.is_empty(), "SequenceRng needs at least one value");
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let value = self.values[self.index % self.values.len()];
        self.index += 1;
        value.clamp(min, max)
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}
