//! Shared test doubles and fixtures for the Quantum Choice Observatory.

mod clock;
mod fixtures;
mod rng;

pub use clock::FixedClock;
pub use fixtures::{THRESHOLD_NARRATIVE, threshold_graph};
pub use rng::{MockRng, SequenceRng};
