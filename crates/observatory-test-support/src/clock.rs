//! Test clock: pins event timestamps.

use chrono::{DateTime, Utc};
use observatory_core::clock::Clock;

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
