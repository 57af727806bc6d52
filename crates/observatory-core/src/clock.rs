//! Clock seam used to stamp domain events.

use chrono::{DateTime, Utc};

/// Source of `occurred_at` for event metadata. Handlers take it as a
/// parameter; the API holds one in its state.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock used by the server binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
