//! Domain event abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope fields stamped on every event when the aggregate raises it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name, e.g. `branching.branch_split`.
    pub event_type: String,
    /// Aggregate this event belongs to.
    pub aggregate_id: Uuid,
    /// Position of the event in its aggregate's history, starting at 1 and
    /// gapless across snapshot restores.
    pub sequence_number: i64,
    /// Correlation ID of the command that raised the event.
    pub correlation_id: Uuid,
    /// Causation ID. Branch events are always caused directly by a command,
    /// so this equals `correlation_id`.
    pub causation_id: Uuid,
    /// Timestamp taken from the injected [`crate::clock::Clock`].
    pub occurred_at: DateTime<Utc>,
}

/// A fact recorded by an aggregate. Payloads are self-contained, so applying
/// one needs no graph lookups.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name, matching `metadata().event_type`.
    fn event_type(&self) -> &'static str;

    /// Serializes the payload (without metadata) to JSON, in snake_case.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}
