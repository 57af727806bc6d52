//! Aggregate root abstraction.
//!
//! The branch store is the only aggregate in the workspace: every branch,
//! path and label lives inside one consistency boundary so a split can copy
//! a path and take the next label atomically.

use uuid::Uuid;

use crate::event::DomainEvent;

/// An event-sourced aggregate.
///
/// Commands validate against current state, then raise events; state changes
/// only inside [`AggregateRoot::apply`], so replaying the raised events onto
/// an empty aggregate rebuilds the same state.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate raises and applies.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the number of events applied so far. Restoring a snapshot is
    /// itself an event, so the version never resets.
    fn version(&self) -> i64;

    /// Folds one event into the aggregate state. Must not fail or consult
    /// anything outside the event payload.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events raised since the last drain, oldest first.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Forgets raised events once a command handler has returned them to
    /// its caller.
    fn clear_uncommitted_events(&mut self);
}
