//! Command handlers for the Branching context.
//!
//! Each handler runs one command against the store as a single step and
//! drains the events it raised into the result. Callers serialize access to
//! the store; nothing here blocks or awaits.

use std::sync::Arc;

use observatory_core::aggregate::AggregateRoot;
use observatory_core::clock::Clock;
use observatory_core::command::Command;
use observatory_core::error::DomainError;
use observatory_core::event::DomainEvent;
use observatory_core::rng::DeterministicRng;
use observatory_narrative::domain::graph::NarrativeGraph;
use tracing::debug;
use uuid::Uuid;

use crate::domain::aggregates::BranchStore;
use crate::domain::commands::{AdvanceBranch, OpenBranchStore, RestoreSnapshot, SplitBranch};
use crate::domain::events::BranchingEvent;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct BranchCommandResult {
    /// The store the command ran against.
    pub aggregate_id: Uuid,
    /// The branch created or moved by the command.
    pub branch_id: Uuid,
    /// Events raised by the command, possibly none.
    pub events: Vec<BranchingEvent>,
}

impl BranchCommandResult {
    /// Identifiers of the raised events, in order.
    #[must_use]
    pub fn event_ids(&self) -> Vec<Uuid> {
        self.events.iter().map(|e| e.metadata.event_id).collect()
    }
}

fn drain_events(store: &mut BranchStore) -> Vec<BranchingEvent> {
    let events = store.uncommitted_events().to_vec();
    store.clear_uncommitted_events();
    for event in &events {
        debug!(
            event_type = event.event_type(),
            sequence_number = event.metadata.sequence_number,
            payload = %event.to_payload(),
            "event raised"
        );
    }
    events
}

/// Handles the `OpenBranchStore` command: creates a store over `graph` and
/// opens its root branch.
///
/// This is a CREATION command: the handler generates the store id.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if no branch identifier could be
/// drawn from `rng`.
pub fn handle_open_branch_store(
    command: &OpenBranchStore,
    graph: Arc<NarrativeGraph>,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
) -> Result<(BranchStore, BranchCommandResult), DomainError> {
    debug!(command_type = command.command_type(), correlation_id = %command.correlation_id, "handling command");

    let store_id = Uuid::new_v4();
    let mut store = BranchStore::new(store_id, graph).with_max_branches(command.max_branches);
    let root_id = store.open_root(command.correlation_id, clock, rng)?;
    let events = drain_events(&mut store);

    Ok((
        store,
        BranchCommandResult {
            aggregate_id: store_id,
            branch_id: root_id,
            events,
        },
    ))
}

/// Handles the `AdvanceBranch` command.
///
/// # Errors
///
/// Returns `DomainError::BranchNotFound` or `DomainError::ChoiceNotFound`.
pub fn handle_advance_branch(
    command: &AdvanceBranch,
    clock: &dyn Clock,
    store: &mut BranchStore,
) -> Result<BranchCommandResult, DomainError> {
    debug!(command_type = command.command_type(), correlation_id = %command.correlation_id, "handling command");

    store.advance(
        command.branch_id,
        &command.choice_id,
        command.correlation_id,
        clock,
    )?;

    Ok(BranchCommandResult {
        aggregate_id: store.id,
        branch_id: command.branch_id,
        events: drain_events(store),
    })
}

/// Handles the `SplitBranch` command. The result names the new branch.
///
/// # Errors
///
/// Returns `DomainError::BranchNotFound`, `DomainError::BranchLimitReached`,
/// or `DomainError::Infrastructure` when no unused identifier can be drawn.
pub fn handle_split_branch(
    command: &SplitBranch,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
    store: &mut BranchStore,
) -> Result<BranchCommandResult, DomainError> {
    debug!(command_type = command.command_type(), correlation_id = %command.correlation_id, "handling command");

    let new_branch_id = store.split(command.branch_id, command.correlation_id, clock, rng)?;

    Ok(BranchCommandResult {
        aggregate_id: store.id,
        branch_id: new_branch_id,
        events: drain_events(store),
    })
}

/// Handles the `RestoreSnapshot` command: validates the snapshot against the
/// store's graph and cap and, only if it is sound, swaps it in through a
/// `SnapshotRestored` event. The store id, cap and version sequence are kept.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the snapshot does not fit the graph
/// and `DomainError::BranchLimitReached` if it holds more branches than the
/// cap; the store is left unchanged in both cases.
pub fn handle_restore_snapshot(
    command: &RestoreSnapshot,
    clock: &dyn Clock,
    store: &mut BranchStore,
) -> Result<Vec<BranchingEvent>, DomainError> {
    debug!(command_type = command.command_type(), correlation_id = %command.correlation_id, "handling command");

    store.restore_snapshot(&command.snapshot, command.correlation_id, clock)?;

    Ok(drain_events(store))
}
