//! Domain events for the Branching context.

use observatory_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregates::BranchStep;

/// Emitted once when a store opens its root branch on the start node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootOpened {
    /// The root branch identifier.
    pub branch_id: Uuid,
    /// The root branch label (always the first in the sequence).
    pub label: String,
    /// The node the root branch starts on.
    pub start_node_id: String,
}

/// Emitted when a branch takes a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchAdvanced {
    /// The branch that moved.
    pub branch_id: Uuid,
    /// The node the choice was taken on.
    pub node_id: String,
    /// The choice taken.
    pub choice_id: String,
    /// Where the branch now sits; `None` once it is resolved.
    pub next_node_id: Option<String>,
}

/// Emitted when a branch is duplicated into a new, independent branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSplit {
    /// The branch that was copied.
    pub source_branch_id: Uuid,
    /// The newly created branch.
    pub branch_id: Uuid,
    /// The label assigned to the new branch.
    pub label: String,
    /// The source path at the moment of the split.
    pub path: Vec<BranchStep>,
    /// The source position at the moment of the split.
    pub current_node_id: Option<String>,
}

/// One branch as installed by a restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoredBranch {
    /// The branch identifier.
    pub branch_id: Uuid,
    /// The branch label.
    pub label: String,
    /// Decisions from the start node, oldest first.
    pub path: Vec<BranchStep>,
    /// Current position, `None` for a resolved branch.
    pub current_node_id: Option<String>,
}

/// Emitted when a validated snapshot replaces every branch of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRestored {
    /// The branches that now make up the store, in creation order.
    pub branches: Vec<RestoredBranch>,
    /// Index of the next label the store will hand out.
    pub label_counter: u64,
}

/// Event type identifier for [`RootOpened`].
pub const ROOT_OPENED_EVENT_TYPE: &str = "branching.root_opened";

/// Event type identifier for [`BranchAdvanced`].
pub const BRANCH_ADVANCED_EVENT_TYPE: &str = "branching.branch_advanced";

/// Event type identifier for [`BranchSplit`].
pub const BRANCH_SPLIT_EVENT_TYPE: &str = "branching.branch_split";

/// Event type identifier for [`SnapshotRestored`].
pub const SNAPSHOT_RESTORED_EVENT_TYPE: &str = "branching.snapshot_restored";

/// Event payload variants for the Branching context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchingEventKind {
    /// The root branch has been opened.
    RootOpened(RootOpened),
    /// A branch has advanced by one choice.
    BranchAdvanced(BranchAdvanced),
    /// A branch has been split.
    BranchSplit(BranchSplit),
    /// The store has been replaced from a snapshot.
    SnapshotRestored(SnapshotRestored),
}

impl BranchingEventKind {
    /// Returns the type name of this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RootOpened(_) => ROOT_OPENED_EVENT_TYPE,
            Self::BranchAdvanced(_) => BRANCH_ADVANCED_EVENT_TYPE,
            Self::BranchSplit(_) => BRANCH_SPLIT_EVENT_TYPE,
            Self::SnapshotRestored(_) => SNAPSHOT_RESTORED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Branching context.
#[derive(Debug, Clone)]
pub struct BranchingEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: BranchingEventKind,
}

impl DomainEvent for BranchingEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("BranchingEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
