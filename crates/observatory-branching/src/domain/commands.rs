//! Commands for the Branching context.

use observatory_core::command::Command;
use uuid::Uuid;

use super::snapshot::BranchStoreSnapshot;

/// Command to open a store with its root branch on the start node.
#[derive(Debug, Clone)]
pub struct OpenBranchStore {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Optional cap on the number of branches; `None` is unbounded.
    pub max_branches: Option<usize>,
}

impl Command for OpenBranchStore {
    fn command_type(&self) -> &'static str {
        "branching.open_branch_store"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to take a choice on a branch.
#[derive(Debug, Clone)]
pub struct AdvanceBranch {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The branch taking the choice.
    pub branch_id: Uuid,
    /// The choice on the branch's current node.
    pub choice_id: String,
}

impl Command for AdvanceBranch {
    fn command_type(&self) -> &'static str {
        "branching.advance_branch"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to duplicate a branch into a new timeline.
#[derive(Debug, Clone)]
pub struct SplitBranch {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The branch to copy.
    pub branch_id: Uuid,
}

impl Command for SplitBranch {
    fn command_type(&self) -> &'static str {
        "branching.split_branch"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to replace a store's branches with a transmitted snapshot.
#[derive(Debug, Clone)]
pub struct RestoreSnapshot {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The snapshot to load.
    pub snapshot: BranchStoreSnapshot,
}

impl Command for RestoreSnapshot {
    fn command_type(&self) -> &'static str {
        "branching.restore_snapshot"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
