//! Transmitted form of a branch store.
//!
//! A snapshot is the ordered branch list plus the label counter, shaped as
//! `{branches: [{id, label, path: [{nodeId, choiceId}], currentNodeId}], labelCounter}`.
//! Restoring re-walks every path against the current graph, so a snapshot
//! taken against different content is refused rather than half-loaded.

use std::collections::HashSet;

use observatory_core::clock::Clock;
use observatory_core::error::DomainError;
use observatory_narrative::domain::graph::NarrativeGraph;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::aggregates::{Branch, BranchStep, BranchStore};
use super::events::{BranchingEventKind, RestoredBranch, SnapshotRestored};
use super::labels::label_index;

/// One recorded decision in transmitted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// The node the choice was taken on.
    pub node_id: String,
    /// The choice taken.
    pub choice_id: String,
}

impl From<&BranchStep> for StepRecord {
    fn from(step: &BranchStep) -> Self {
        Self {
            node_id: step.node_id.clone(),
            choice_id: step.choice_id.clone(),
        }
    }
}

impl From<&StepRecord> for BranchStep {
    fn from(record: &StepRecord) -> Self {
        Self {
            node_id: record.node_id.clone(),
            choice_id: record.choice_id.clone(),
        }
    }
}

/// One branch in transmitted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    /// Branch identifier.
    pub id: Uuid,
    /// Display label.
    pub label: String,
    /// Decisions from the start node, oldest first.
    pub path: Vec<StepRecord>,
    /// Current node, `null` for a resolved branch.
    pub current_node_id: Option<String>,
}

impl From<&Branch> for BranchRecord {
    fn from(branch: &Branch) -> Self {
        Self {
            id: branch.id,
            label: branch.label.clone(),
            path: branch.path.iter().map(StepRecord::from).collect(),
            current_node_id: branch.current_node_id.clone(),
        }
    }
}

impl From<&BranchRecord> for RestoredBranch {
    fn from(record: &BranchRecord) -> Self {
        Self {
            branch_id: record.id,
            label: record.label.clone(),
            path: record.path.iter().map(BranchStep::from).collect(),
            current_node_id: record.current_node_id.clone(),
        }
    }
}

/// A whole store in transmitted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchStoreSnapshot {
    /// Branches in creation order.
    pub branches: Vec<BranchRecord>,
    /// Index of the next label the store will hand out.
    pub label_counter: u64,
}

impl BranchStoreSnapshot {
    /// Checks the snapshot against `graph` without touching any store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the snapshot is empty, repeats an
    /// identifier or label, carries a label the counter has not issued yet,
    /// holds a counter that cannot advance, or holds a path that is not a
    /// walk from the start node through `graph` ending at the recorded
    /// position.
    pub fn validate(&self, graph: &NarrativeGraph) -> Result<(), DomainError> {
        if self.branches.is_empty() {
            return Err(DomainError::Validation(
                "snapshot holds no branches".to_owned(),
            ));
        }
        if self.label_counter == u64::MAX {
            return Err(DomainError::Validation(
                "snapshot label counter is exhausted".to_owned(),
            ));
        }

        let mut ids = HashSet::with_capacity(self.branches.len());
        let mut labels = HashSet::with_capacity(self.branches.len());
        for record in &self.branches {
            if !ids.insert(record.id) {
                return Err(DomainError::Validation(format!(
                    "snapshot repeats branch {}",
                    record.id
                )));
            }
            match label_index(&record.label) {
                Some(index) if index < self.label_counter => {}
                _ => {
                    return Err(DomainError::Validation(format!(
                        "branch {} carries label {:?} not issued by counter {}",
                        record.id, record.label, self.label_counter
                    )));
                }
            }
            if !labels.insert(record.label.as_str()) {
                return Err(DomainError::Validation(format!(
                    "snapshot repeats label {}",
                    record.label
                )));
            }
            validate_walk(graph, record)?;
        }
        Ok(())
    }
}

impl BranchStore {
    /// Captures the branches and label counter.
    #[must_use]
    pub fn snapshot(&self) -> BranchStoreSnapshot {
        BranchStoreSnapshot {
            branches: self.branches.iter().map(BranchRecord::from).collect(),
            label_counter: self.label_counter,
        }
    }

    /// Replaces every branch with the contents of `snapshot`, producing a
    /// `SnapshotRestored` event.
    ///
    /// The store keeps its id and cap, and its version keeps counting, so
    /// the event stream still replays through [`BranchStore::from_events`].
    /// Nothing changes unless the whole snapshot is accepted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if [`BranchStoreSnapshot::validate`]
    /// refuses the snapshot, and `DomainError::BranchLimitReached` if it
    /// holds more branches than the configured cap.
    pub fn restore_snapshot(
        &mut self,
        snapshot: &BranchStoreSnapshot,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        snapshot.validate(&self.graph)?;
        if let Some(limit) = self
            .max_branches
            .filter(|&limit| snapshot.branches.len() > limit)
        {
            return Err(DomainError::BranchLimitReached(limit));
        }

        info!(
            store_id = %self.id,
            branch_count = snapshot.branches.len(),
            label_counter = snapshot.label_counter,
            "restoring branch store from snapshot"
        );

        self.raise(
            BranchingEventKind::SnapshotRestored(SnapshotRestored {
                branches: snapshot.branches.iter().map(RestoredBranch::from).collect(),
                label_counter: snapshot.label_counter,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }
}

fn validate_walk(graph: &NarrativeGraph, record: &BranchRecord) -> Result<(), DomainError> {
    let mut position = Some(graph.start_node_id());

    for step in &record.path {
        let Some(expected) = position else {
            return Err(DomainError::Validation(format!(
                "branch {} continues past a resolving choice",
                record.id
            )));
        };
        if step.node_id != expected {
            return Err(DomainError::Validation(format!(
                "branch {} records a step on {} but stood on {expected}",
                record.id, step.node_id
            )));
        }
        let choice = graph
            .require_choice(&step.node_id, &step.choice_id)
            .map_err(|e| DomainError::Validation(format!("branch {}: {e}", record.id)))?;
        position = choice.next_id.as_deref();
    }

    if position != record.current_node_id.as_deref() {
        return Err(DomainError::Validation(format!(
            "branch {} records position {:?} but its path ends at {position:?}",
            record.id, record.current_node_id
        )));
    }
    Ok(())
}
