//! Aggregate roots for the Branching context.

use std::sync::Arc;

use observatory_core::aggregate::AggregateRoot;
use observatory_core::clock::Clock;
use observatory_core::error::DomainError;
use observatory_core::event::EventMetadata;
use observatory_core::rng::DeterministicRng;
use observatory_narrative::domain::graph::NarrativeGraph;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::events::{BranchAdvanced, BranchSplit, BranchingEvent, BranchingEventKind, RootOpened};
use super::labels::branch_label;

/// Draws allowed before giving up on finding an unused branch identifier.
const MAX_ID_ATTEMPTS: usize = 8;

/// One recorded decision: while on `node_id`, the branch took `choice_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchStep {
    /// The node the choice was taken on.
    pub node_id: String,
    /// The choice taken.
    pub choice_id: String,
}

/// One independent timeline through the narrative graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub(crate) id: Uuid,
    pub(crate) label: String,
    pub(crate) path: Vec<BranchStep>,
    pub(crate) current_node_id: Option<String>,
}

impl Branch {
    /// Unique, never reused identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Display label, e.g. `Timeline C`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Every decision taken from the start node, oldest first.
    #[must_use]
    pub fn path(&self) -> &[BranchStep] {
        &self.path
    }

    /// Current position, `None` once a choice without successor was taken.
    #[must_use]
    pub fn current_node_id(&self) -> Option<&str> {
        self.current_node_id.as_deref()
    }

    /// A terminal branch has no current node and can no longer advance.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.current_node_id.is_none()
    }
}

/// The aggregate root owning every branch of an exploration session.
///
/// Branches are kept in creation order and are never removed. The label
/// counter only grows, so labels stay unique even across restores.
#[derive(Debug)]
pub struct BranchStore {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    pub(crate) graph: Arc<NarrativeGraph>,
    pub(crate) branches: Vec<Branch>,
    /// Index of the next label to hand out.
    pub(crate) label_counter: u64,
    pub(crate) max_branches: Option<usize>,
    /// Uncommitted events pending report.
    uncommitted_events: Vec<BranchingEvent>,
}

impl BranchStore {
    /// Creates an empty store over `graph`. Call [`BranchStore::open_root`]
    /// or replay events to populate it.
    #[must_use]
    pub fn new(id: Uuid, graph: Arc<NarrativeGraph>) -> Self {
        Self {
            id,
            version: 0,
            graph,
            branches: Vec::new(),
            label_counter: 0,
            max_branches: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Caps the number of branches `split` may create. `None` is unbounded.
    #[must_use]
    pub fn with_max_branches(mut self, max_branches: Option<usize>) -> Self {
        self.max_branches = max_branches;
        self
    }

    /// Rebuilds a store by applying `events` in order.
    #[must_use]
    pub fn from_events(id: Uuid, graph: Arc<NarrativeGraph>, events: &[BranchingEvent]) -> Self {
        let mut store = Self::new(id, graph);
        for event in events {
            store.apply(event);
        }
        store
    }

    /// Opens the root branch on the graph's start node, producing a
    /// `RootOpened` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the store already has branches
    /// or the label sequence is exhausted.
    pub fn open_root(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Uuid, DomainError> {
        if !self.branches.is_empty() {
            return Err(DomainError::Validation(
                "branch store already has a root branch".to_owned(),
            ));
        }

        let label = self.next_label()?;
        let branch_id = self.fresh_branch_id(rng)?;
        let start_node_id = self.graph.start_node_id().to_owned();
        info!(%branch_id, %start_node_id, "opening root branch");

        self.raise(
            BranchingEventKind::RootOpened(RootOpened {
                branch_id,
                label,
                start_node_id,
            }),
            correlation_id,
            clock,
        );
        Ok(branch_id)
    }

    /// Takes `choice_id` on the branch's current node, producing a
    /// `BranchAdvanced` event.
    ///
    /// Advancing a terminal branch succeeds without raising an event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BranchNotFound` if no branch has `branch_id`,
    /// and `DomainError::ChoiceNotFound` if the current node does not offer
    /// `choice_id`.
    pub fn advance(
        &mut self,
        branch_id: Uuid,
        choice_id: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let branch = self
            .branch(branch_id)
            .ok_or(DomainError::BranchNotFound(branch_id))?;

        let Some(node_id) = branch.current_node_id.clone() else {
            debug!(%branch_id, choice_id, "branch is resolved; advance ignored");
            return Ok(());
        };

        let next_node_id = self.graph.require_choice(&node_id, choice_id)?.next_id.clone();
        debug!(%branch_id, %node_id, choice_id, ?next_node_id, "advancing branch");

        self.raise(
            BranchingEventKind::BranchAdvanced(BranchAdvanced {
                branch_id,
                node_id,
                choice_id: choice_id.to_owned(),
                next_node_id,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Copies the branch into a new branch with the next label, producing a
    /// `BranchSplit` event. Terminal branches may be split.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BranchNotFound` if no branch has `branch_id`,
    /// `DomainError::BranchLimitReached` if the configured cap is reached,
    /// `DomainError::Validation` if the label sequence is exhausted,
    /// and `DomainError::Infrastructure` if no unused identifier could be
    /// drawn from `rng`.
    pub fn split(
        &mut self,
        branch_id: Uuid,
        correlation_id: Uuid,
        clock: &dyn Clock,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Uuid, DomainError> {
        let source = self
            .branch(branch_id)
            .ok_or(DomainError::BranchNotFound(branch_id))?;

        if let Some(limit) = self
            .max_branches
            .filter(|&limit| self.branches.len() >= limit)
        {
            return Err(DomainError::BranchLimitReached(limit));
        }

        let path = source.path.clone();
        let current_node_id = source.current_node_id.clone();
        let label = self.next_label()?;
        let new_branch_id = self.fresh_branch_id(rng)?;
        info!(source_branch_id = %branch_id, branch_id = %new_branch_id, %label, "splitting branch");

        self.raise(
            BranchingEventKind::BranchSplit(BranchSplit {
                source_branch_id: branch_id,
                branch_id: new_branch_id,
                label,
                path,
                current_node_id,
            }),
            correlation_id,
            clock,
        );
        Ok(new_branch_id)
    }

    /// Looks up a branch.
    #[must_use]
    pub fn branch(&self, branch_id: Uuid) -> Option<&Branch> {
        self.branches.iter().find(|branch| branch.id == branch_id)
    }

    /// All branches in creation order.
    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// The graph every branch walks.
    #[must_use]
    pub fn graph(&self) -> &Arc<NarrativeGraph> {
        &self.graph
    }

    /// Index of the next label to hand out.
    #[must_use]
    pub fn label_counter(&self) -> u64 {
        self.label_counter
    }

    /// The configured branch cap.
    #[must_use]
    pub fn max_branches(&self) -> Option<usize> {
        self.max_branches
    }

    /// The label the next branch receives. The counter must still be able to
    /// advance past it.
    fn next_label(&self) -> Result<String, DomainError> {
        if self.label_counter.checked_add(1).is_none() {
            return Err(DomainError::Validation(
                "branch label sequence is exhausted".to_owned(),
            ));
        }
        Ok(branch_label(self.label_counter))
    }

    fn fresh_branch_id(&self, rng: &mut dyn DeterministicRng) -> Result<Uuid, DomainError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = rng.next_uuid();
            if self.branch(candidate).is_none() {
                return Ok(candidate);
            }
        }
        Err(DomainError::Infrastructure(
            "could not draw an unused branch identifier".to_owned(),
        ))
    }

    /// Stamps `kind` with metadata, applies it, and queues it for reporting.
    pub(crate) fn raise(&mut self, kind: BranchingEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = BranchingEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.version + 1,
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };

        self.apply(&event);
        self.uncommitted_events.push(event);
    }
}

impl AggregateRoot for BranchStore {
    type Event = BranchingEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            BranchingEventKind::RootOpened(payload) => {
                self.branches.push(Branch {
                    id: payload.branch_id,
                    label: payload.label.clone(),
                    path: Vec::new(),
                    current_node_id: Some(payload.start_node_id.clone()),
                });
                self.label_counter = self.label_counter.saturating_add(1);
            }
            BranchingEventKind::BranchAdvanced(payload) => {
                if let Some(branch) = self
                    .branches
                    .iter_mut()
                    .find(|branch| branch.id == payload.branch_id)
                {
                    branch.path.push(BranchStep {
                        node_id: payload.node_id.clone(),
                        choice_id: payload.choice_id.clone(),
                    });
                    branch.current_node_id.clone_from(&payload.next_node_id);
                }
            }
            BranchingEventKind::BranchSplit(payload) => {
                self.branches.push(Branch {
                    id: payload.branch_id,
                    label: payload.label.clone(),
                    path: payload.path.clone(),
                    current_node_id: payload.current_node_id.clone(),
                });
                self.label_counter = self.label_counter.saturating_add(1);
            }
            BranchingEventKind::SnapshotRestored(payload) => {
                self.branches = payload
                    .branches
                    .iter()
                    .map(|restored| Branch {
                        id: restored.branch_id,
                        label: restored.label.clone(),
                        path: restored.path.clone(),
                        current_node_id: restored.current_node_id.clone(),
                    })
                    .collect();
                self.label_counter = payload.label_counter;
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
