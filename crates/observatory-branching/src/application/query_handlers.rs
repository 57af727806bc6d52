//! Query handlers for the Branching context.
//!
//! Pure projections of store state plus graph lookups. A presentation layer
//! re-reads these after every command; nothing here mutates the store.

use observatory_core::error::DomainError;
use observatory_narrative::application::query_handlers::NodeView;
use observatory_narrative::domain::graph::NarrativeGraph;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{Branch, BranchStep, BranchStore};
use crate::domain::snapshot::BranchStoreSnapshot;

/// Headline shown for a branch that has no current node.
pub const RESOLVED_HEADLINE: &str = "Resolved Horizon";

/// Where a branch stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchStatus {
    /// On a node that offers choices.
    Open,
    /// On a node without choices; it can still be split.
    Settled,
    /// Took a choice with no successor; `current_node` is `None`.
    Resolved,
}

/// One decision in a branch history, with its display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    /// The node the choice was taken on.
    pub node_id: String,
    /// That node's title.
    pub node_title: String,
    /// The choice taken.
    pub choice_id: String,
    /// The choice label.
    pub choice_label: String,
    /// The choice summary.
    pub summary: String,
    /// The choice resonance line.
    pub resonance: String,
}

/// Read-only view of a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchView {
    /// The branch identifier.
    pub branch_id: Uuid,
    /// Display label.
    pub label: String,
    /// Open, settled or resolved.
    pub status: BranchStatus,
    /// Current node title, or [`RESOLVED_HEADLINE`].
    pub headline: String,
    /// History from the start node, oldest first.
    pub steps: Vec<StepView>,
    /// The node the branch sits on, `None` once resolved.
    pub current_node: Option<NodeView>,
}

/// Read-only view of the whole store.
#[derive(Debug, Serialize)]
pub struct BranchCollectionView {
    /// The store identifier.
    pub store_id: Uuid,
    /// Number of branches.
    pub open_states: usize,
    /// Branches in creation order.
    pub branches: Vec<BranchView>,
}

fn project_step(step: &BranchStep, graph: &NarrativeGraph) -> Option<StepView> {
    let node = graph.node(&step.node_id)?;
    let choice = node.choice(&step.choice_id)?;
    Some(StepView {
        node_id: node.id.clone(),
        node_title: node.title.clone(),
        choice_id: choice.id.clone(),
        choice_label: choice.label.clone(),
        summary: choice.summary.clone(),
        resonance: choice.resonance.clone(),
    })
}

/// Projects one branch against `graph`.
///
/// Steps whose node or choice does not resolve are skipped; a store built
/// through its own commands or a validated restore never holds such steps.
#[must_use]
pub fn project_branch(branch: &Branch, graph: &NarrativeGraph) -> BranchView {
    let current_node = branch
        .current_node_id()
        .and_then(|node_id| graph.node(node_id))
        .map(NodeView::from);

    let status = match &current_node {
        None => BranchStatus::Resolved,
        Some(node) if node.terminal => BranchStatus::Settled,
        Some(_) => BranchStatus::Open,
    };

    let headline = current_node
        .as_ref()
        .map_or_else(|| RESOLVED_HEADLINE.to_owned(), |node| node.title.clone());

    BranchView {
        branch_id: branch.id(),
        label: branch.label().to_owned(),
        status,
        headline,
        steps: branch
            .path()
            .iter()
            .filter_map(|step| project_step(step, graph))
            .collect(),
        current_node,
    }
}

/// Lists every branch in creation order.
#[must_use]
pub fn list_branches(store: &BranchStore) -> BranchCollectionView {
    let graph = store.graph();
    BranchCollectionView {
        store_id: store.id,
        open_states: store.branches().len(),
        branches: store
            .branches()
            .iter()
            .map(|branch| project_branch(branch, graph))
            .collect(),
    }
}

/// Retrieves one branch by identifier.
///
/// # Errors
///
/// Returns `DomainError::BranchNotFound` if no branch has this identifier.
pub fn get_branch_by_id(branch_id: Uuid, store: &BranchStore) -> Result<BranchView, DomainError> {
    store
        .branch(branch_id)
        .map(|branch| project_branch(branch, store.graph()))
        .ok_or(DomainError::BranchNotFound(branch_id))
}

/// Exports the store in its transmitted form.
#[must_use]
pub fn export_snapshot(store: &BranchStore) -> BranchStoreSnapshot {
    store.snapshot()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use observatory_core::error::DomainError;
    use observatory_core::rng::StdRngSource;
    use observatory_narrative::application::loader::load_builtin;
    use uuid::Uuid;

    use crate::application::query_handlers::{
        BranchStatus, RESOLVED_HEADLINE, export_snapshot, get_branch_by_id, list_branches,
    };
    use crate::domain::aggregates::BranchStore;
    use observatory_test_support::{FixedClock, threshold_graph};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    #[test]
    fn test_list_branches_projects_each_branch_in_creation_order() {
        // Arrange
        let mut rng = StdRngSource::seeded(8);
        let mut store = BranchStore::new(Uuid::new_v4(), Arc::new(load_builtin().unwrap()));
        let root = store.open_root(Uuid::new_v4(), &clock(), &mut rng).unwrap();
        store.advance(root, "origin-logic", Uuid::new_v4(), &clock()).unwrap();
        let clone = store.split(root, Uuid::new_v4(), &clock(), &mut rng).unwrap();
        store.advance(root, "logic-archive", Uuid::new_v4(), &clock()).unwrap();

        // Act
        let view = list_branches(&store);

        // Assert
        assert_eq!(view.store_id, store.id);
        assert_eq!(view.open_states, 2);

        let first = &view.branches[0];
        assert_eq!(first.branch_id, root);
        assert_eq!(first.label, "Timeline A");
        assert_eq!(first.status, BranchStatus::Settled);
        assert_eq!(first.headline, "The Vault of Every Tomorrow");
        assert_eq!(first.steps.len(), 2);
        assert_eq!(first.steps[0].node_title, "The Harmonic Crossroads");
        assert_eq!(first.steps[0].choice_label, "Chart a crystalline logic");
        assert_eq!(first.steps[1].choice_id, "logic-archive");

        let second = &view.branches[1];
        assert_eq!(second.branch_id, clone);
        assert_eq!(second.status, BranchStatus::Open);
        assert_eq!(second.headline, "Symmetry Architects");
        assert_eq!(second.steps.len(), 1);
        assert_eq!(second.current_node.as_ref().unwrap().choices.len(), 2);
    }

    #[test]
    fn test_resolved_branch_projects_resolved_headline() {
        let mut rng = StdRngSource::seeded(9);
        let mut store = BranchStore::new(Uuid::new_v4(), Arc::new(threshold_graph()));
        let root = store.open_root(Uuid::new_v4(), &clock(), &mut rng).unwrap();
        store.advance(root, "walk-away", Uuid::new_v4(), &clock()).unwrap();

        let view = get_branch_by_id(root, &store).unwrap();

        assert_eq!(view.status, BranchStatus::Resolved);
        assert_eq!(view.headline, RESOLVED_HEADLINE);
        assert!(view.current_node.is_none());
        assert_eq!(view.steps[0].resonance, "The hinges sigh.");
    }

    #[test]
    fn test_get_branch_by_id_returns_not_found_for_unknown_branch() {
        let mut rng = StdRngSource::seeded(10);
        let mut store = BranchStore::new(Uuid::new_v4(), Arc::new(load_builtin().unwrap()));
        store.open_root(Uuid::new_v4(), &clock(), &mut rng).unwrap();
        let stranger = Uuid::new_v4();

        let result = get_branch_by_id(stranger, &store);

        match result.unwrap_err() {
            DomainError::BranchNotFound(id) => assert_eq!(id, stranger),
            other => panic!("expected BranchNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_export_snapshot_matches_store() {
        let mut rng = StdRngSource::seeded(12);
        let mut store = BranchStore::new(Uuid::new_v4(), Arc::new(load_builtin().unwrap()));
        let root = store.open_root(Uuid::new_v4(), &clock(), &mut rng).unwrap();

        let snapshot = export_snapshot(&store);

        assert_eq!(snapshot.label_counter, 1);
        assert_eq!(snapshot.branches.len(), 1);
        assert_eq!(snapshot.branches[0].id, root);
        assert_eq!(snapshot.branches[0].current_node_id.as_deref(), Some("origin"));
    }
}
