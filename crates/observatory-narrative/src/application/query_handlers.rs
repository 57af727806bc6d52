//! Query handlers for the Narrative Graph context.
//!
//! Read-only view DTOs over the shared graph. Nothing here mutates it.

use observatory_core::error::DomainError;
use serde::Serialize;

use crate::domain::graph::{Choice, NarrativeGraph, NarrativeNode};

/// Read-only view of a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceView {
    /// The choice identifier.
    pub choice_id: String,
    /// Button label.
    pub label: String,
    /// One-sentence summary.
    pub summary: String,
    /// Flavour line.
    pub resonance: String,
    /// Node reached by this choice, `None` if it resolves the branch.
    pub next_node_id: Option<String>,
}

impl From<&Choice> for ChoiceView {
    fn from(choice: &Choice) -> Self {
        Self {
            choice_id: choice.id.clone(),
            label: choice.label.clone(),
            summary: choice.summary.clone(),
            resonance: choice.resonance.clone(),
            next_node_id: choice.next_id.clone(),
        }
    }
}

/// Read-only view of a narrative node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    /// The node identifier.
    pub node_id: String,
    /// Heading text.
    pub title: String,
    /// The question put to the reader.
    pub prompt: String,
    /// Scene description.
    pub description: String,
    /// Choices in display order.
    pub choices: Vec<ChoiceView>,
    /// `true` when the node offers no choices.
    pub terminal: bool,
}

impl From<&NarrativeNode> for NodeView {
    fn from(node: &NarrativeNode) -> Self {
        Self {
            node_id: node.id.clone(),
            title: node.title.clone(),
            prompt: node.prompt.clone(),
            description: node.description.clone(),
            choices: node.choices.iter().map(ChoiceView::from).collect(),
            terminal: node.is_terminal(),
        }
    }
}

/// Summary of the loaded graph.
#[derive(Debug, Serialize)]
pub struct GraphSummaryView {
    /// Node every root branch starts on.
    pub start_node_id: String,
    /// Number of authored nodes.
    pub node_count: usize,
    /// Nodes without choices, sorted.
    pub terminal_node_ids: Vec<String>,
    /// Hex SHA-256 of the canonical graph.
    pub content_hash: String,
}

/// Retrieves one node by identifier.
///
/// # Errors
///
/// Returns `DomainError::NodeNotFound` if the graph has no such node.
pub fn get_node_by_id(node_id: &str, graph: &NarrativeGraph) -> Result<NodeView, DomainError> {
    graph.require_node(node_id).map(NodeView::from)
}

/// Summarizes the graph.
#[must_use]
pub fn get_graph_summary(graph: &NarrativeGraph) -> GraphSummaryView {
    GraphSummaryView {
        start_node_id: graph.start_node_id().to_owned(),
        node_count: graph.len(),
        terminal_node_ids: graph
            .terminal_node_ids()
            .into_iter()
            .map(str::to_owned)
            .collect(),
        content_hash: graph.content_hash().to_owned(),
    }
}
