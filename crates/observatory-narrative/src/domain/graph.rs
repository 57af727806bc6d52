//! The authored narrative graph.
//!
//! A graph is built once at startup, checked for dangling references, and
//! then shared read-only by every branch.

use std::collections::{HashMap, HashSet};

use observatory_core::error::DomainError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An edge out of a node. A choice without `next_id` resolves the branch
/// that takes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Identifier, unique within the owning node.
    pub id: String,
    /// Short label shown on the choice button.
    pub label: String,
    /// One-sentence summary of the decision.
    pub summary: String,
    /// Flavour line echoed in the branch history.
    pub resonance: String,
    /// Node reached by taking this choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
}

/// A point in the narrative with display text and ordered choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeNode {
    /// Unique node identifier.
    pub id: String,
    /// Heading text.
    pub title: String,
    /// The question put to the reader.
    pub prompt: String,
    /// Longer scene description.
    pub description: String,
    /// Choices in display order. Empty for a terminal node.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl NarrativeNode {
    /// Looks up a choice offered by this node.
    #[must_use]
    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == choice_id)
    }

    /// Returns `true` when the node offers no choices.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty()
    }
}

/// Immutable node lookup table with a designated start node.
#[derive(Debug)]
pub struct NarrativeGraph {
    start_node_id: String,
    nodes: HashMap<String, NarrativeNode>,
    content_hash: String,
}

impl NarrativeGraph {
    /// Builds a graph from authored nodes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the node list is empty, an
    /// identifier is blank or duplicated, the start node is missing, or a
    /// choice points at a node that does not exist.
    pub fn new(
        start_node_id: impl Into<String>,
        nodes: Vec<NarrativeNode>,
    ) -> Result<Self, DomainError> {
        let start_node_id = start_node_id.into();
        validate(&start_node_id, &nodes)?;
        let content_hash = content_hash(&start_node_id, &nodes)?;

        let nodes = nodes
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect();

        Ok(Self {
            start_node_id,
            nodes,
            content_hash,
        })
    }

    /// Returns the node every root branch starts on.
    #[must_use]
    pub fn start_node_id(&self) -> &str {
        &self.start_node_id
    }

    /// Looks up a node by identifier.
    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<&NarrativeNode> {
        self.nodes.get(node_id)
    }

    /// Looks up a node, mapping a miss to `DomainError::NodeNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NodeNotFound` if no node has this identifier.
    pub fn require_node(&self, node_id: &str) -> Result<&NarrativeNode, DomainError> {
        self.node(node_id)
            .ok_or_else(|| DomainError::NodeNotFound(node_id.to_owned()))
    }

    /// Looks up the choice `choice_id` on node `node_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NodeNotFound` or `DomainError::ChoiceNotFound`.
    pub fn require_choice(&self, node_id: &str, choice_id: &str) -> Result<&Choice, DomainError> {
        self.require_node(node_id)?
            .choice(choice_id)
            .ok_or_else(|| DomainError::ChoiceNotFound {
                node_id: node_id.to_owned(),
                choice_id: choice_id.to_owned(),
            })
    }

    /// Iterates over all nodes in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &NarrativeNode> {
        self.nodes.values()
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false` for a constructed graph; present for clippy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Identifiers of nodes without choices, sorted.
    #[must_use]
    pub fn terminal_node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .nodes
            .values()
            .filter(|node| node.is_terminal())
            .map(|node| node.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Hex SHA-256 over the canonical JSON form of the graph.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }
}

fn validate(start_node_id: &str, nodes: &[NarrativeNode]) -> Result<(), DomainError> {
    if nodes.is_empty() {
        return Err(DomainError::Validation(
            "narrative graph has no nodes".to_owned(),
        ));
    }

    let mut node_ids = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if node.id.trim().is_empty() {
            return Err(DomainError::Validation(
                "narrative node id must not be blank".to_owned(),
            ));
        }
        if !node_ids.insert(node.id.as_str()) {
            return Err(DomainError::Validation(format!(
                "duplicate narrative node id: {}",
                node.id
            )));
        }
    }

    if !node_ids.contains(start_node_id) {
        return Err(DomainError::Validation(format!(
            "start node {start_node_id} is not defined"
        )));
    }

    for node in nodes {
        let mut choice_ids = HashSet::with_capacity(node.choices.len());
        for choice in &node.choices {
            if choice.id.trim().is_empty() {
                return Err(DomainError::Validation(format!(
                    "node {} has a choice with a blank id",
                    node.id
                )));
            }
            if !choice_ids.insert(choice.id.as_str()) {
                return Err(DomainError::Validation(format!(
                    "node {} offers choice {} twice",
                    node.id, choice.id
                )));
            }
            if let Some(next_id) = &choice.next_id {
                if !node_ids.contains(next_id.as_str()) {
                    return Err(DomainError::Validation(format!(
                        "choice {} on node {} points at unknown node {next_id}",
                        choice.id, node.id
                    )));
                }
            }
        }
    }

    Ok(())
}

fn content_hash(start_node_id: &str, nodes: &[NarrativeNode]) -> Result<String, DomainError> {
    let mut sorted: Vec<&NarrativeNode> = nodes.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let canonical = serde_json::to_vec(&(start_node_id, sorted)).map_err(|e| {
        DomainError::Infrastructure(format!("narrative graph serialization failed: {e}"))
    })?;

    Ok(format!("{:x}", Sha256::digest(&canonical)))
}
