//! Loads a narrative graph from its authored YAML form.
//!
//! A document names its start node and lists nodes in authoring order:
//!
//! ```yaml
//! start: origin
//! nodes:
//!   - id: origin
//!     title: The Harmonic Crossroads
//!     prompt: How do you begin?
//!     description: City-sized algorithms sway overhead.
//!     choices:
//!       - id: origin-logic
//!         label: Chart a crystalline logic
//!         summary: Architect a precise lattice.
//!         resonance: Glasswork drones pulse.
//!         next_id: logic
//! ```

use std::path::Path;

use observatory_core::error::DomainError;
use serde::Deserialize;
use tracing::info;

use crate::domain::graph::{NarrativeGraph, NarrativeNode};

/// The Harmonic Crossroads, compiled into the binary.
pub const BUILTIN_NARRATIVE: &str = include_str!("../../content/harmonic_crossroads.yaml");

#[derive(Debug, Deserialize)]
struct NarrativeDocument {
    start: String,
    nodes: Vec<NarrativeNode>,
}

/// Parses and validates a YAML narrative document.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the YAML cannot be parsed and
/// `DomainError::Validation` if the graph is malformed.
pub fn load_from_yaml_str(source: &str) -> Result<NarrativeGraph, DomainError> {
    let document: NarrativeDocument = serde_yaml::from_str(source).map_err(|e| {
        DomainError::Infrastructure(format!("narrative document parsing failed: {e}"))
    })?;

    let graph = NarrativeGraph::new(document.start, document.nodes)?;
    info!(
        start_node_id = graph.start_node_id(),
        node_count = graph.len(),
        content_hash = graph.content_hash(),
        "narrative graph loaded"
    );
    Ok(graph)
}

/// Reads a YAML narrative document from disk.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the file cannot be read, plus
/// every error of [`load_from_yaml_str`].
pub fn load_from_path(path: &Path) -> Result<NarrativeGraph, DomainError> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        DomainError::Infrastructure(format!(
            "failed to read narrative document {}: {e}",
            path.display()
        ))
    })?;
    load_from_yaml_str(&source)
}

/// Loads the built-in Harmonic Crossroads narrative.
///
/// # Errors
///
/// Only fails if the embedded document itself is malformed.
pub fn load_builtin() -> Result<NarrativeGraph, DomainError> {
    load_from_yaml_str(BUILTIN_NARRATIVE)
}
