//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No branch with this identifier exists in the store.
    #[error("branch not found: {0}")]
    BranchNotFound(Uuid),

    /// A node identifier did not resolve against the narrative graph.
    #[error("narrative node not found: {0}")]
    NodeNotFound(String),

    /// The requested choice is not offered by the node the branch sits on.
    #[error("choice {choice_id} is not offered by node {node_id}")]
    ChoiceNotFound {
        /// The node that was searched.
        node_id: String,
        /// The choice that was requested.
        choice_id: String,
    },

    /// A split was refused because the configured cap is reached.
    #[error("branch limit of {0} reached")]
    BranchLimitReached(usize),

    /// Input failed a domain rule (malformed graph, inconsistent snapshot).
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization, locking or content loading failed.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
