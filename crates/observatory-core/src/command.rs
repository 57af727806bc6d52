//! Command abstractions.

use uuid::Uuid;

/// A request to change a branch store: open it, advance or split a branch,
/// or restore a snapshot. Commands carry intent only; the aggregate decides
/// whether they succeed.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable command name such as `branching.split_branch`, logged by
    /// command handlers.
    fn command_type(&self) -> &'static str;

    /// Correlation ID copied into the metadata of every event the command
    /// raises, so an HTTP request can be traced to its events.
    fn correlation_id(&self) -> Uuid;
}
