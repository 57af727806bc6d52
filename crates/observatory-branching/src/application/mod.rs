//! Application services for the Branching context.

pub mod command_handlers;
pub mod query_handlers;
