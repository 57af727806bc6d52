//! Application services for the Narrative Graph context.

pub mod loader;
pub mod query_handlers;
