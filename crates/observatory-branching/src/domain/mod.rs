//! Domain model for the Branching context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod labels;
pub mod snapshot;
