//! Quantum Choice Observatory: Branching bounded context.
//!
//! Responsible for the branch store: opening the root timeline, advancing
//! branches through the narrative graph, splitting them into independent
//! copies, and projecting branch state for presentation.

pub mod application;
pub mod domain;
