//! Domain model for the Narrative Graph context.

pub mod graph;
