//! Quantum Choice Observatory: Narrative Graph bounded context.
//!
//! Owns the authored story content: node and choice types, graph
//! construction and validation, YAML loading, and read-only node views.

pub mod application;
pub mod domain;
