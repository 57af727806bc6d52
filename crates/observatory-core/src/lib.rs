//! Observatory Core: shared domain abstractions.
//!
//! This crate defines the traits and types that the narrative and branching
//! contexts both depend on: aggregate roots, commands, domain events, the
//! clock and RNG seams, and the domain error type. It performs no I/O.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod rng;
