//! Route modules organized by bounded context.

pub mod branches;
pub mod health;
pub mod narrative;
