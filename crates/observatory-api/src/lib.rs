//! Quantum Choice Observatory: HTTP adapter.
//!
//! Exposes the branch store and the narrative graph over JSON. The binary in
//! `main.rs` wires configuration, content loading and tracing around
//! [`app_router`].

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use crate::state::AppState;

/// Builds the full router with tracing and CORS layers applied.
pub fn app_router(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/branches", routes::branches::router())
        .nest("/api/v1/narrative", routes::narrative::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
