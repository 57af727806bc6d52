//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use observatory_branching::application::command_handlers::handle_open_branch_store;
use observatory_branching::domain::commands::OpenBranchStore;
use observatory_core::clock::Clock;
use observatory_core::rng::{DeterministicRng, StdRngSource};
use observatory_narrative::application::loader::load_builtin;
use observatory_test_support::FixedClock;
use tower::ServiceExt;
use uuid::Uuid;

use observatory_api::app_router;
use observatory_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app over the built-in graph with a seeded generator.
/// Returns the state alongside the router so a test can keep issuing
/// requests against the same store, plus the root branch id.
pub fn build_test_app(max_branches: Option<usize>) -> (AppState, Uuid) {
    let clock = fixed_clock();
    let mut rng = StdRngSource::seeded(2026);
    let command = OpenBranchStore {
        correlation_id: Uuid::new_v4(),
        max_branches,
    };
    let (store, opened) = handle_open_branch_store(
        &command,
        Arc::new(load_builtin().unwrap()),
        clock.as_ref(),
        &mut rng,
    )
    .unwrap();

    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    (AppState::new(store, clock, rng), opened.branch_id)
}

/// The router for `state`, as `main.rs` builds it.
pub fn router(state: &AppState) -> Router {
    app_router(state.clone())
}

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with an optional JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, body).await
}

/// Send a PUT request with a JSON body and return the response.
pub async fn put_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "PUT", uri, Some(body)).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None).await
}
