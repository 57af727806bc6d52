//! Routes for the Narrative Graph bounded context.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use tracing::instrument;

use observatory_narrative::application::query_handlers::{self, GraphSummaryView, NodeView};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /
#[instrument(skip(state))]
async fn get_summary(State(state): State<AppState>) -> Json<GraphSummaryView> {
    Json(query_handlers::get_graph_summary(&state.graph))
}

/// GET /nodes/{node_id}
#[instrument(skip(state))]
async fn get_node(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Result<Json<NodeView>, ApiError> {
    let view = query_handlers::get_node_by_id(&node_id, &state.graph)?;
    Ok(Json(view))
}

/// Returns the router for the narrative context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_summary))
        .route("/nodes/{node_id}", get(get_node))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use observatory_branching::domain::aggregates::BranchStore;
    use observatory_core::clock::Clock;
    use observatory_core::rng::DeterministicRng;
    use observatory_narrative::application::loader::load_builtin;
    use observatory_test_support::{FixedClock, MockRng};
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn test_app_state() -> AppState {
        let store = BranchStore::new(Uuid::new_v4(), Arc::new(load_builtin().unwrap()));
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(FixedClock(Utc::now()));
        let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(MockRng));
        AppState::new(store, clock, rng)
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = router()
            .with_state(test_app_state())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap())
    }

    #[tokio::test]
    async fn test_get_summary_describes_builtin_graph() {
        // Act
        let (status, json) = get_json("/").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["start_node_id"], "origin");
        assert_eq!(json["node_count"], 10);
        assert_eq!(json["terminal_node_ids"].as_array().unwrap().len(), 6);
        assert_eq!(json["content_hash"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_get_node_returns_choices_in_authored_order() {
        let (status, json) = get_json("/nodes/origin").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["title"], "The Harmonic Crossroads");
        let choices: Vec<&str> = json["choices"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["choice_id"].as_str().unwrap())
            .collect();
        assert_eq!(choices, ["origin-logic", "origin-empathy", "origin-chaos"]);
    }

    #[tokio::test]
    async fn test_get_node_returns_404_for_unknown_node() {
        let (status, json) = get_json("/nodes/nowhere").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "node_not_found");
    }
}
