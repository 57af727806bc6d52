//! Routes for the Branching bounded context.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use observatory_branching::application::query_handlers::{BranchCollectionView, BranchView};
use observatory_branching::application::{command_handlers, query_handlers};
use observatory_branching::domain::commands;
use observatory_branching::domain::snapshot::BranchStoreSnapshot;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{branch_id}/advance.
#[derive(Debug, Deserialize)]
pub struct AdvanceBranchRequest {
    /// The choice to take on the branch's current node.
    pub choice_id: String,
}

/// Response body returned after a branch command is handled.
#[derive(Debug, Serialize)]
pub struct BranchCommandResponse {
    /// IDs of the domain events raised; empty when the command was a no-op.
    pub event_ids: Vec<Uuid>,
    /// The branch as it stands after the command.
    pub branch: BranchView,
}

/// Response body returned after a snapshot is restored.
#[derive(Debug, Serialize)]
pub struct RestoreSnapshotResponse {
    /// IDs of the domain events raised.
    pub event_ids: Vec<Uuid>,
    /// Every branch as it stands after the restore.
    pub store: BranchCollectionView,
}

/// GET /
#[instrument(skip(state))]
async fn list_branches(
    State(state): State<AppState>,
) -> Result<Json<BranchCollectionView>, ApiError> {
    let store = state.lock_store()?;
    Ok(Json(query_handlers::list_branches(&store)))
}

/// GET /{branch_id}
#[instrument(skip(state))]
async fn get_branch(
    State(state): State<AppState>,
    Path(branch_id): Path<Uuid>,
) -> Result<Json<BranchView>, ApiError> {
    let store = state.lock_store()?;
    let view = query_handlers::get_branch_by_id(branch_id, &store)?;
    Ok(Json(view))
}

/// POST /{branch_id}/advance
#[instrument(skip(state, request), fields(choice_id = %request.choice_id))]
async fn advance_branch(
    State(state): State<AppState>,
    Path(branch_id): Path<Uuid>,
    Json(request): Json<AdvanceBranchRequest>,
) -> Result<Json<BranchCommandResponse>, ApiError> {
    let command = commands::AdvanceBranch {
        correlation_id: Uuid::new_v4(),
        branch_id,
        choice_id: request.choice_id,
    };

    info!(correlation_id = %command.correlation_id, "handling advance_branch command");

    let mut store = state.lock_store()?;
    let result =
        command_handlers::handle_advance_branch(&command, state.clock.as_ref(), &mut store)?;
    let branch = query_handlers::get_branch_by_id(result.branch_id, &store)?;

    Ok(Json(BranchCommandResponse {
        event_ids: result.event_ids(),
        branch,
    }))
}

/// POST /{branch_id}/split
#[instrument(skip(state))]
async fn split_branch(
    State(state): State<AppState>,
    Path(branch_id): Path<Uuid>,
) -> Result<Json<BranchCommandResponse>, ApiError> {
    let command = commands::SplitBranch {
        correlation_id: Uuid::new_v4(),
        branch_id,
    };

    info!(correlation_id = %command.correlation_id, "handling split_branch command");

    let mut store = state.lock_store()?;
    let result = {
        let mut rng = state.lock_rng()?;
        command_handlers::handle_split_branch(
            &command,
            state.clock.as_ref(),
            &mut *rng,
            &mut store,
        )?
    };
    let branch = query_handlers::get_branch_by_id(result.branch_id, &store)?;

    Ok(Json(BranchCommandResponse {
        event_ids: result.event_ids(),
        branch,
    }))
}

/// GET /snapshot
#[instrument(skip(state))]
async fn export_snapshot(
    State(state): State<AppState>,
) -> Result<Json<BranchStoreSnapshot>, ApiError> {
    let store = state.lock_store()?;
    Ok(Json(query_handlers::export_snapshot(&store)))
}

/// PUT /snapshot
#[instrument(skip(state, snapshot), fields(branch_count = snapshot.branches.len()))]
async fn restore_snapshot(
    State(state): State<AppState>,
    Json(snapshot): Json<BranchStoreSnapshot>,
) -> Result<Json<RestoreSnapshotResponse>, ApiError> {
    let command = commands::RestoreSnapshot {
        correlation_id: Uuid::new_v4(),
        snapshot,
    };

    info!(correlation_id = %command.correlation_id, "handling restore_snapshot command");

    let mut store = state.lock_store()?;
    let events =
        command_handlers::handle_restore_snapshot(&command, state.clock.as_ref(), &mut store)?;

    Ok(Json(RestoreSnapshotResponse {
        event_ids: events.iter().map(|event| event.metadata.event_id).collect(),
        store: query_handlers::list_branches(&store),
    }))
}

/// Returns the router for the branching context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_branches))
        .route("/snapshot", get(export_snapshot).put(restore_snapshot))
        .route("/{branch_id}", get(get_branch))
        .route("/{branch_id}/advance", post(advance_branch))
        .route("/{branch_id}/split", post(split_branch))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use observatory_branching::application::command_handlers::handle_open_branch_store;
    use observatory_branching::domain::commands::OpenBranchStore;
    use observatory_core::aggregate::AggregateRoot;
    use observatory_core::clock::Clock;
    use observatory_core::rng::{DeterministicRng, StdRngSource};
    use observatory_narrative::application::loader::load_builtin;
    use observatory_narrative::domain::graph::NarrativeGraph;
    use observatory_test_support::{FixedClock, threshold_graph};
    use serde_json::Value;
    use tower::ServiceExt;

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    fn app_state_with(graph: NarrativeGraph, max_branches: Option<usize>) -> (AppState, Uuid) {
        let mut rng = StdRngSource::seeded(21);
        let command = OpenBranchStore {
            correlation_id: Uuid::new_v4(),
            max_branches,
        };
        let (store, opened) =
            handle_open_branch_store(&command, Arc::new(graph), &fixed_clock(), &mut rng).unwrap();

        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(fixed_clock());
        let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
        (AppState::new(store, clock, rng), opened.branch_id)
    }

    fn test_app_state() -> (AppState, Uuid) {
        app_state_with(load_builtin().unwrap(), None)
    }

    async fn send(
        state: AppState,
        method: &str,
        uri: &str,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router().with_state(state).oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_list_branches_returns_root_on_start_node() {
        // Arrange
        let (state, root) = test_app_state();

        // Act
        let (status, json) = send(state, "GET", "/", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["open_states"], 1);
        let branch = &json["branches"][0];
        assert_eq!(branch["branch_id"], root.to_string());
        assert_eq!(branch["label"], "Timeline A");
        assert_eq!(branch["status"], "open");
        assert_eq!(branch["current_node"]["node_id"], "origin");
        assert_eq!(branch["steps"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_advance_branch_returns_event_and_moved_branch() {
        // Arrange
        let (state, root) = test_app_state();
        let body = serde_json::json!({ "choice_id": "origin-empathy" });

        // Act
        let (status, json) = send(state, "POST", &format!("/{root}/advance"), Some(&body)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let event_ids = json["event_ids"].as_array().unwrap();
        assert_eq!(event_ids.len(), 1);
        Uuid::parse_str(event_ids[0].as_str().unwrap()).unwrap();
        assert_eq!(json["branch"]["current_node"]["node_id"], "empathy");
        assert_eq!(json["branch"]["steps"][0]["choice_id"], "origin-empathy");
    }

    #[tokio::test]
    async fn test_advance_branch_returns_400_for_choice_not_on_current_node() {
        let (state, root) = test_app_state();
        let body = serde_json::json!({ "choice_id": "logic-archive" });

        let (status, json) =
            send(state.clone(), "POST", &format!("/{root}/advance"), Some(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "choice_not_found");
        let store = state.lock_store().unwrap();
        assert_eq!(store.branch(root).unwrap().current_node_id(), Some("origin"));
    }

    #[tokio::test]
    async fn test_advance_branch_returns_404_for_unknown_branch() {
        let (state, _root) = test_app_state();
        let body = serde_json::json!({ "choice_id": "origin-logic" });

        let (status, json) = send(
            state,
            "POST",
            &format!("/{}/advance", Uuid::new_v4()),
            Some(&body),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "branch_not_found");
    }

    #[tokio::test]
    async fn test_advance_branch_returns_422_for_missing_choice() {
        let (state, root) = test_app_state();
        let body = serde_json::json!({});

        let (status, _json) = send(state, "POST", &format!("/{root}/advance"), Some(&body)).await;

        // Axum returns 422 for deserialization failures.
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_advance_on_resolved_branch_returns_no_events() {
        // Arrange
        let (state, root) = app_state_with(threshold_graph(), None);
        let body = serde_json::json!({ "choice_id": "walk-away" });
        let (status, _json) =
            send(state.clone(), "POST", &format!("/{root}/advance"), Some(&body)).await;
        assert_eq!(status, StatusCode::OK);

        // Act
        let (status, json) = send(state, "POST", &format!("/{root}/advance"), Some(&body)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert!(json["event_ids"].as_array().unwrap().is_empty());
        assert_eq!(json["branch"]["status"], "resolved");
        assert_eq!(json["branch"]["headline"], "Resolved Horizon");
        assert!(json["branch"]["current_node"].is_null());
    }

    #[tokio::test]
    async fn test_split_branch_returns_new_labelled_branch() {
        // Arrange
        let (state, root) = test_app_state();

        // Act
        let (status, json) = send(state.clone(), "POST", &format!("/{root}/split"), None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["event_ids"].as_array().unwrap().len(), 1);
        assert_eq!(json["branch"]["label"], "Timeline B");
        assert_ne!(json["branch"]["branch_id"], root.to_string());
        assert_eq!(state.lock_store().unwrap().branches().len(), 2);
    }

    #[tokio::test]
    async fn test_split_branch_returns_409_when_cap_reached() {
        let (state, root) = app_state_with(load_builtin().unwrap(), Some(1));

        let (status, json) = send(state, "POST", &format!("/{root}/split"), None).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "branch_limit_reached");
    }

    #[tokio::test]
    async fn test_get_branch_returns_404_for_unknown_branch() {
        let (state, _root) = test_app_state();

        let (status, json) = send(state, "GET", &format!("/{}", Uuid::new_v4()), None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "branch_not_found");
    }

    #[tokio::test]
    async fn test_export_snapshot_returns_transmitted_form() {
        let (state, root) = test_app_state();

        let (status, json) = send(state, "GET", "/snapshot", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["labelCounter"], 1);
        assert_eq!(json["branches"][0]["id"], root.to_string());
        assert_eq!(json["branches"][0]["currentNodeId"], "origin");
        assert!(json["branches"][0]["path"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_snapshot_rejects_inconsistent_snapshot_and_keeps_store() {
        // Arrange
        let (state, root) = test_app_state();
        let snapshot = serde_json::json!({
            "branches": [{
                "id": Uuid::new_v4(),
                "label": "Timeline A",
                "path": [{ "nodeId": "origin", "choiceId": "origin-logic" }],
                "currentNodeId": "chaos"
            }],
            "labelCounter": 1
        });

        // Act
        let (status, json) = send(state.clone(), "PUT", "/snapshot", Some(&snapshot)).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
        let store = state.lock_store().unwrap();
        assert_eq!(store.branches().len(), 1);
        assert_eq!(store.branches()[0].id(), root);
    }

    #[tokio::test]
    async fn test_restore_snapshot_replaces_branches() {
        let (state, _root) = test_app_state();
        let restored_id = Uuid::new_v4();
        let snapshot = serde_json::json!({
            "branches": [{
                "id": restored_id,
                "label": "Timeline C",
                "path": [{ "nodeId": "origin", "choiceId": "origin-chaos" }],
                "currentNodeId": "chaos"
            }],
            "labelCounter": 3
        });

        let (status, json) = send(state.clone(), "PUT", "/snapshot", Some(&snapshot)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["event_ids"].as_array().unwrap().len(), 1);
        assert_eq!(json["store"]["open_states"], 1);
        assert_eq!(json["store"]["branches"][0]["branch_id"], restored_id.to_string());
        assert_eq!(json["store"]["branches"][0]["headline"], "Entropy Conductors");
        let store = state.lock_store().unwrap();
        assert_eq!(store.label_counter(), 3);
        assert_eq!(store.version(), 2);
    }

    #[tokio::test]
    async fn test_restore_snapshot_over_cap_returns_409_and_keeps_store() {
        // Arrange
        let (state, root) = app_state_with(load_builtin().unwrap(), Some(1));
        let snapshot = serde_json::json!({
            "branches": [
                { "id": Uuid::new_v4(), "label": "Timeline A", "path": [], "currentNodeId": "origin" },
                { "id": Uuid::new_v4(), "label": "Timeline B", "path": [], "currentNodeId": "origin" }
            ],
            "labelCounter": 2
        });

        // Act
        let (status, json) = send(state.clone(), "PUT", "/snapshot", Some(&snapshot)).await;

        // Assert
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "branch_limit_reached");
        let store = state.lock_store().unwrap();
        assert_eq!(store.branches().len(), 1);
        assert_eq!(store.branches()[0].id(), root);
    }
}
