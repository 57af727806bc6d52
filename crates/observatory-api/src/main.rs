//! Quantum Choice Observatory API server entry point.

use std::error::Error;
use std::sync::{Arc, Mutex};

use observatory_api::config::AppConfig;
use observatory_api::error::AppError;
use observatory_api::state::AppState;
use observatory_branching::application::command_handlers::handle_open_branch_store;
use observatory_branching::domain::commands::OpenBranchStore;
use observatory_core::clock::{Clock, SystemClock};
use observatory_core::rng::{DeterministicRng, StdRngSource};
use observatory_narrative::application::loader::{load_builtin, load_from_path};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Quantum Choice Observatory API server");

    // Read configuration from environment.
    let config = AppConfig::from_env()?;

    // Load the narrative graph.
    let graph = match &config.narrative_path {
        Some(path) => load_from_path(path),
        None => load_builtin(),
    }
    .map_err(AppError::Content)?;

    // Open the branch store with its root timeline.
    let mut rng = config
        .branch_seed
        .map_or_else(StdRngSource::from_entropy, StdRngSource::seeded);
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let command = OpenBranchStore {
        correlation_id: Uuid::new_v4(),
        max_branches: config.max_branches,
    };
    let (store, opened) =
        handle_open_branch_store(&command, Arc::new(graph), clock.as_ref(), &mut rng)
            .map_err(AppError::Content)?;
    tracing::info!(
        store_id = %opened.aggregate_id,
        root_branch_id = %opened.branch_id,
        max_branches = ?config.max_branches,
        seeded = config.branch_seed.is_some(),
        "branch store opened"
    );

    // Build application state and router.
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    let app = observatory_api::app_router(AppState::new(store, clock, rng));

    // Start server.
    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(AppError::Server)?;

    axum::serve(listener, app).await.map_err(AppError::Server)?;

    Ok(())
}
