//! Shared application state.

use std::sync::{Arc, Mutex, MutexGuard};

use observatory_branching::domain::aggregates::BranchStore;
use observatory_core::clock::Clock;
use observatory_core::error::DomainError;
use observatory_core::rng::DeterministicRng;
use observatory_narrative::domain::graph::NarrativeGraph;

/// Application state shared across all request handlers.
///
/// The store and the generator sit behind plain mutexes: every command runs
/// to completion without awaiting, so a guard never crosses a yield point.
/// When both are needed the store is locked first.
#[derive(Clone)]
pub struct AppState {
    /// The immutable graph the store walks.
    pub graph: Arc<NarrativeGraph>,
    /// The single branch store served by this process.
    pub store: Arc<Mutex<BranchStore>>,
    /// Clock used to stamp events.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Generator for branch identifiers.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
}

impl AppState {
    /// Create new application state around an opened store.
    #[must_use]
    pub fn new(
        store: BranchStore,
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    ) -> Self {
        Self {
            graph: Arc::clone(store.graph()),
            store: Arc::new(Mutex::new(store)),
            clock,
            rng,
        }
    }

    /// Locks the branch store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a previous holder panicked.
    pub fn lock_store(&self) -> Result<MutexGuard<'_, BranchStore>, DomainError> {
        self.store
            .lock()
            .map_err(|_| DomainError::Infrastructure("branch store lock poisoned".to_string()))
    }

    /// Locks the identifier generator.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a previous holder panicked.
    pub fn lock_rng(
        &self,
    ) -> Result<MutexGuard<'_, dyn DeterministicRng + Send + 'static>, DomainError> {
        self.rng
            .lock()
            .map_err(|_| DomainError::Infrastructure("rng lock poisoned".to_string()))
    }
}
