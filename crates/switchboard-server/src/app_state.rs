// ABOUTME: Shared application state for the switchboard HTTP server.
// ABOUTME: Holds the compiled swarm runner and the in-memory thread sessions.

use std::sync::Arc;

use switchboard_agent::SwarmRunner;
use switchboard_core::session::SessionStore;

/// Shared application state accessible by all Axum handlers.
pub struct AppState {
    pub runner: Arc<SwarmRunner>,
    pub sessions: SessionStore,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create a new AppState around a compiled swarm with no threads yet.
    pub fn new(runner: SwarmRunner) -> Self {
        Self {
            runner: Arc::new(runner),
            sessions: SessionStore::new(),
        }
    }
}
