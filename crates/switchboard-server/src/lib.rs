// ABOUTME: HTTP server for switchboard: api-key auth, settings, and the thread/run API.
// ABOUTME: Uses Axum with shared state holding the compiled swarm and thread sessions.

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod routes;

pub use app_state::{AppState, SharedState};
pub use auth::{AuthError, AuthLayer, authenticate};
pub use config::{ConfigError, Settings};
pub use routes::create_router;
