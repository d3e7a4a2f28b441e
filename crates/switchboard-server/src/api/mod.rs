// ABOUTME: API handler modules for the switchboard HTTP server.
// ABOUTME: Groups assistant, thread, and run endpoints plus shared error helpers.

pub mod assistants;
pub mod runs;
pub mod threads;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ulid::Ulid;

/// JSON error body with the given status.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

/// Parse a thread id path segment, or produce a 400 response.
pub(crate) fn parse_thread_id(id: &str) -> Result<Ulid, Response> {
    id.parse::<Ulid>()
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "invalid thread id"))
}
