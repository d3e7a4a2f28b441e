// ABOUTME: Thread lifecycle handlers: create, inspect, and delete conversation sessions.
// ABOUTME: New threads start with the swarm's default active agent and an empty history.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::{error_response, parse_thread_id};
use crate::app_state::SharedState;

/// POST /api/threads - Start a new conversation.
pub async fn create_thread(State(state): State<SharedState>) -> Response {
    let session = state
        .sessions
        .create(state.runner.default_active_agent())
        .await;

    tracing::info!(thread_id = %session.thread_id, "thread created");

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "thread_id": session.thread_id.to_string(),
            "active_agent": session.active_agent,
        })),
    )
        .into_response()
}

/// GET /api/threads/{id} - Return the thread's active agent and history.
pub async fn get_thread(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let thread_id = match parse_thread_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.sessions.snapshot(&thread_id).await {
        Some(session) => (StatusCode::OK, Json(session)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "thread not found"),
    }
}

/// DELETE /api/threads/{id} - Discard a thread.
pub async fn delete_thread(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let thread_id = match parse_thread_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if state.sessions.remove(&thread_id).await {
        tracing::info!(thread_id = %thread_id, "thread deleted");
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, "thread not found")
    }
}
