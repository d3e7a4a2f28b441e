// ABOUTME: Run handler: feeds one human message through the swarm for a thread.
// ABOUTME: Holds the thread's session lock for the whole turn so turns on a thread never interleave.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::api::{error_response, parse_thread_id};
use crate::app_state::SharedState;

/// Body of POST /api/threads/{id}/runs.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub input: String,
}

/// POST /api/threads/{id}/runs - Run one human turn on a thread.
pub async fn create_run(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<RunRequest>,
) -> Response {
    let thread_id = match parse_thread_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if body.input.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "input must not be empty");
    }

    let Some(handle) = state.sessions.get(&thread_id).await else {
        return error_response(StatusCode::NOT_FOUND, "thread not found");
    };

    let mut session = handle.lock().await;
    // The thread may have been deleted while this run waited for the lock.
    if !state.sessions.is_registered(&thread_id, &handle).await {
        return error_response(StatusCode::NOT_FOUND, "thread not found");
    }

    match state.runner.run_turn(&mut session, body.input).await {
        Ok(outcome) => {
            tracing::info!(
                thread_id = %thread_id,
                active_agent = %outcome.active_agent,
                steps = outcome.steps,
                "run completed"
            );
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "thread_id": thread_id.to_string(),
                    "reply": outcome.reply,
                    "active_agent": outcome.active_agent,
                    "steps": outcome.steps,
                    "messages": outcome.new_messages,
                })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(thread_id = %thread_id, error = %e, "run failed");
            let status = if e.is_provider_failure() {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            error_response(status, e.to_string())
        }
    }
}
