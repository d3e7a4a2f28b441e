// ABOUTME: Route definitions for the switchboard HTTP API.
// ABOUTME: Assembles all API routes into a single Axum Router behind the api-key layer.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::SharedState;
use crate::auth::AuthLayer;

/// Build the complete Axum router. Every /api route requires `api_key`.
pub fn create_router(state: SharedState, api_key: String) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/assistants", get(api::assistants::list_assistants))
        .route("/api/threads", post(api::threads::create_thread))
        .route(
            "/api/threads/{id}",
            get(api::threads::get_thread).delete(api::threads::delete_thread),
        )
        .route("/api/threads/{id}/runs", post(api::runs::create_run))
        .with_state(state)
        .layer(AuthLayer::new(api_key))
        .layer(TraceLayer::new_for_http())
}

/// Health check handler. Returns 200 OK with a simple JSON body.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::AppState;
    use axum::body::Body;
    use http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use switchboard_agent::testing::ScriptedLlmClient;
    use switchboard_agent::{Completion, LlmClient, SwarmRunner, tools};
    use switchboard_core::swarm::SwarmDefinition;
    use tower::ServiceExt;

    const KEY: &str = "secret123";

    fn test_state(client: Arc<ScriptedLlmClient>) -> SharedState {
        let runner = SwarmRunner::compile(
            SwarmDefinition::directory(),
            tools::http_client().unwrap(),
            |_| {
                let client: Arc<dyn LlmClient> = client.clone();
                Ok(client)
            },
        )
        .unwrap();
        Arc::new(AppState::new(runner))
    }

    async fn json_body(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_thread(state: &SharedState) -> String {
        let resp = create_router(Arc::clone(state), KEY.to_string())
            .oneshot(
                Request::post("/api/threads")
                    .header("authorization", KEY)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let json = json_body(resp).await;
        assert_eq!(json["active_agent"], "init_agent");
        json["thread_id"].as_str().unwrap().to_string()
    }

    fn run_request(thread_id: &str, key: Option<&str>, input: &str) -> Request<Body> {
        let mut builder = Request::post(format!("/api/threads/{}/runs", thread_id))
            .header("content-type", "application/json");
        if let Some(key) = key {
            builder = builder.header("authorization", key);
        }
        builder
            .body(Body::from(
                serde_json::to_vec(&json!({ "input": input })).unwrap(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok_without_key() {
        let state = test_state(Arc::new(ScriptedLlmClient::new([])));
        let resp = create_router(state, KEY.to_string())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn run_without_key_never_reaches_agents() {
        let client = Arc::new(ScriptedLlmClient::replying("should not be used"));
        let state = test_state(client.clone());
        let thread_id = create_thread(&state).await;

        for key in [None, Some("wrong-key")] {
            let resp = create_router(Arc::clone(&state), KEY.to_string())
                .oneshot(run_request(&thread_id, key, "hello"))
                .await
                .unwrap();
            assert_eq!(resp.status(), 401);
            let json = json_body(resp).await;
            assert_eq!(json["detail"], "Invalid api key");
        }

        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn run_with_key_hands_off_and_replies() {
        let client = Arc::new(ScriptedLlmClient::new([
            Completion::tool_call("call_1", "transfer_to_wikipedia_agent", json!({})),
            Completion::text("Ferris is the Rust mascot."),
        ]));
        let state = test_state(client.clone());
        let thread_id = create_thread(&state).await;

        let resp = create_router(Arc::clone(&state), KEY.to_string())
            .oneshot(run_request(&thread_id, Some(KEY), "Who is Ferris?"))
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["reply"], "Ferris is the Rust mascot.");
        assert_eq!(json["active_agent"], "wikipedia_agent");
        assert_eq!(json["steps"], 2);
        assert_eq!(json["messages"].as_array().unwrap().len(), 4);
        assert_eq!(client.requests().len(), 2);

        // The thread remembers who is active.
        let resp = create_router(Arc::clone(&state), KEY.to_string())
            .oneshot(
                Request::get(format!("/api/threads/{}", thread_id))
                    .header("authorization", KEY)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["active_agent"], "wikipedia_agent");
        assert_eq!(json["messages"][0]["role"], "human");
    }

    #[tokio::test]
    async fn provider_failure_maps_to_bad_gateway() {
        let state = test_state(Arc::new(ScriptedLlmClient::new([])));
        let thread_id = create_thread(&state).await;

        let resp = create_router(Arc::clone(&state), KEY.to_string())
            .oneshot(run_request(&thread_id, Some(KEY), "hello"))
            .await
            .unwrap();

        assert_eq!(resp.status(), 502);
        let json = json_body(resp).await;
        assert!(json["error"].as_str().unwrap().contains("exhausted"));

        let session = state
            .sessions
            .snapshot(&thread_id.parse().unwrap())
            .await
            .unwrap();
        assert!(session.messages.is_empty());
    }

    #[tokio::test]
    async fn run_rejects_bad_input() {
        let state = test_state(Arc::new(ScriptedLlmClient::new([])));
        let thread_id = create_thread(&state).await;

        for blank in ["", "   \n"] {
            let resp = create_router(Arc::clone(&state), KEY.to_string())
                .oneshot(run_request(&thread_id, Some(KEY), blank))
                .await
                .unwrap();
            assert_eq!(resp.status(), 400);
            let json = json_body(resp).await;
            assert_eq!(json["error"], "input must not be empty");
        }

        let resp = create_router(Arc::clone(&state), KEY.to_string())
            .oneshot(run_request("not-a-ulid", Some(KEY), "hi"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let resp = create_router(Arc::clone(&state), KEY.to_string())
            .oneshot(run_request(&ulid::Ulid::new().to_string(), Some(KEY), "hi"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn delete_thread_then_404() {
        let state = test_state(Arc::new(ScriptedLlmClient::new([])));
        let thread_id = create_thread(&state).await;

        let delete = || {
            Request::delete(format!("/api/threads/{}", thread_id))
                .header("authorization", KEY)
                .body(Body::empty())
                .unwrap()
        };

        let resp = create_router(Arc::clone(&state), KEY.to_string())
            .oneshot(delete())
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);

        let resp = create_router(Arc::clone(&state), KEY.to_string())
            .oneshot(delete())
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn run_queued_behind_delete_finds_thread_gone() {
        let client = Arc::new(ScriptedLlmClient::replying("too late"));
        let state = test_state(client.clone());
        let thread_id = create_thread(&state).await;
        let id: ulid::Ulid = thread_id.parse().unwrap();

        // Simulate a turn in progress on the thread.
        let handle = state.sessions.get(&id).await.unwrap();
        let guard = handle.lock().await;

        let delete = tokio::spawn(
            create_router(Arc::clone(&state), KEY.to_string()).oneshot(
                Request::delete(format!("/api/threads/{}", thread_id))
                    .header("authorization", KEY)
                    .body(Body::empty())
                    .unwrap(),
            ),
        );
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let run = tokio::spawn(
            create_router(Arc::clone(&state), KEY.to_string())
                .oneshot(run_request(&thread_id, Some(KEY), "hello")),
        );
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!delete.is_finished());
        assert!(!run.is_finished());

        drop(guard);

        let resp = delete.await.unwrap().unwrap();
        assert_eq!(resp.status(), 204);

        let resp = run.await.unwrap().unwrap();
        assert_eq!(resp.status(), 404);
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn assistants_lists_agents_and_tools() {
        let state = test_state(Arc::new(ScriptedLlmClient::new([])));
        let resp = create_router(state, KEY.to_string())
            .oneshot(
                Request::get("/api/assistants")
                    .header("authorization", KEY)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["default_active_agent"], "init_agent");
        let agents = json["agents"].as_array().unwrap();
        assert_eq!(agents.len(), 3);
        assert_eq!(agents[0]["name"], "init_agent");
        assert_eq!(
            agents[0]["tools"],
            json!(["transfer_to_wikipedia_agent", "transfer_to_local_directories_agent"])
        );
        assert_eq!(agents[2]["tools"], json!(["list_directory"]));
        assert_eq!(agents[1]["model"], "openai:gpt-4.1-nano");
    }
}
