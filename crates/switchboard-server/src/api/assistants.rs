// ABOUTME: Read-only view of the compiled swarm: agents, their tools, and the default active agent.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::app_state::SharedState;

/// GET /api/assistants - Describe the agents in the swarm.
pub async fn list_assistants(State(state): State<SharedState>) -> Json<Value> {
    let runner = &state.runner;
    let agents: Vec<Value> = runner
        .agents()
        .map(|agent| {
            json!({
                "name": agent.name(),
                "model": agent.spec.model.to_string(),
                "tools": agent.tools.iter().map(|t| t.name()).collect::<Vec<_>>(),
                "handoffs": agent.handoff_targets(),
            })
        })
        .collect();

    Json(json!({
        "default_active_agent": runner.default_active_agent(),
        "max_steps": runner.max_steps(),
        "agents": agents,
    }))
}
