// ABOUTME: Hand-off tools: pseudo-tools that transfer the conversation to a named peer agent.
// ABOUTME: Invoking one returns ToolOutput::Handoff; the runner switches the active agent.

use serde_json::{Value, json};
use switchboard_core::agent::HandoffSpec;

use super::ToolOutput;

/// Transfers control to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffTool {
    pub target: String,
    pub tool_name: String,
    pub description: String,
}

impl HandoffTool {
    pub fn from_spec(spec: &HandoffSpec) -> Self {
        Self {
            target: spec.agent.clone(),
            tool_name: spec.tool_name(),
            description: spec.description.clone(),
        }
    }

    pub fn parameters() -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    pub(crate) fn invoke(&self) -> ToolOutput {
        ToolOutput::Handoff(self.target.clone())
    }
}

/// Tool result recorded in the history when a hand-off happens.
pub fn transfer_message(target: &str) -> String {
    format!("Successfully transferred to {}", target)
}
