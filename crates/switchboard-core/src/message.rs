// ABOUTME: Conversation message types shared by the swarm runner, providers, and HTTP API.
// ABOUTME: Messages are tagged by role; assistant messages record which agent produced them.

use serde::{Deserialize, Serialize};

/// A single tool invocation requested by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back on the matching tool message.
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// One entry in a conversation's message history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// Input from the human on the other end of the thread.
    Human { content: String },

    /// Output of an agent's model call. Either text, tool calls, or both.
    Assistant {
        agent: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },

    /// Result of executing a tool call, fed back to the model.
    Tool {
        tool_call_id: String,
        name: String,
        content: String,
    },
}

impl Message {
    pub fn human(content: impl Into<String>) -> Self {
        Message::Human {
            content: content.into(),
        }
    }

    pub fn tool(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Message::Tool {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            content: content.into(),
        }
    }

    /// Short role label, used for logging.
    pub fn role(&self) -> &'static str {
        match self {
            Message::Human { .. } => "human",
            Message::Assistant { .. } => "assistant",
            Message::Tool { .. } => "tool",
        }
    }
}
