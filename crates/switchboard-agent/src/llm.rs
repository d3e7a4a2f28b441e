// ABOUTME: Defines the LlmClient trait that all model provider adapters implement.
// ABOUTME: Also defines the provider-neutral request/response shapes and AgentError.

use async_trait::async_trait;
use serde::Serialize;

use switchboard_core::message::{Message, ToolCall};

use crate::tools::ToolError;

/// Errors that can occur while running an agent turn.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    #[error("agent '{agent}' called unknown tool '{tool}'")]
    UnknownTool { agent: String, tool: String },

    #[error("tool '{tool}' failed: {source}")]
    Tool {
        tool: String,
        #[source]
        source: ToolError,
    },

    #[error("turn exceeded the limit of {0} model calls")]
    StepLimitExceeded(usize),
}

impl AgentError {
    /// True when the failure came from the model provider rather than from
    /// tools or swarm wiring.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            AgentError::ProviderError(_) | AgentError::InvalidResponse(_) | AgentError::RateLimited
        )
    }
}

/// Tool description handed to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Everything a provider needs for one model call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Provider-local model name (without the `provider:` prefix).
    pub model: String,
    pub system: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSchema>,
}

/// What a model produced: text, tool calls, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            content: None,
            tool_calls: vec![ToolCall {
                id: id.into(),
                name: name.into(),
                arguments,
            }],
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Trait that all LLM provider adapters must implement.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one model call over the given history and tools.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, AgentError>;

    /// Provider name for logging (e.g. "openai").
    fn provider_name(&self) -> &str;
}
