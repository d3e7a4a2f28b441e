// ABOUTME: OpenAI API adapter implementing the LlmClient trait.
// ABOUTME: Translates conversation history into Chat Completions calls with function calling.

use async_trait::async_trait;
use serde_json::{Value, json};

use switchboard_core::message::{Message, ToolCall};

use crate::llm::{AgentError, Completion, CompletionRequest, LlmClient, ToolSchema};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const MAX_TOKENS: u32 = 4096;

/// OpenAI client. Calls the Chat Completions API and maps `tool_calls`
/// back into provider-neutral ToolCalls.
pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Use an OpenAI-compatible endpoint instead of api.openai.com.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the JSON request body for the Chat Completions API.
    pub fn build_request_body(request: &CompletionRequest) -> Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system.trim().is_empty() {
            messages.push(json!({
                "role": "system",
                "content": request.system
            }));
        }
        messages.extend(request.messages.iter().map(message_to_openai));

        let mut body = json!({
            "model": request.model,
            "max_tokens": MAX_TOKENS,
            "messages": messages,
        });

        if !request.tools.is_empty() {
            body["tools"] = Value::Array(request.tools.iter().map(tool_to_openai).collect());
            body["tool_choice"] = json!("auto");
        }

        body
    }

    /// Parse a Chat Completions response into a Completion.
    pub fn parse_response(response_body: &Value) -> Result<Completion, AgentError> {
        let choices = response_body
            .get("choices")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                AgentError::InvalidResponse("missing choices array in response".to_string())
            })?;

        let choice = choices
            .first()
            .ok_or_else(|| AgentError::InvalidResponse("empty choices array".to_string()))?;

        let message = choice.get("message").ok_or_else(|| {
            AgentError::InvalidResponse("missing message in choice".to_string())
        })?;

        let content = message
            .get("content")
            .and_then(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .map(String::from);

        let tool_calls = match message.get("tool_calls").and_then(|t| t.as_array()) {
            Some(calls) => calls
                .iter()
                .map(parse_openai_tool_call)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Completion {
            content,
            tool_calls,
        })
    }
}

/// Map one history entry to OpenAI's message format.
fn message_to_openai(message: &Message) -> Value {
    match message {
        Message::Human { content } => json!({
            "role": "user",
            "content": content
        }),
        Message::Assistant {
            content,
            tool_calls,
            ..
        } => {
            let mut msg = json!({
                "role": "assistant",
                "content": content
            });
            if !tool_calls.is_empty() {
                msg["tool_calls"] = Value::Array(
                    tool_calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": call.name,
                                    "arguments": call.arguments.to_string()
                                }
                            })
                        })
                        .collect(),
                );
            }
            msg
        }
        Message::Tool {
            tool_call_id,
            content,
            ..
        } => json!({
            "role": "tool",
            "tool_call_id": tool_call_id,
            "content": content
        }),
    }
}

/// Convert a tool schema to OpenAI's function calling format.
fn tool_to_openai(tool: &ToolSchema) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters
        }
    })
}

/// Parse a single tool_call from the OpenAI response.
fn parse_openai_tool_call(tool_call: &Value) -> Result<ToolCall, AgentError> {
    let id = tool_call
        .get("id")
        .and_then(|i| i.as_str())
        .ok_or_else(|| AgentError::InvalidResponse("tool_call missing id".to_string()))?;

    let function = tool_call.get("function").ok_or_else(|| {
        AgentError::InvalidResponse("tool_call missing function".to_string())
    })?;

    let name = function
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| AgentError::InvalidResponse("function missing name".to_string()))?;

    let arguments_str = function
        .get("arguments")
        .and_then(|a| a.as_str())
        .filter(|a| !a.trim().is_empty())
        .unwrap_or("{}");

    let arguments: Value = serde_json::from_str(arguments_str).map_err(|e| {
        AgentError::InvalidResponse(format!("failed to parse function arguments: {}", e))
    })?;

    Ok(ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    })
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, AgentError> {
        let body = Self::build_request_body(request);
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ProviderError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AgentError::RateLimited);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AgentError::ProviderError(
                "Unauthorized: check OPENAI_API_KEY".to_string(),
            ));
        }

        if status.is_server_error() {
            return Err(AgentError::ProviderError(format!(
                "Server error: {}",
                status
            )));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AgentError::ProviderError(format!(
                "API error {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| AgentError::InvalidResponse(format!("failed to parse JSON: {}", e)))?;

        let completion = Self::parse_response(&response_body)?;
        tracing::debug!(
            model = %request.model,
            tool_calls = completion.tool_calls.len(),
            has_text = completion.content.is_some(),
            "openai completion received"
        );
        Ok(completion)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
