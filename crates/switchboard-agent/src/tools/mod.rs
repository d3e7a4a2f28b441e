// ABOUTME: The closed set of tools agents can call, each with a name, JSON schema, and invoke contract.
// ABOUTME: Builds an agent's tool list from its ToolKinds plus one hand-off tool per delegation edge.

mod handoff;
mod list_directory;
mod requests;
mod wikipedia;

pub use handoff::{HandoffTool, transfer_message};
pub use list_directory::{ListDirectoryTool, list_directory};
pub use requests::{RequestMethod, RequestTool};
pub use wikipedia::WikipediaTool;

use serde_json::Value;
use switchboard_core::agent::{AgentSpec, ToolKind};

use crate::llm::ToolSchema;

/// Browser-like user agent sent by the HTTP tools.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) \
    Chrome/119.0.0.0 Safari/537.36";

/// Errors raised by tool execution. Underlying errors are carried as-is.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid tool input: {0}")]
    InvalidInput(String),
}

/// Result of a successful tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Data returned to the calling model.
    Text(String),
    /// Transfer control to the named agent.
    Handoff(String),
}

/// A tool an agent can call.
#[derive(Debug, Clone)]
pub enum Tool {
    ListDirectory(ListDirectoryTool),
    Wikipedia(WikipediaTool),
    Request(RequestTool),
    Handoff(HandoffTool),
}

impl Tool {
    pub fn name(&self) -> &str {
        match self {
            Tool::ListDirectory(_) => ListDirectoryTool::NAME,
            Tool::Wikipedia(_) => WikipediaTool::NAME,
            Tool::Request(t) => t.method.tool_name(),
            Tool::Handoff(t) => &t.tool_name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Tool::ListDirectory(_) => ListDirectoryTool::DESCRIPTION,
            Tool::Wikipedia(_) => WikipediaTool::DESCRIPTION,
            Tool::Request(t) => t.method.description(),
            Tool::Handoff(t) => &t.description,
        }
    }

    /// JSON schema of the tool's arguments.
    pub fn parameters(&self) -> Value {
        match self {
            Tool::ListDirectory(_) => ListDirectoryTool::parameters(),
            Tool::Wikipedia(_) => WikipediaTool::parameters(),
            Tool::Request(t) => t.method.parameters(),
            Tool::Handoff(_) => HandoffTool::parameters(),
        }
    }

    pub fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }

    pub fn is_handoff(&self) -> bool {
        matches!(self, Tool::Handoff(_))
    }

    /// Execute the tool with model-supplied arguments.
    pub async fn invoke(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        match self {
            Tool::ListDirectory(t) => t.invoke(&arguments).await,
            Tool::Wikipedia(t) => t.invoke(&arguments).await,
            Tool::Request(t) => t.invoke(&arguments).await,
            Tool::Handoff(t) => Ok(t.invoke()),
        }
    }
}

/// Build the shared HTTP client used by the request and Wikipedia tools.
pub fn http_client() -> Result<reqwest::Client, ToolError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("*/*"),
    );
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Expand one tool kind into concrete tools.
pub fn tools_for_kind(kind: ToolKind, http: &reqwest::Client) -> Vec<Tool> {
    match kind {
        ToolKind::ListDirectory => vec![Tool::ListDirectory(ListDirectoryTool)],
        ToolKind::Wikipedia => vec![Tool::Wikipedia(WikipediaTool::new(http.clone()))],
        ToolKind::Requests => RequestMethod::ALL
            .iter()
            .map(|method| Tool::Request(RequestTool::new(*method, http.clone())))
            .collect(),
    }
}

/// All tools for an agent: its domain tools followed by its hand-off tools.
pub fn tools_for_agent(spec: &AgentSpec, http: &reqwest::Client) -> Vec<Tool> {
    let mut tools: Vec<Tool> = spec
        .tools
        .iter()
        .flat_map(|kind| tools_for_kind(*kind, http))
        .collect();
    tools.extend(
        spec.handoffs
            .iter()
            .map(|h| Tool::Handoff(HandoffTool::from_spec(h))),
    );
    tools
}

/// Pull a required string argument out of a tool call. A bare JSON string is
/// accepted as the value of the single argument.
pub(crate) fn string_arg(arguments: &Value, keys: &[&str]) -> Result<String, ToolError> {
    if let Value::String(s) = arguments {
        return Ok(s.clone());
    }
    keys.iter()
        .find_map(|key| arguments.get(*key).and_then(|v| v.as_str()))
        .map(String::from)
        .ok_or_else(|| ToolError::InvalidInput(format!("missing string argument '{}'", keys[0])))
}
