// ABOUTME: Static agent definitions: name, prompt, model identifier, tool kinds, and hand-off edges.
// ABOUTME: Agents are built once at startup and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Provider used when a model identifier has no `provider:` prefix.
pub const DEFAULT_PROVIDER: &str = "openai";

/// A `provider:model` identifier such as `openai:gpt-4.1-nano`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelId {
    pub provider: String,
    pub model: String,
}

impl ModelId {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

impl FromStr for ModelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model) = match s.split_once(':') {
            Some((provider, model)) => (provider.trim(), model.trim()),
            None => (DEFAULT_PROVIDER, s.trim()),
        };
        if provider.is_empty() || model.is_empty() {
            return Err(format!("invalid model identifier: '{}'", s));
        }
        Ok(Self::new(provider, model))
    }
}

impl TryFrom<String> for ModelId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.model)
    }
}

/// The closed set of domain tool families an agent can be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Generic HTTP toolkit: GET, POST, PATCH, PUT and DELETE.
    Requests,
    /// Wikipedia search and summary lookup.
    Wikipedia,
    /// List the entries of a local directory.
    ListDirectory,
}

impl ToolKind {
    pub fn label(&self) -> &'static str {
        match self {
            ToolKind::Requests => "requests",
            ToolKind::Wikipedia => "wikipedia",
            ToolKind::ListDirectory => "list_directory",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A delegation edge: the owning agent may transfer control to `agent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffSpec {
    pub agent: String,
    pub description: String,
}

impl HandoffSpec {
    pub fn new(agent: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            description: description.into(),
        }
    }

    /// Name under which the hand-off is exposed to the model.
    pub fn tool_name(&self) -> String {
        format!("transfer_to_{}", self.agent)
    }
}

/// One agent in a swarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub prompt: String,
    pub model: ModelId,
    #[serde(default)]
    pub tools: Vec<ToolKind>,
    #[serde(default)]
    pub handoffs: Vec<HandoffSpec>,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, model: ModelId, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            model,
            tools: Vec::new(),
            handoffs: Vec::new(),
        }
    }

    pub fn with_tool(mut self, kind: ToolKind) -> Self {
        self.tools.push(kind);
        self
    }

    pub fn with_handoff(mut self, handoff: HandoffSpec) -> Self {
        self.handoffs.push(handoff);
        self
    }
}
