// ABOUTME: Swarm definitions: the agent list plus the default active agent, with static consistency checks.
// ABOUTME: Provides the built-in "directory" and "single" wirings and YAML loading for custom ones.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::{AgentSpec, HandoffSpec, ModelId, ToolKind};

/// Model used by the built-in wirings.
pub const DEFAULT_MODEL: &str = "openai:gpt-4.1-nano";

const ROUTER_PROMPT: &str = "Your job is to delegate the task to the appropriate agent based on the \
    current state.\n\
    You are not supposed to perform any action on your own.\n\
    You can only delegate the task to the appropriate agent.\n\
    If you are not sure about the task, stop the execution.";

const WIKIPEDIA_PROMPT: &str = "You are a helpful assistant that searches wikipedia";

const LOCAL_DIRECTORIES_PROMPT: &str =
    "You are a helpful assistant that lists the contents of a directory.";

const ASSISTANT_PROMPT: &str = "You are a helpful assistant. You can make HTTP requests \
    to fetch or send data when the user asks for it.";

/// Errors from building, loading, or validating a swarm definition.
#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("swarm has no agents")]
    Empty,

    #[error("agent name must not be empty")]
    EmptyAgentName,

    #[error("duplicate agent name: {0}")]
    DuplicateAgent(String),

    #[error("agent '{agent}' hands off to unknown agent '{target}'")]
    UnknownHandoffTarget { agent: String, target: String },

    #[error("agent '{0}' hands off to itself")]
    SelfHandoff(String),

    #[error("default active agent '{0}' is not registered in the swarm")]
    UnknownDefaultAgent(String),

    #[error("unknown swarm variant '{0}' (expected 'directory' or 'single')")]
    UnknownVariant(String),

    #[error("failed to read swarm file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid swarm definition: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Which built-in wiring to use when no swarm file is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwarmVariant {
    /// Router agent delegating to a Wikipedia agent and a local-directories agent.
    #[default]
    Directory,
    /// One assistant with the HTTP request toolkit and no hand-offs.
    Single,
}

impl SwarmVariant {
    pub fn label(&self) -> &'static str {
        match self {
            SwarmVariant::Directory => "directory",
            SwarmVariant::Single => "single",
        }
    }

    pub fn definition(&self) -> SwarmDefinition {
        match self {
            SwarmVariant::Directory => SwarmDefinition::directory(),
            SwarmVariant::Single => SwarmDefinition::single(),
        }
    }
}

impl FromStr for SwarmVariant {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "directory" | "swarm" => Ok(SwarmVariant::Directory),
            "single" => Ok(SwarmVariant::Single),
            other => Err(SwarmError::UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for SwarmVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The full set of agents plus the agent that is active when a thread starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmDefinition {
    pub agents: Vec<AgentSpec>,
    pub default_active_agent: String,
}

impl SwarmDefinition {
    /// Router + Wikipedia + local-directories wiring.
    pub fn directory() -> Self {
        let model = default_model();

        let init_agent = AgentSpec::new("init_agent", model.clone(), ROUTER_PROMPT)
            .with_handoff(HandoffSpec::new(
                "wikipedia_agent",
                "Transfer the task to the wikipedia agent.",
            ))
            .with_handoff(HandoffSpec::new(
                "local_directories_agent",
                "Transfer the task to the local directories agent.",
            ));

        let wikipedia_agent = AgentSpec::new("wikipedia_agent", model.clone(), WIKIPEDIA_PROMPT)
            .with_tool(ToolKind::Wikipedia);

        let local_directories_agent =
            AgentSpec::new("local_directories_agent", model, LOCAL_DIRECTORIES_PROMPT)
                .with_tool(ToolKind::ListDirectory);

        Self {
            agents: vec![init_agent, wikipedia_agent, local_directories_agent],
            default_active_agent: "init_agent".to_string(),
        }
    }

    /// Single assistant, no delegation.
    pub fn single() -> Self {
        let assistant = AgentSpec::new("assistant", default_model(), ASSISTANT_PROMPT)
            .with_tool(ToolKind::Requests);

        Self {
            agents: vec![assistant],
            default_active_agent: "assistant".to_string(),
        }
    }

    /// Parse a definition from YAML. The result is validated before returning.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SwarmError> {
        let definition: SwarmDefinition = serde_yaml::from_str(yaml)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Read and validate a YAML definition from disk.
    pub fn load(path: &Path) -> Result<Self, SwarmError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| SwarmError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let definition = Self::from_yaml_str(&yaml)?;
        tracing::info!(
            path = %path.display(),
            agents = definition.agents.len(),
            default_active_agent = %definition.default_active_agent,
            "loaded swarm definition"
        );
        Ok(definition)
    }

    /// Check the static wiring: unique names, every hand-off target registered,
    /// and the default active agent registered.
    pub fn validate(&self) -> Result<(), SwarmError> {
        if self.agents.is_empty() {
            return Err(SwarmError::Empty);
        }

        let mut names = HashSet::new();
        for agent in &self.agents {
            if agent.name.trim().is_empty() {
                return Err(SwarmError::EmptyAgentName);
            }
            if !names.insert(agent.name.as_str()) {
                return Err(SwarmError::DuplicateAgent(agent.name.clone()));
            }
        }

        for agent in &self.agents {
            for handoff in &agent.handoffs {
                if handoff.agent == agent.name {
                    return Err(SwarmError::SelfHandoff(agent.name.clone()));
                }
                if !names.contains(handoff.agent.as_str()) {
                    return Err(SwarmError::UnknownHandoffTarget {
                        agent: agent.name.clone(),
                        target: handoff.agent.clone(),
                    });
                }
            }
        }

        if !names.contains(self.default_active_agent.as_str()) {
            return Err(SwarmError::UnknownDefaultAgent(
                self.default_active_agent.clone(),
            ));
        }

        Ok(())
    }

    pub fn agent(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name.as_str()).collect()
    }
}

fn default_model() -> ModelId {
    ModelId::from_str(DEFAULT_MODEL).unwrap_or_else(|_| ModelId::new("openai", "gpt-4.1-nano"))
}
