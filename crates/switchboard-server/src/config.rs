// ABOUTME: Settings loading and validation for the switchboard server.
// ABOUTME: Reads environment variables case-insensitively; the api key is required.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use switchboard_agent::{DEFAULT_MAX_STEPS, ProviderCredentials};
use switchboard_core::swarm::{SwarmDefinition, SwarmError, SwarmVariant};
use thiserror::Error;

const DEFAULT_BIND: &str = "127.0.0.1:2024";

/// Errors that can occur during settings loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API_KEY is not set; refusing to start without an api key")]
    MissingApiKey,

    #[error("SWITCHBOARD_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("SWITCHBOARD_VARIANT is invalid: {0}")]
    InvalidVariant(#[source] SwarmError),

    #[error("SWITCHBOARD_MAX_STEPS must be a positive integer, got '{0}'")]
    InvalidMaxSteps(String),
}

/// Process-wide settings. Built once at startup and passed to consumers.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub bind: SocketAddr,
    pub variant: SwarmVariant,
    pub swarm_file: Option<PathBuf>,
    pub max_steps: usize,
    pub providers: ProviderCredentials,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a local `.env`.
    ///
    /// Environment variables (names are case-insensitive):
    /// - API_KEY: key every API request must present (required)
    /// - SWITCHBOARD_BIND: socket address to bind (default: 127.0.0.1:2024)
    /// - SWITCHBOARD_VARIANT: built-in wiring, `directory` or `single` (default: directory)
    /// - SWITCHBOARD_SWARM_FILE: YAML swarm definition, overrides the variant (optional)
    /// - SWITCHBOARD_MAX_STEPS: model calls allowed per turn (default: 25)
    /// - OPENAI_API_KEY, OPENAI_BASE_URL: openai provider credentials (optional here;
    ///   required once an agent uses an openai model)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Load settings from an explicit set of variables. Unknown names are ignored.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars = normalize(vars);

        let api_key = vars
            .get("API_KEY")
            .filter(|k| !k.is_empty())
            .cloned()
            .ok_or(ConfigError::MissingApiKey)?;

        let bind_str = vars
            .get("SWITCHBOARD_BIND")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let variant = match vars.get("SWITCHBOARD_VARIANT").filter(|v| !v.is_empty()) {
            Some(v) => v.parse().map_err(ConfigError::InvalidVariant)?,
            None => SwarmVariant::default(),
        };

        let swarm_file = vars
            .get("SWITCHBOARD_SWARM_FILE")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let max_steps = match vars.get("SWITCHBOARD_MAX_STEPS").filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidMaxSteps(raw.clone()))?,
            None => DEFAULT_MAX_STEPS,
        };

        let providers = ProviderCredentials {
            openai_api_key: non_empty(&vars, "OPENAI_API_KEY"),
            openai_base_url: non_empty(&vars, "OPENAI_BASE_URL"),
        };

        Ok(Self {
            api_key,
            bind,
            variant,
            swarm_file,
            max_steps,
            providers,
        })
    }

    /// The swarm to serve: the swarm file if one is configured, otherwise the
    /// built-in variant.
    pub fn swarm_definition(&self) -> Result<SwarmDefinition, SwarmError> {
        match &self.swarm_file {
            Some(path) => SwarmDefinition::load(path),
            None => Ok(self.variant.definition()),
        }
    }
}

fn non_empty(vars: &HashMap<String, String>, name: &str) -> Option<String> {
    vars.get(name).filter(|v| !v.is_empty()).cloned()
}

/// Upper-case every name. An exact upper-case name wins over other spellings.
fn normalize<I>(vars: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut map = HashMap::new();
    for (name, value) in vars {
        let upper = name.to_ascii_uppercase();
        if name == upper || !map.contains_key(&upper) {
            map.insert(upper, value);
        }
    }
    map
}
