// ABOUTME: Factory for LLM clients keyed by the provider half of a model identifier.
// ABOUTME: ClientResolver caches one client per provider so agents sharing a provider share a client.

use std::collections::HashMap;
use std::sync::Arc;

use switchboard_core::agent::ModelId;

use crate::llm::LlmClient;
use crate::providers::OpenAIClient;

/// Provider credentials, loaded once alongside the rest of the settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    /// `OPENAI_API_KEY`
    pub openai_api_key: Option<String>,
    /// `OPENAI_BASE_URL`
    pub openai_base_url: Option<String>,
}

/// Create an LLM client for the provider named in `model`.
///
/// - openai: needs `openai_api_key`; `openai_base_url` is optional
pub fn create_llm_client(
    model: &ModelId,
    credentials: &ProviderCredentials,
) -> Result<Arc<dyn LlmClient>, anyhow::Error> {
    match model.provider.as_str() {
        "openai" => {
            let api_key = credentials
                .openai_api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY is not set"))?;
            let mut client = OpenAIClient::new(api_key);
            if let Some(base_url) = credentials.openai_base_url.as_deref() {
                client = client.with_base_url(base_url);
            }
            Ok(Arc::new(client))
        }
        unknown => Err(anyhow::anyhow!("unsupported LLM provider: {}", unknown)),
    }
}

/// Resolves model identifiers to clients, creating each provider's client once.
#[derive(Default)]
pub struct ClientResolver {
    credentials: ProviderCredentials,
    clients: HashMap<String, Arc<dyn LlmClient>>,
}

impl ClientResolver {
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self {
            credentials,
            clients: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, model: &ModelId) -> Result<Arc<dyn LlmClient>, anyhow::Error> {
        if let Some(client) = self.clients.get(&model.provider) {
            return Ok(Arc::clone(client));
        }
        let client = create_llm_client(model, &self.credentials)?;
        tracing::info!(provider = %model.provider, "created LLM client");
        self.clients
            .insert(model.provider.clone(), Arc::clone(&client));
        Ok(client)
    }
}
