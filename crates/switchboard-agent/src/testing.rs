// ABOUTME: Test utilities for switchboard-agent, including a scripted stub LLM client.
// ABOUTME: Used in tests to drive the swarm runner without real API calls.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{AgentError, Completion, CompletionRequest, LlmClient};

/// A stub LLM client that replays pre-configured completions in order and
/// records every request it receives.
///
/// Once the script runs out, further calls fail with a provider error, which
/// also makes it handy for exercising error paths.
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    script: Mutex<VecDeque<Completion>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlmClient {
    pub fn new(script: impl IntoIterator<Item = Completion>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call answers with the same text.
    pub fn replying(text: &str) -> Self {
        Self::new(std::iter::repeat_n(Completion::text(text), 64))
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of scripted completions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, AgentError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self
            .script
            .lock()
            .map_err(|_| AgentError::ProviderError("script lock poisoned".to_string()))?
            .pop_front();
        next.ok_or_else(|| AgentError::ProviderError("scripted client exhausted".to_string()))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}
