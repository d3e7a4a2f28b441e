// ABOUTME: Agent execution for switchboard: tools, LLM provider adapters, and the hand-off swarm runner.
// ABOUTME: SwarmRunner compiles a SwarmDefinition into agents that can answer, call tools, or delegate.

pub mod client;
pub mod llm;
pub mod providers;
pub mod runner;
pub mod testing;
pub mod tools;

pub use client::{ClientResolver, ProviderCredentials, create_llm_client};
pub use llm::{AgentError, Completion, CompletionRequest, LlmClient, ToolSchema};
pub use runner::{CompiledAgent, DEFAULT_MAX_STEPS, SwarmRunner, TurnOutcome};
pub use tools::{Tool, ToolError, ToolOutput};
