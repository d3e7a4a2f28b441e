// ABOUTME: Provider module aggregating LLM client adapters.
// ABOUTME: Each sub-module implements LlmClient for a specific model API.

pub mod openai;

pub use openai::OpenAIClient;
