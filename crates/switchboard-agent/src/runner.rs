// ABOUTME: SwarmRunner compiles a SwarmDefinition into runnable agents and drives one human turn at a time.
// ABOUTME: Implements the hand-off protocol: answer, call tools and continue, or transfer to a peer agent.

use std::collections::HashMap;
use std::sync::Arc;

use switchboard_core::agent::{AgentSpec, ModelId};
use switchboard_core::message::Message;
use switchboard_core::session::Session;
use switchboard_core::swarm::SwarmDefinition;

use crate::llm::{AgentError, CompletionRequest, LlmClient};
use crate::tools::{self, Tool, ToolOutput};

/// Model calls allowed per turn before the runner gives up.
pub const DEFAULT_MAX_STEPS: usize = 25;

/// An agent with its tools resolved and its model client attached.
pub struct CompiledAgent {
    pub spec: AgentSpec,
    pub tools: Vec<Tool>,
    client: Arc<dyn LlmClient>,
}

impl CompiledAgent {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn find_tool(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Hand-off targets, in declaration order.
    pub fn handoff_targets(&self) -> Vec<&str> {
        self.spec.handoffs.iter().map(|h| h.agent.as_str()).collect()
    }

    fn request(&self, messages: &[Message]) -> CompletionRequest {
        CompletionRequest {
            model: self.spec.model.model.clone(),
            system: self.spec.prompt.clone(),
            messages: messages.to_vec(),
            tools: self.tools.iter().map(Tool::schema).collect(),
        }
    }
}

/// Result of a committed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Final text of the agent that ended the turn.
    pub reply: String,
    /// Agent that is active after the turn.
    pub active_agent: String,
    /// Messages appended during the turn, starting with the human input.
    pub new_messages: Vec<Message>,
    /// Model calls made.
    pub steps: usize,
}

/// A compiled, invokable swarm.
pub struct SwarmRunner {
    agents: HashMap<String, CompiledAgent>,
    order: Vec<String>,
    default_active_agent: String,
    max_steps: usize,
}

impl SwarmRunner {
    /// Validate the definition, build every agent's tools, and attach a model
    /// client to each agent via `resolve`.
    pub fn compile<F>(
        definition: SwarmDefinition,
        http: reqwest::Client,
        mut resolve: F,
    ) -> Result<Self, anyhow::Error>
    where
        F: FnMut(&ModelId) -> Result<Arc<dyn LlmClient>, anyhow::Error>,
    {
        definition.validate()?;

        let mut agents = HashMap::new();
        let mut order = Vec::with_capacity(definition.agents.len());
        for spec in definition.agents {
            let client = resolve(&spec.model)
                .map_err(|e| anyhow::anyhow!("agent '{}': {}", spec.name, e))?;
            let tools = tools::tools_for_agent(&spec, &http);
            tracing::debug!(
                agent = %spec.name,
                model = %spec.model,
                tools = tools.len(),
                "compiled agent"
            );
            order.push(spec.name.clone());
            agents.insert(spec.name.clone(), CompiledAgent { spec, tools, client });
        }

        tracing::info!(
            agents = order.len(),
            default_active_agent = %definition.default_active_agent,
            "swarm compiled"
        );

        Ok(Self {
            agents,
            order,
            default_active_agent: definition.default_active_agent,
            max_steps: DEFAULT_MAX_STEPS,
        })
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn default_active_agent(&self) -> &str {
        &self.default_active_agent
    }

    pub fn agent(&self, name: &str) -> Option<&CompiledAgent> {
        self.agents.get(name)
    }

    /// Agents in definition order.
    pub fn agents(&self) -> impl Iterator<Item = &CompiledAgent> {
        self.order.iter().filter_map(|name| self.agents.get(name))
    }

    /// Run one human turn against `session`.
    ///
    /// The turn runs on a copy of the session. Only a turn that ends with an
    /// agent reply is written back; on any error the session is unchanged.
    pub async fn run_turn(
        &self,
        session: &mut Session,
        input: impl Into<String>,
    ) -> Result<TurnOutcome, AgentError> {
        let mut working = session.clone();
        let start = working.messages.len();
        working.push(Message::human(input));

        let mut steps = 0;
        loop {
            if steps >= self.max_steps {
                tracing::warn!(
                    thread_id = %working.thread_id,
                    active_agent = %working.active_agent,
                    max_steps = self.max_steps,
                    "turn hit step limit"
                );
                return Err(AgentError::StepLimitExceeded(self.max_steps));
            }
            steps += 1;

            let agent = self
                .agents
                .get(&working.active_agent)
                .ok_or_else(|| AgentError::UnknownAgent(working.active_agent.clone()))?;

            let completion = agent.client.complete(&agent.request(&working.messages)).await?;
            tracing::debug!(
                thread_id = %working.thread_id,
                agent = %agent.name(),
                step = steps,
                tool_calls = completion.tool_calls.len(),
                "model step"
            );

            working.push(Message::Assistant {
                agent: agent.name().to_string(),
                content: completion.content.clone(),
                tool_calls: completion.tool_calls.clone(),
            });

            if completion.tool_calls.is_empty() {
                working.touch();
                let outcome = TurnOutcome {
                    reply: completion.content.unwrap_or_default(),
                    active_agent: working.active_agent.clone(),
                    new_messages: working.messages[start..].to_vec(),
                    steps,
                };
                *session = working;
                return Ok(outcome);
            }

            let mut transferred_to: Option<String> = None;
            for call in completion.tool_calls {
                if let Some(target) = &transferred_to {
                    // Every tool call needs an answer or the provider rejects the history.
                    let note = format!("Not executed: control was transferred to {}", target);
                    working.push(Message::tool(call.id, call.name, note));
                    continue;
                }

                let tool = agent
                    .find_tool(&call.name)
                    .ok_or_else(|| AgentError::UnknownTool {
                        agent: agent.name().to_string(),
                        tool: call.name.clone(),
                    })?;

                let output = tool
                    .invoke(call.arguments)
                    .await
                    .map_err(|source| AgentError::Tool {
                        tool: call.name.clone(),
                        source,
                    })?;

                match output {
                    ToolOutput::Text(text) => {
                        working.push(Message::tool(call.id, call.name, text));
                    }
                    ToolOutput::Handoff(target) => {
                        tracing::info!(
                            thread_id = %working.thread_id,
                            from = %agent.name(),
                            to = %target,
                            "agent hand-off"
                        );
                        working.push(Message::tool(
                            call.id,
                            call.name,
                            tools::transfer_message(&target),
                        ));
                        transferred_to = Some(target);
                    }
                }
            }

            if let Some(target) = transferred_to {
                working.active_agent = target;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Completion;
    use crate::testing::ScriptedLlmClient;
    use serde_json::json;
    use switchboard_core::agent::ToolKind;
    use switchboard_core::swarm::SwarmError;
    use ulid::Ulid;

    fn compile_with(definition: SwarmDefinition, client: Arc<ScriptedLlmClient>) -> SwarmRunner {
        let http = reqwest::Client::new();
        SwarmRunner::compile(definition, http, |_| {
            let client: Arc<dyn LlmClient> = client.clone();
            Ok(client)
        })
        .unwrap()
    }

    fn directory_session(runner: &SwarmRunner) -> Session {
        Session::new(Ulid::new(), runner.default_active_agent())
    }

    #[tokio::test]
    async fn direct_reply_keeps_agent_active() {
        let client = Arc::new(ScriptedLlmClient::new([Completion::text("I can only delegate.")]));
        let runner = compile_with(SwarmDefinition::directory(), client.clone());
        let mut session = directory_session(&runner);

        let outcome = runner.run_turn(&mut session, "hello").await.unwrap();

        assert_eq!(outcome.reply, "I can only delegate.");
        assert_eq!(outcome.active_agent, "init_agent");
        assert_eq!(outcome.steps, 1);
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.active_agent, "init_agent");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        let tool_names: Vec<&str> = requests[0].tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            tool_names,
            vec!["transfer_to_wikipedia_agent", "transfer_to_local_directories_agent"]
        );
        assert_eq!(requests[0].model, "gpt-4.1-nano");
        assert!(requests[0].system.contains("delegate"));
    }

    #[tokio::test]
    async fn handoff_switches_agent_and_target_replies() {
        let client = Arc::new(ScriptedLlmClient::new([
            Completion::tool_call("call_1", "transfer_to_wikipedia_agent", json!({})),
            Completion::text("Rust is a systems programming language."),
        ]));
        let runner = compile_with(SwarmDefinition::directory(), client.clone());
        let mut session = directory_session(&runner);

        let outcome = runner
            .run_turn(&mut session, "What is Rust?")
            .await
            .unwrap();

        assert_eq!(outcome.active_agent, "wikipedia_agent");
        assert_eq!(session.active_agent, "wikipedia_agent");
        assert_eq!(outcome.reply, "Rust is a systems programming language.");
        assert_eq!(outcome.steps, 2);

        // human, router tool call, transfer result, wikipedia reply
        assert_eq!(outcome.new_messages.len(), 4);
        match &outcome.new_messages[2] {
            Message::Tool { content, .. } => {
                assert_eq!(content, "Successfully transferred to wikipedia_agent")
            }
            other => panic!("expected tool message, got {:?}", other),
        }
        match &outcome.new_messages[3] {
            Message::Assistant { agent, .. } => assert_eq!(agent, "wikipedia_agent"),
            other => panic!("expected assistant message, got {:?}", other),
        }

        // The second call was made with the wikipedia agent's prompt and tools.
        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].system.contains("wikipedia"));
        assert_eq!(requests[1].tools.len(), 1);
        assert_eq!(requests[1].tools[0].name, "wikipedia");
    }

    #[tokio::test]
    async fn active_agent_persists_across_turns() {
        let client = Arc::new(ScriptedLlmClient::new([
            Completion::tool_call("call_1", "transfer_to_wikipedia_agent", json!({})),
            Completion::text("first answer"),
            Completion::text("second answer"),
        ]));
        let runner = compile_with(SwarmDefinition::directory(), client.clone());
        let mut session = directory_session(&runner);

        runner.run_turn(&mut session, "one").await.unwrap();
        let outcome = runner.run_turn(&mut session, "two").await.unwrap();

        assert_eq!(outcome.reply, "second answer");
        assert_eq!(outcome.steps, 1);
        let requests = client.requests();
        assert!(requests[2].system.contains("wikipedia"));
        // Full history is presented to the active agent.
        assert_eq!(requests[2].messages.len(), 5);
    }

    #[tokio::test]
    async fn tool_result_feeds_back_into_same_agent() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let client = Arc::new(ScriptedLlmClient::new([
            Completion::tool_call("call_1", "transfer_to_local_directories_agent", json!({})),
            Completion::tool_call(
                "call_2",
                "list_directory",
                json!({ "path": dir.path().to_string_lossy() }),
            ),
            Completion::text("The directory contains notes.txt."),
        ]));
        let runner = compile_with(SwarmDefinition::directory(), client.clone());
        let mut session = directory_session(&runner);

        let outcome = runner
            .run_turn(&mut session, "What's in that folder?")
            .await
            .unwrap();

        assert_eq!(outcome.active_agent, "local_directories_agent");
        assert_eq!(outcome.steps, 3);
        let listing = outcome
            .new_messages
            .iter()
            .find_map(|m| match m {
                Message::Tool { name, content, .. } if name == "list_directory" => Some(content),
                _ => None,
            })
            .unwrap();
        assert_eq!(listing, "[\"notes.txt\"]");

        let requests = client.requests();
        assert!(matches!(
            requests[2].messages.last(),
            Some(Message::Tool { name, .. }) if name == "list_directory"
        ));
    }

    #[tokio::test]
    async fn calls_after_handoff_are_answered_but_not_run() {
        let client = Arc::new(ScriptedLlmClient::new([
            Completion {
                content: None,
                tool_calls: vec![
                    switchboard_core::message::ToolCall {
                        id: "call_1".to_string(),
                        name: "transfer_to_local_directories_agent".to_string(),
                        arguments: json!({}),
                    },
                    switchboard_core::message::ToolCall {
                        id: "call_2".to_string(),
                        name: "transfer_to_wikipedia_agent".to_string(),
                        arguments: json!({}),
                    },
                ],
            },
            Completion::text("done"),
        ]));
        let runner = compile_with(SwarmDefinition::directory(), client);
        let mut session = directory_session(&runner);

        let outcome = runner.run_turn(&mut session, "list /").await.unwrap();

        assert_eq!(outcome.active_agent, "local_directories_agent");
        match &outcome.new_messages[3] {
            Message::Tool {
                tool_call_id,
                content,
                ..
            } => {
                assert_eq!(tool_call_id, "call_2");
                assert!(content.starts_with("Not executed"));
            }
            other => panic!("expected tool message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn tool_error_propagates_and_leaves_session_untouched() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing");

        let client = Arc::new(ScriptedLlmClient::new([
            Completion::tool_call("call_1", "transfer_to_local_directories_agent", json!({})),
            Completion::tool_call(
                "call_2",
                "list_directory",
                json!({ "path": missing.to_string_lossy() }),
            ),
        ]));
        let runner = compile_with(SwarmDefinition::directory(), client);
        let mut session = directory_session(&runner);
        let before = session.clone();

        let err = runner.run_turn(&mut session, "list it").await.unwrap_err();

        match err {
            AgentError::Tool {
                tool,
                source: crate::tools::ToolError::Io(io),
            } => {
                assert_eq!(tool, "list_directory");
                assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected tool io error, got {:?}", other),
        }
        assert_eq!(session.active_agent, before.active_agent);
        assert!(session.messages.is_empty());
    }

    #[tokio::test]
    async fn model_error_propagates_unchanged() {
        let client = Arc::new(ScriptedLlmClient::new([]));
        let runner = compile_with(SwarmDefinition::single(), client);
        let mut session = Session::new(Ulid::new(), "assistant");

        let err = runner.run_turn(&mut session, "hi").await.unwrap_err();
        assert!(matches!(err, AgentError::ProviderError(_)));
        assert!(session.messages.is_empty());
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected() {
        let client = Arc::new(ScriptedLlmClient::new([Completion::tool_call(
            "call_1",
            "list_directory",
            json!({ "path": "." }),
        )]));
        // The router has no list_directory tool.
        let runner = compile_with(SwarmDefinition::directory(), client);
        let mut session = directory_session(&runner);

        let err = runner.run_turn(&mut session, "ls").await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::UnknownTool { ref agent, ref tool } if agent == "init_agent" && tool == "list_directory"
        ));
    }

    #[tokio::test]
    async fn handoff_loop_is_bounded_by_step_limit() {
        let mut definition = SwarmDefinition::directory();
        // Let the wikipedia agent hand back to the router so the two can ping-pong.
        definition.agents[1]
            .handoffs
            .push(switchboard_core::agent::HandoffSpec::new("init_agent", "Back to router."));

        let script = (0..10).map(|i| {
            if i % 2 == 0 {
                Completion::tool_call(format!("c{}", i), "transfer_to_wikipedia_agent", json!({}))
            } else {
                Completion::tool_call(format!("c{}", i), "transfer_to_init_agent", json!({}))
            }
        });
        let client = Arc::new(ScriptedLlmClient::new(script));
        let runner = compile_with(definition, client.clone()).with_max_steps(4);
        let mut session = directory_session(&runner);

        let err = runner.run_turn(&mut session, "loop").await.unwrap_err();
        assert!(matches!(err, AgentError::StepLimitExceeded(4)));
        assert_eq!(client.requests().len(), 4);
        assert_eq!(session.active_agent, "init_agent");
        assert!(session.messages.is_empty());
    }

    #[tokio::test]
    async fn unknown_active_agent_is_an_error() {
        let client = Arc::new(ScriptedLlmClient::replying("hi"));
        let runner = compile_with(SwarmDefinition::single(), client);
        let mut session = Session::new(Ulid::new(), "ghost");

        let err = runner.run_turn(&mut session, "hi").await.unwrap_err();
        assert!(matches!(err, AgentError::UnknownAgent(ref name) if name == "ghost"));
    }

    #[test]
    fn compile_rejects_invalid_definition() {
        let mut definition = SwarmDefinition::directory();
        definition.default_active_agent = "nobody".to_string();

        let result = SwarmRunner::compile(definition, reqwest::Client::new(), |_| {
            let client: Arc<dyn LlmClient> = Arc::new(ScriptedLlmClient::replying("x"));
            Ok(client)
        });
        let err = match result {
            Err(e) => e,
            Ok(_) => panic!("expected invalid definition to be rejected"),
        };
        assert!(matches!(
            err.downcast_ref::<SwarmError>(),
            Some(SwarmError::UnknownDefaultAgent(_))
        ));
    }

    #[test]
    fn compile_reports_client_failures_per_agent() {
        let result = SwarmRunner::compile(SwarmDefinition::single(), reqwest::Client::new(), |_| {
            Err(anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))
        });
        let err = match result {
            Err(e) => e.to_string(),
            Ok(_) => panic!("expected client failure"),
        };
        assert!(err.contains("assistant"));
        assert!(err.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn agents_iterate_in_definition_order() {
        let client = Arc::new(ScriptedLlmClient::replying("x"));
        let runner = compile_with(SwarmDefinition::directory(), client);
        let names: Vec<&str> = runner.agents().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec!["init_agent", "wikipedia_agent", "local_directories_agent"]
        );
        assert_eq!(
            runner.agent("init_agent").unwrap().handoff_targets(),
            vec!["wikipedia_agent", "local_directories_agent"]
        );
        assert_eq!(
            runner.agent("local_directories_agent").unwrap().spec.tools,
            vec![ToolKind::ListDirectory]
        );
        assert_eq!(runner.max_steps(), DEFAULT_MAX_STEPS);
    }
}
