//! Multi-round answer generation.
//!
//! Drives the exchange with the generative model for one query: the model
//! sees the tool schemas and either answers directly or requests tool calls;
//! requested calls are dispatched through the registry and their results fed
//! back as tool turns. A hard round cap guards against a model that keeps
//! requesting tools: at the cap, the pending calls still run, then a final
//! call with tools disabled produces the answer.

use crate::sources::SourceCollector;
use crate::tools::ToolRegistry;
use courseqa_core::{AppError, AppResult};
use courseqa_llm::{ChatMessage, ChatRequest, ChatResponse, LlmClient, ToolSchema};
use courseqa_prompt::build_system_instruction;
use std::sync::Arc;

/// Knobs for the generation loop.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Model identifier
    pub model: String,

    /// Sampling temperature; factual answering wants it low
    pub temperature: f32,

    /// Maximum tokens per model response
    pub max_tokens: u32,

    /// Maximum sequential tool-calling rounds before the forced final answer
    pub max_rounds: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "llama3.2".to_string(),
            temperature: 0.0,
            max_tokens: 800,
            max_rounds: 2,
        }
    }
}

/// Orchestrates the tool-calling loop for one query at a time.
///
/// Holds no per-query state: the message list, the round counter, and the
/// source collector all live on the stack of `generate`, so one generator
/// serves concurrent queries.
pub struct AnswerGenerator {
    client: Arc<dyn LlmClient>,
    options: GenerationOptions,
}

impl AnswerGenerator {
    pub fn new(client: Arc<dyn LlmClient>, options: GenerationOptions) -> Self {
        Self { client, options }
    }

    /// Generate an answer for a query, letting the model call tools.
    ///
    /// # Arguments
    /// * `query` - The user's question
    /// * `history` - Formatted prior conversation, if any
    /// * `registry` - Tools offered to the model
    /// * `sources` - Per-query citation collector threaded into tools
    pub async fn generate(
        &self,
        query: &str,
        history: Option<&str>,
        registry: &ToolRegistry,
        sources: &mut SourceCollector,
    ) -> AppResult<String> {
        let system = build_system_instruction(history)?;
        let schemas = registry.schemas();

        let mut messages = vec![ChatMessage::user(query)];
        let mut response = self.call_model(&system, &messages, &schemas).await?;

        let mut rounds = 0;
        while response.has_tool_calls() && rounds < self.options.max_rounds {
            rounds += 1;
            self.execute_tool_round(&mut messages, &response, registry, sources)
                .await?;

            // Withhold the schemas on the last allowed round so the model
            // must produce text
            let tools: &[ToolSchema] = if rounds < self.options.max_rounds {
                &schemas
            } else {
                &[]
            };
            response = self.call_model(&system, &messages, tools).await?;
        }

        if response.has_tool_calls() {
            tracing::warn!(
                rounds,
                "Round cap reached with tool calls still pending; forcing final answer"
            );
            self.execute_tool_round(&mut messages, &response, registry, sources)
                .await?;
            response = self.call_model(&system, &messages, &[]).await?;
        }

        tracing::debug!(rounds, "Generation completed");
        Ok(response.text().to_string())
    }

    /// Execute every tool call in a response and append the turns.
    ///
    /// A failing tool becomes an error-string tool result the model can
    /// react to; only backend and wiring failures abort the query.
    async fn execute_tool_round(
        &self,
        messages: &mut Vec<ChatMessage>,
        response: &ChatResponse,
        registry: &ToolRegistry,
        sources: &mut SourceCollector,
    ) -> AppResult<()> {
        messages.push(response.message.clone());

        for call in response.tool_calls() {
            tracing::debug!(tool = %call.name, "Dispatching tool call");

            let result = match registry.execute(&call.name, &call.arguments, sources).await {
                Ok(output) => output,
                Err(err @ AppError::Tool(_)) => {
                    tracing::warn!(tool = %call.name, "Tool failed, feeding error back: {}", err);
                    err.to_string()
                }
                Err(err) => return Err(err),
            };

            messages.push(ChatMessage::tool_result(&call.name, result));
        }

        Ok(())
    }

    /// One model call, retried once on transport failure.
    async fn call_model(
        &self,
        system: &str,
        messages: &[ChatMessage],
        tools: &[ToolSchema],
    ) -> AppResult<ChatResponse> {
        let request = ChatRequest::new(&self.options.model)
            .with_system(system)
            .with_messages(messages.to_vec())
            .with_tools(tools.to_vec())
            .with_temperature(self.options.temperature)
            .with_max_tokens(self.options.max_tokens);

        match self.client.chat(&request).await {
            Ok(response) => Ok(response),
            Err(first) => {
                tracing::warn!("Model call failed, retrying once: {}", first);
                self.client.chat(&request).await.map_err(|retry| match retry {
                    AppError::GenerationFailed(msg) => AppError::GenerationFailed(msg),
                    other => AppError::GenerationFailed(other.to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceReference;
    use crate::tools::Tool;
    use courseqa_llm::{LlmUsage, Role, ToolCall};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn text_response(text: &str) -> ChatResponse {
        ChatResponse {
            message: ChatMessage::assistant(text),
            model: "test".to_string(),
            usage: LlmUsage::default(),
            done: true,
        }
    }

    fn tool_call_response(name: &str, args: serde_json::Value) -> ChatResponse {
        ChatResponse {
            message: ChatMessage::assistant_with_calls(
                "",
                vec![ToolCall {
                    name: name.to_string(),
                    arguments: args,
                }],
            ),
            model: "test".to_string(),
            usage: LlmUsage::default(),
            done: true,
        }
    }

    /// Client that plays back a fixed script and records every request.
    struct ScriptedClient {
        script: Mutex<VecDeque<ChatResponse>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedClient {
        fn new(script: Vec<ChatResponse>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request(&self, i: usize) -> ChatRequest {
            self.requests.lock().unwrap()[i].clone()
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedClient {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AppError::GenerationFailed("script exhausted".to_string()))
        }
    }

    /// Client that requests a tool whenever tools are offered.
    struct AlwaysToolsClient {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl LlmClient for AlwaysToolsClient {
        fn provider_name(&self) -> &str {
            "always-tools"
        }

        async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.tools.is_empty() {
                Ok(text_response("forced final answer"))
            } else {
                Ok(tool_call_response("counter", serde_json::json!({})))
            }
        }
    }

    /// Client that fails a configurable number of times before succeeding.
    struct FlakyClient {
        failures_left: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl LlmClient for FlakyClient {
        fn provider_name(&self) -> &str {
            "flaky"
        }

        async fn chat(&self, _request: &ChatRequest) -> AppResult<ChatResponse> {
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                Err(AppError::GenerationFailed("connection reset".to_string()))
            } else {
                Ok(text_response("recovered"))
            }
        }
    }

    /// Tool that counts executions and records a citation per run.
    struct CounterTool {
        executions: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Tool for CounterTool {
        fn schema(&self) -> courseqa_llm::ToolSchema {
            courseqa_llm::ToolSchema {
                name: "counter".to_string(),
                description: "Counts executions".to_string(),
                parameters: serde_json::json!({"type": "object", "properties": {}}),
            }
        }

        async fn execute(
            &self,
            _args: &serde_json::Value,
            sources: &mut SourceCollector,
        ) -> AppResult<String> {
            let n = self.executions.fetch_add(1, Ordering::SeqCst);
            sources.push(SourceReference::for_chunk("Counter", Some(n as u32), None));
            Ok(format!("execution {}", n))
        }
    }

    /// Tool that always fails with the given error.
    struct FailingTool {
        fatal: bool,
    }

    #[async_trait::async_trait]
    impl Tool for FailingTool {
        fn schema(&self) -> courseqa_llm::ToolSchema {
            courseqa_llm::ToolSchema {
                name: "failing".to_string(),
                description: "Always fails".to_string(),
                parameters: serde_json::json!({"type": "object", "properties": {}}),
            }
        }

        async fn execute(
            &self,
            _args: &serde_json::Value,
            _sources: &mut SourceCollector,
        ) -> AppResult<String> {
            if self.fatal {
                Err(AppError::IndexUnavailable("backend down".to_string()))
            } else {
                Err(AppError::Tool("bad arguments".to_string()))
            }
        }
    }

    fn counter_registry() -> (ToolRegistry, Arc<AtomicUsize>) {
        let executions = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(CounterTool {
                executions: executions.clone(),
            }))
            .unwrap();
        (registry, executions)
    }

    #[tokio::test]
    async fn test_direct_answer_single_call() {
        let client = Arc::new(ScriptedClient::new(vec![text_response("Paris.")]));
        let generator = AnswerGenerator::new(client.clone(), GenerationOptions::default());
        let (registry, executions) = counter_registry();
        let mut sources = SourceCollector::new();

        let answer = generator
            .generate("Capital of France?", None, &registry, &mut sources)
            .await
            .unwrap();

        assert_eq!(answer, "Paris.");
        assert_eq!(client.request_count(), 1);
        assert_eq!(executions.load(Ordering::SeqCst), 0);
        assert!(sources.is_empty());
    }

    #[tokio::test]
    async fn test_single_tool_round() {
        let client = Arc::new(ScriptedClient::new(vec![
            tool_call_response("counter", serde_json::json!({})),
            text_response("Answer built from the tool result."),
        ]));
        let generator = AnswerGenerator::new(client.clone(), GenerationOptions::default());
        let (registry, executions) = counter_registry();
        let mut sources = SourceCollector::new();

        let answer = generator
            .generate("Search something", None, &registry, &mut sources)
            .await
            .unwrap();

        assert_eq!(answer, "Answer built from the tool result.");
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert_eq!(sources.len(), 1);

        // Second request replays assistant turn + tool result
        assert_eq!(client.request_count(), 2);
        let second = client.request(1);
        assert_eq!(second.messages.len(), 3);
        assert_eq!(second.messages[1].role, Role::Assistant);
        assert_eq!(second.messages[2].role, Role::Tool);
        assert_eq!(second.messages[2].content, "execution 0");
    }

    #[tokio::test]
    async fn test_round_cap_forces_final_answer() {
        let client = Arc::new(AlwaysToolsClient {
            calls: AtomicUsize::new(0),
        });
        let generator = AnswerGenerator::new(client.clone(), GenerationOptions::default());
        let (registry, executions) = counter_registry();
        let mut sources = SourceCollector::new();

        let answer = generator
            .generate("keep searching forever", None, &registry, &mut sources)
            .await
            .unwrap();

        assert_eq!(answer, "forced final answer");
        // Exactly the configured cap of tool rounds ran
        assert_eq!(executions.load(Ordering::SeqCst), 2);
        // Initial call + one per round, the last without tools
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_tool_failure_is_injected_not_fatal() {
        let client = Arc::new(ScriptedClient::new(vec![
            tool_call_response("failing", serde_json::json!({})),
            text_response("I could not look that up."),
        ]));
        let generator = AnswerGenerator::new(client.clone(), GenerationOptions::default());
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(FailingTool { fatal: false }))
            .unwrap();
        let mut sources = SourceCollector::new();

        let answer = generator
            .generate("try the broken tool", None, &registry, &mut sources)
            .await
            .unwrap();

        assert_eq!(answer, "I could not look that up.");

        let second = client.request(1);
        let tool_turn = &second.messages[2];
        assert_eq!(tool_turn.role, Role::Tool);
        assert!(tool_turn.content.contains("Tool execution failed"));
        assert!(tool_turn.content.contains("bad arguments"));
    }

    #[tokio::test]
    async fn test_backend_failure_is_fatal() {
        let client = Arc::new(ScriptedClient::new(vec![tool_call_response(
            "failing",
            serde_json::json!({}),
        )]));
        let generator = AnswerGenerator::new(client, GenerationOptions::default());
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(FailingTool { fatal: true }))
            .unwrap();
        let mut sources = SourceCollector::new();

        let result = generator
            .generate("try the broken backend", None, &registry, &mut sources)
            .await;
        assert!(matches!(result, Err(AppError::IndexUnavailable(_))));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_fatal() {
        let client = Arc::new(ScriptedClient::new(vec![tool_call_response(
            "ghost",
            serde_json::json!({}),
        )]));
        let generator = AnswerGenerator::new(client, GenerationOptions::default());
        let registry = ToolRegistry::new();
        let mut sources = SourceCollector::new();

        let result = generator
            .generate("call a ghost", None, &registry, &mut sources)
            .await;
        assert!(matches!(result, Err(AppError::UnknownTool(_))));
    }

    #[tokio::test]
    async fn test_transport_retry_recovers() {
        let client = Arc::new(FlakyClient {
            failures_left: AtomicUsize::new(1),
        });
        let generator = AnswerGenerator::new(client, GenerationOptions::default());
        let (registry, _) = counter_registry();
        let mut sources = SourceCollector::new();

        let answer = generator
            .generate("flaky transport", None, &registry, &mut sources)
            .await
            .unwrap();
        assert_eq!(answer, "recovered");
    }

    #[tokio::test]
    async fn test_transport_exhaustion_is_generation_failed() {
        let client = Arc::new(FlakyClient {
            failures_left: AtomicUsize::new(2),
        });
        let generator = AnswerGenerator::new(client, GenerationOptions::default());
        let (registry, _) = counter_registry();
        let mut sources = SourceCollector::new();

        let result = generator
            .generate("dead transport", None, &registry, &mut sources)
            .await;
        assert!(matches!(result, Err(AppError::GenerationFailed(_))));
    }

    #[tokio::test]
    async fn test_history_lands_in_system_instruction() {
        let client = Arc::new(ScriptedClient::new(vec![text_response("ok")]));
        let generator = AnswerGenerator::new(client.clone(), GenerationOptions::default());
        let (registry, _) = counter_registry();
        let mut sources = SourceCollector::new();

        generator
            .generate(
                "follow-up question",
                Some("User: hi\nAssistant: hello"),
                &registry,
                &mut sources,
            )
            .await
            .unwrap();

        let request = client.request(0);
        let system = request.system.unwrap();
        assert!(system.contains("Previous conversation:"));
        assert!(system.contains("User: hi"));
    }
}
