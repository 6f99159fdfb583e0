//! Ollama chat provider with tool-calling support.
//!
//! Talks to Ollama's `/api/chat` endpoint, which accepts a tool list and
//! returns either message text or `tool_calls` on the assistant message.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{
    ChatMessage, ChatRequest, ChatResponse, LlmClient, LlmUsage, Role, ToolCall, ToolSchema,
};
use courseqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Ollama chat API request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OllamaTool>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OllamaToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaFunctionCall {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct OllamaTool {
    #[serde(rename = "type")]
    kind: String,
    function: OllamaFunction,
}

#[derive(Debug, Serialize)]
struct OllamaFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

/// Ollama chat API response format.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: String,
    message: OllamaMessage,
    done: bool,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama chat client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client, bounded by the request timeout
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client with default settings.
    ///
    /// Default URL: http://localhost:11434
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_settings(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new Ollama client with a custom base URL and timeout.
    ///
    /// The timeout bounds every chat call; a timed-out call surfaces as a
    /// transport error the orchestrator may retry once.
    pub fn with_settings(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Convert a ChatRequest to Ollama wire format.
    fn to_ollama_request(&self, request: &ChatRequest) -> OllamaChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        // Ollama has no separate system field; it rides as the first message
        if let Some(system) = &request.system {
            messages.push(OllamaMessage {
                role: "system".to_string(),
                content: system.clone(),
                tool_calls: None,
                tool_name: None,
            });
        }

        for message in &request.messages {
            messages.push(convert_message(message));
        }

        let tools = request
            .tools
            .iter()
            .map(|schema| OllamaTool {
                kind: "function".to_string(),
                function: OllamaFunction {
                    name: schema.name.clone(),
                    description: schema.description.clone(),
                    parameters: schema.parameters.clone(),
                },
            })
            .collect();

        OllamaChatRequest {
            model: request.model.clone(),
            messages,
            tools,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }

    /// Convert an Ollama response to a ChatResponse.
    fn convert_response(&self, response: OllamaChatResponse) -> ChatResponse {
        let usage = LlmUsage::new(
            response.prompt_eval_count.unwrap_or(0),
            response.eval_count.unwrap_or(0),
        );

        let tool_calls = response
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        ChatResponse {
            message: ChatMessage {
                role: Role::Assistant,
                content: response.message.content,
                tool_calls,
                tool_name: None,
            },
            model: response.model,
            usage,
            done: response.done,
        }
    }
}

fn convert_message(message: &ChatMessage) -> OllamaMessage {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    let tool_calls = if message.tool_calls.is_empty() {
        None
    } else {
        Some(
            message
                .tool_calls
                .iter()
                .map(|call| OllamaToolCall {
                    function: OllamaFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
                .collect(),
        )
    };

    OllamaMessage {
        role: role.to_string(),
        content: message.content.clone(),
        tool_calls,
        tool_name: message.tool_name.clone(),
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending chat request to Ollama"
        );

        let ollama_request = self.to_ollama_request(request);
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| {
                AppError::GenerationFailed(format!("Failed to send request to Ollama: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::GenerationFailed(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaChatResponse = response.json().await.map_err(|e| {
            AppError::GenerationFailed(format!("Failed to parse Ollama response: {}", e))
        })?;

        tracing::debug!(
            tool_calls = ollama_response
                .message
                .tool_calls
                .as_ref()
                .map(|c| c.len())
                .unwrap_or(0),
            "Received chat response from Ollama"
        );

        Ok(self.convert_response(ollama_response))
    }
}
