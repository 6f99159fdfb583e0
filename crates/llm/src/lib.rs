//! LLM integration crate for CourseQA.
//!
//! This crate provides a provider-agnostic abstraction for chat-style
//! interactions with generative models, including tool calling. A response
//! is either plain text or a set of tool-call requests; the orchestrator in
//! `courseqa-chat` decides what to do with each.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime via `/api/chat` (default)
//!
//! # Example
//! ```no_run
//! use courseqa_llm::{ChatMessage, ChatRequest, LlmClient, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = ChatRequest::new("llama3.2")
//!     .with_messages(vec![ChatMessage::user("What is a vector index?")]);
//! let response = client.chat(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{
    ChatMessage, ChatRequest, ChatResponse, LlmClient, LlmUsage, Role, ToolCall, ToolSchema,
};
pub use factory::create_client;
pub use providers::OllamaClient;
