//! LLM provider factory.
//!
//! Creates chat clients from provider names so the rest of the system never
//! references a concrete provider type.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use courseqa_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create a chat client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier (currently "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `timeout` - Per-call timeout for the transport
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let client = OllamaClient::with_settings(base_url, timeout);
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown provider: {}. Supported: ollama",
            provider
        ))),
    }
}
