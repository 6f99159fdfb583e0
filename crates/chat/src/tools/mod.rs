//! Tools the generative model may invoke during a query.
//!
//! The tool set is closed and explicit: each tool implements [`Tool`] and is
//! registered by name in a [`ToolRegistry`]. Tools receive the per-query
//! [`SourceCollector`](crate::sources::SourceCollector) through `execute`
//! rather than keeping their own citation state, so they stay shareable
//! across concurrent queries.

pub mod outline;
pub mod registry;
pub mod search;

pub use outline::CourseOutlineTool;
pub use registry::ToolRegistry;
pub use search::SearchContentTool;

use crate::sources::SourceCollector;
use courseqa_core::{AppError, AppResult};
use courseqa_llm::ToolSchema;

/// A named, schema-described capability.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Schema presented to the model.
    fn schema(&self) -> ToolSchema;

    /// Run the tool against the given argument object.
    ///
    /// Returns model-consumable text. Argument problems and other
    /// recoverable failures are reported as `AppError::Tool` so the
    /// orchestrator can feed them back to the model; backend outages
    /// propagate as their own variants.
    async fn execute(
        &self,
        args: &serde_json::Value,
        sources: &mut SourceCollector,
    ) -> AppResult<String>;
}

/// Extract a required string argument.
pub(crate) fn required_str<'a>(args: &'a serde_json::Value, key: &str) -> AppResult<&'a str> {
    args.get(key)
        .and_then(|value| value.as_str())
        .ok_or_else(|| AppError::Tool(format!("missing required parameter '{}'", key)))
}

/// Extract an optional string argument.
pub(crate) fn optional_str<'a>(args: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|value| value.as_str())
}

/// Extract an optional non-negative integer argument.
///
/// Models occasionally pass numbers as strings; both forms are accepted.
pub(crate) fn optional_u32(args: &serde_json::Value, key: &str) -> AppResult<Option<u32>> {
    match args.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => {
            if let Some(number) = value.as_u64() {
                return Ok(Some(number as u32));
            }
            if let Some(text) = value.as_str() {
                if let Ok(number) = text.parse::<u32>() {
                    return Ok(Some(number));
                }
            }
            Err(AppError::Tool(format!(
                "parameter '{}' must be a non-negative integer, got {}",
                key, value
            )))
        }
    }
}
