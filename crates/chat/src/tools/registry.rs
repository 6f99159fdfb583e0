//! Tool registry: name-keyed dispatch to registered tools.

use crate::sources::SourceCollector;
use crate::tools::Tool;
use courseqa_core::{AppError, AppResult};
use courseqa_llm::ToolSchema;
use std::sync::Arc;

/// Registry mapping tool names to executable handlers.
///
/// Built once at engine construction and immutable afterwards, so it can be
/// shared across concurrent queries without locking. Registration order is
/// preserved in the schema list shown to the model.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its schema name.
    ///
    /// Duplicate names are a wiring bug and rejected outright.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> AppResult<()> {
        let name = tool.schema().name;
        if self.tools.iter().any(|t| t.schema().name == name) {
            return Err(AppError::Config(format!(
                "Tool '{}' is already registered",
                name
            )));
        }

        tracing::debug!(tool = %name, "Registered tool");
        self.tools.push(tool);
        Ok(())
    }

    /// Schemas of every registered tool, in registration order.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|tool| tool.schema()).collect()
    }

    /// Dispatch one invocation by name.
    pub async fn execute(
        &self,
        name: &str,
        args: &serde_json::Value,
        sources: &mut SourceCollector,
    ) -> AppResult<String> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.schema().name == name)
            .ok_or_else(|| AppError::UnknownTool(name.to_string()))?;

        tool.execute(args, sources).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
