//! Error types for CourseQA.
//!
//! A single error enum covers every failure category in the system. The
//! variants mirror how failures propagate: backend and transport failures are
//! fatal for the query that hit them, while tool execution failures are
//! recoverable and get fed back into the model's context.

use thiserror::Error;

/// Unified error type for CourseQA.
///
/// All fallible functions return `Result<T, AppError>`. We never panic —
/// errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Retrieval backend unreachable. Fatal for the query that hit it.
    #[error("Semantic index unavailable: {0}")]
    IndexUnavailable(String),

    /// Dispatch to a tool name nothing registered. Indicates a wiring bug,
    /// not a runtime condition.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Model transport exhausted its retry. Fatal for the query.
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A tool ran and failed. The orchestrator injects this into the model's
    /// context as a tool result instead of aborting the query.
    #[error("Tool execution failed: {0}")]
    Tool(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::UnknownTool("lookup_grades".to_string());
        assert_eq!(err.to_string(), "Unknown tool: lookup_grades");

        let err = AppError::Tool("query parameter missing".to_string());
        assert!(err.to_string().starts_with("Tool execution failed:"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: AppError = parse_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
