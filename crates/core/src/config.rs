//! Configuration management for CourseQA.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables
//! - Command-line flags
//! - Config file (courseqa.yaml)
//!
//! Precedence, lowest to highest: defaults, config file, environment, CLI.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// This struct holds all options that affect query behavior across
/// components: model provider settings, retrieval limits, session limits,
/// and logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generative model provider (e.g., "ollama")
    pub provider: String,

    /// Model identifier for generation
    pub model: String,

    /// Custom endpoint for the model provider
    pub endpoint: Option<String>,

    /// Embedding provider ("trigram" or "ollama")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Embedding vector dimensions
    pub embedding_dimensions: usize,

    /// Maximum chunks returned per search (top-K)
    pub max_results: usize,

    /// Number of conversation exchanges remembered per session
    pub max_history: usize,

    /// Maximum sequential tool-calling rounds per query
    pub max_tool_rounds: usize,

    /// Timeout for each generative model call, in seconds
    pub request_timeout_secs: u64,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Config file structure (courseqa.yaml).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    embedding: Option<EmbeddingSection>,
    query: Option<QuerySection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuerySection {
    max_results: Option<usize>,
    max_history: Option<usize>,
    max_tool_rounds: Option<usize>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            embedding_provider: "trigram".to_string(),
            embedding_model: "trigram-v1".to_string(),
            embedding_dimensions: 384,
            max_results: 5,
            max_history: 2,
            max_tool_rounds: 2,
            request_timeout_secs: 120,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `COURSEQA_CONFIG`: Path to config file (default: ./courseqa.yaml)
    /// - `COURSEQA_PROVIDER`: Model provider
    /// - `COURSEQA_MODEL`: Model identifier
    /// - `COURSEQA_ENDPOINT`: Custom provider endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("COURSEQA_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Merge YAML config file if one exists
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("courseqa.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("COURSEQA_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("COURSEQA_MODEL") {
            config.model = model;
        }

        if let Ok(endpoint) = std::env::var("COURSEQA_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if let Some(endpoint) = llm.endpoint {
                result.endpoint = Some(endpoint);
            }
        }

        if let Some(embedding) = config_file.embedding {
            if let Some(provider) = embedding.provider {
                result.embedding_provider = provider;
            }
            if let Some(model) = embedding.model {
                result.embedding_model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                result.embedding_dimensions = dimensions;
            }
        }

        if let Some(query) = config_file.query {
            if let Some(max_results) = query.max_results {
                result.max_results = max_results;
            }
            if let Some(max_history) = query.max_history {
                result.max_history = max_history;
            }
            if let Some(max_tool_rounds) = query.max_tool_rounds {
                result.max_tool_rounds = max_tool_rounds;
            }
            if let Some(timeout_secs) = query.timeout_secs {
                result.request_timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate configuration before building the query engine.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["ollama"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        let known_embedders = ["trigram", "ollama"];
        if !known_embedders.contains(&self.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                known_embedders.join(", ")
            )));
        }

        if self.max_results == 0 {
            return Err(AppError::Config(
                "max_results must be at least 1".to_string(),
            ));
        }

        if self.max_tool_rounds == 0 {
            return Err(AppError::Config(
                "max_tool_rounds must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.max_results, 5);
        assert_eq!(config.max_history, 2);
        assert_eq!(config.max_tool_rounds, 2);
        assert!(!config.verbose);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            Some("ollama".to_string()),
            Some("qwen2.5".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "qwen2.5");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let config = AppConfig {
            provider: "unknown".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_results() {
        let config = AppConfig {
            max_results: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_defaults() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_merge_yaml() {
        let dir = std::env::temp_dir().join("courseqa-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("courseqa.yaml");
        std::fs::write(
            &path,
            "llm:\n  model: mistral\nquery:\n  max_results: 3\n  max_tool_rounds: 4\n",
        )
        .unwrap();

        let config = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(config.model, "mistral");
        assert_eq!(config.max_results, 3);
        assert_eq!(config.max_tool_rounds, 4);
        // Untouched fields keep their defaults
        assert_eq!(config.provider, "ollama");

        std::fs::remove_file(&path).ok();
    }
}
