//! Command handlers for the CourseQA CLI.

mod ask;
mod chat;
mod courses;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use courses::CoursesCommand;

use courseqa_chat::{EngineOptions, GenerationOptions, QueryEngine};
use courseqa_core::{AppConfig, AppResult};
use courseqa_knowledge::embeddings::{create_provider, EmbeddingConfig};
use courseqa_knowledge::{loader, SemanticIndex};
use courseqa_llm::create_client;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Build the semantic index and load the course corpus into it.
pub(crate) async fn build_index(
    config: &AppConfig,
    docs: &Path,
) -> AppResult<Arc<SemanticIndex>> {
    let embedding_config = EmbeddingConfig {
        provider: config.embedding_provider.clone(),
        model: config.embedding_model.clone(),
        dimensions: config.embedding_dimensions,
        endpoint: config.endpoint.clone(),
    };
    let embedder = create_provider(&embedding_config)?;

    let index = Arc::new(SemanticIndex::with_top_k(embedder, config.max_results));
    let stats = loader::load_directory(&index, docs).await?;

    tracing::info!(
        courses = stats.courses_loaded,
        chunks = stats.chunks_indexed,
        "Corpus ready"
    );

    Ok(index)
}

/// Build the full query engine: index, model client, tools, sessions.
pub(crate) async fn build_engine(config: &AppConfig, docs: &Path) -> AppResult<QueryEngine> {
    config.validate()?;

    let index = build_index(config, docs).await?;

    let client = create_client(
        &config.provider,
        config.endpoint.as_deref(),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    let options = EngineOptions {
        generation: GenerationOptions {
            model: config.model.clone(),
            max_rounds: config.max_tool_rounds,
            ..GenerationOptions::default()
        },
        max_history: config.max_history,
    };

    QueryEngine::new(index, client, options)
}
