//! Query engine: the single entry point for answering questions.
//!
//! Composes session history retrieval, answer generation, source
//! collection, and history update into one operation. Callers never observe
//! intermediate tool rounds, and the sources they receive always belong to
//! exactly this query.

use crate::generator::{AnswerGenerator, GenerationOptions};
use crate::session::{self, SessionStore};
use crate::sources::{SourceCollector, SourceReference};
use crate::tools::{CourseOutlineTool, SearchContentTool, ToolRegistry};
use courseqa_core::AppResult;
use courseqa_knowledge::SemanticIndex;
use courseqa_llm::LlmClient;
use std::sync::Arc;

/// Engine construction options.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Generation loop settings
    pub generation: GenerationOptions,

    /// Conversation exchanges remembered per session
    pub max_history: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            generation: GenerationOptions::default(),
            max_history: 2,
        }
    }
}

/// Answer to one query.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    /// Synthesized answer text
    pub answer: String,

    /// Citations for the content that grounded the answer, in search order
    pub sources: Vec<SourceReference>,

    /// Session the exchange was recorded under
    pub session_id: String,
}

/// Top-level coordinator for course question answering.
pub struct QueryEngine {
    index: Arc<SemanticIndex>,
    registry: Arc<ToolRegistry>,
    generator: AnswerGenerator,
    sessions: SessionStore,
}

impl QueryEngine {
    /// Build an engine with the standard tool set (content search and
    /// course outline) over the given index.
    pub fn new(
        index: Arc<SemanticIndex>,
        client: Arc<dyn LlmClient>,
        options: EngineOptions,
    ) -> AppResult<Self> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SearchContentTool::new(index.clone())))?;
        registry.register(Arc::new(CourseOutlineTool::new(index.clone())))?;

        Ok(Self::with_registry(index, client, registry, options))
    }

    /// Build an engine with a caller-assembled tool registry.
    pub fn with_registry(
        index: Arc<SemanticIndex>,
        client: Arc<dyn LlmClient>,
        registry: ToolRegistry,
        options: EngineOptions,
    ) -> Self {
        Self {
            index,
            registry: Arc::new(registry),
            generator: AnswerGenerator::new(client, options.generation),
            sessions: SessionStore::new(options.max_history),
        }
    }

    /// Answer one question.
    ///
    /// With no `session_id` a fresh session is created; its identifier comes
    /// back in the response so follow-up questions can continue the
    /// conversation. The exchange is recorded only after generation
    /// succeeds, so a failed query leaves history untouched.
    pub async fn query(&self, text: &str, session_id: Option<&str>) -> AppResult<QueryResponse> {
        let session_id = match session_id {
            Some(id) => id.to_string(),
            None => self.sessions.create_session(),
        };

        tracing::info!(session = %session_id, "Processing query");

        let turns = self.sessions.history(&session_id);
        let history = if turns.is_empty() {
            None
        } else {
            Some(session::format_history(&turns))
        };

        let mut sources = SourceCollector::new();
        let answer = self
            .generator
            .generate(text, history.as_deref(), &self.registry, &mut sources)
            .await?;
        let sources = sources.drain();

        self.sessions.append_exchange(&session_id, text, &answer);

        tracing::info!(
            session = %session_id,
            sources = sources.len(),
            "Query answered"
        );

        Ok(QueryResponse {
            answer,
            sources,
            session_id,
        })
    }

    /// The semantic index behind this engine, for loading and stats.
    pub fn index(&self) -> &Arc<SemanticIndex> {
        &self.index
    }

    /// Drop all conversation histories.
    pub fn reset_sessions(&self) {
        self.sessions.reset_all();
    }

    /// Number of sessions holding history.
    pub fn session_count(&self) -> usize {
        self.sessions.session_count()
    }
}
