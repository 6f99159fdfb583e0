//! In-memory semantic index over course chunks.
//!
//! Stores embedded content chunks plus course metadata and answers
//! nearest-neighbor queries with optional course/lesson filters. The corpus
//! is read-mostly: courses are added at load time and only a full `clear`
//! removes them, so a single `RwLock` around the state is enough for
//! concurrent queries.

use crate::embeddings::EmbeddingProvider;
use crate::types::{
    CourseChunk, CourseMetadata, IndexStats, SearchFilter, SearchHit, SearchResults,
};
use courseqa_core::{AppError, AppResult};
use std::sync::{Arc, RwLock};

/// Default number of results returned per search.
const DEFAULT_TOP_K: usize = 5;

/// Minimum cosine similarity for a chunk to count as relevant.
/// Suitable for trigram embeddings; neural models can use 0.3-0.5.
const MIN_RELEVANCE_SCORE: f32 = 0.20;

/// One course with its precomputed title embedding for tolerant matching.
struct CourseEntry {
    metadata: CourseMetadata,
    title_embedding: Vec<f32>,
}

#[derive(Default)]
struct IndexState {
    courses: Vec<CourseEntry>,
    chunks: Vec<CourseChunk>,
}

/// Semantic search structure over course content.
pub struct SemanticIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    state: RwLock<IndexState>,
    top_k: usize,
    min_score: f32,
}

impl SemanticIndex {
    /// Create an empty index with default limits.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self::with_limits(embedder, DEFAULT_TOP_K, MIN_RELEVANCE_SCORE)
    }

    /// Create an empty index returning at most `top_k` results per search.
    pub fn with_top_k(embedder: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self::with_limits(embedder, top_k, MIN_RELEVANCE_SCORE)
    }

    /// Create an empty index with explicit top-K and relevance cutoff.
    pub fn with_limits(
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
        min_score: f32,
    ) -> Self {
        Self {
            embedder,
            state: RwLock::new(IndexState::default()),
            top_k,
            min_score,
        }
    }

    /// Add a course and its chunks to the index.
    ///
    /// Chunk records without an embedding are embedded here; records that
    /// already carry one (from an ingestion run that embedded them) are
    /// taken as-is. Returns `false` without touching the index when the
    /// course title is already present.
    pub async fn add_course(
        &self,
        metadata: CourseMetadata,
        mut chunks: Vec<CourseChunk>,
    ) -> AppResult<bool> {
        if self.has_course(&metadata.title) {
            tracing::info!(course = %metadata.title, "Course already indexed, skipping");
            return Ok(false);
        }

        let title_embedding = self.embedder.embed(&metadata.title).await?;

        // Embed only the chunks the ingestion record left unembedded
        let missing: Vec<usize> = chunks
            .iter()
            .enumerate()
            .filter(|(_, chunk)| chunk.embedding.is_none())
            .map(|(i, _)| i)
            .collect();

        if !missing.is_empty() {
            let texts: Vec<String> = missing.iter().map(|&i| chunks[i].text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;
            for (&i, embedding) in missing.iter().zip(embeddings) {
                chunks[i].embedding = Some(embedding);
            }
        }

        let mut state = self.state.write().unwrap();

        // A concurrent load may have won the race for this title
        if state
            .courses
            .iter()
            .any(|entry| entry.metadata.title == metadata.title)
        {
            tracing::info!(course = %metadata.title, "Course already indexed, skipping");
            return Ok(false);
        }

        tracing::info!(
            course = %metadata.title,
            lessons = metadata.lessons.len(),
            chunks = chunks.len(),
            "Indexed course"
        );

        state.courses.push(CourseEntry {
            metadata,
            title_embedding,
        });
        state.chunks.extend(chunks);

        Ok(true)
    }

    /// Search the corpus for chunks matching the query text.
    ///
    /// Results are ordered by descending similarity, capped at top-K, and
    /// cut below the relevance threshold. An unresolvable course name or a
    /// filter matching nothing yields an empty result set, not an error;
    /// `IndexUnavailable` is reserved for a failing embedding backend.
    pub async fn search(&self, query: &str, filter: &SearchFilter) -> AppResult<SearchResults> {
        let course_title = match &filter.course_name {
            Some(name) => match self.resolve_course_name(name).await? {
                Some(title) => Some(title),
                None => {
                    tracing::info!(course = %name, "No course matched filter");
                    return Ok(SearchResults::empty());
                }
            },
            None => None,
        };

        let query_embedding = self.embedder.embed(query).await?;

        let state = self.state.read().unwrap();

        let mut hits: Vec<SearchHit> = state
            .chunks
            .iter()
            .filter(|chunk| match &course_title {
                Some(title) => chunk.course_title == *title,
                None => true,
            })
            .filter(|chunk| match filter.lesson_number {
                Some(lesson) => chunk.lesson_number == Some(lesson),
                None => true,
            })
            .filter_map(|chunk| {
                let embedding = chunk.embedding.as_ref()?;
                let score = cosine_similarity(&query_embedding, embedding);
                Some(SearchHit {
                    text: chunk.text.clone(),
                    course_title: chunk.course_title.clone(),
                    lesson_number: chunk.lesson_number,
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(self.top_k);
        hits.retain(|hit| hit.score >= self.min_score);

        tracing::debug!(
            query_len = query.len(),
            hits = hits.len(),
            top_k = self.top_k,
            "Search completed"
        );

        Ok(SearchResults { hits })
    }

    /// Resolve a user-supplied course name to an indexed title.
    ///
    /// Exact title matches win; otherwise the closest title by embedding
    /// similarity is taken, so typos and partial names still resolve.
    /// Returns `None` when the index holds no plausible match.
    pub async fn resolve_course_name(&self, name: &str) -> AppResult<Option<String>> {
        {
            let state = self.state.read().unwrap();
            if let Some(entry) = state
                .courses
                .iter()
                .find(|entry| entry.metadata.title.eq_ignore_ascii_case(name))
            {
                return Ok(Some(entry.metadata.title.clone()));
            }
            if state.courses.is_empty() {
                return Ok(None);
            }
        }

        let name_embedding = self.embedder.embed(name).await?;

        let state = self.state.read().unwrap();
        let best = state
            .courses
            .iter()
            .map(|entry| {
                (
                    cosine_similarity(&name_embedding, &entry.title_embedding),
                    &entry.metadata.title,
                )
            })
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            Some((score, title)) if score > 0.0 => {
                tracing::debug!(input = %name, resolved = %title, score, "Resolved course name");
                Ok(Some(title.clone()))
            }
            _ => Ok(None),
        }
    }

    /// Metadata for an exactly-titled course, for outline rendering.
    pub fn outline(&self, title: &str) -> Option<CourseMetadata> {
        let state = self.state.read().unwrap();
        state
            .courses
            .iter()
            .find(|entry| entry.metadata.title == title)
            .map(|entry| entry.metadata.clone())
    }

    /// Link for a lesson within a course, when the source material has one.
    pub fn lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String> {
        let state = self.state.read().unwrap();
        state
            .courses
            .iter()
            .find(|entry| entry.metadata.title == course_title)
            .and_then(|entry| entry.metadata.lesson_link(lesson_number))
            .map(str::to_string)
    }

    /// Titles of all indexed courses.
    pub fn course_titles(&self) -> Vec<String> {
        let state = self.state.read().unwrap();
        state
            .courses
            .iter()
            .map(|entry| entry.metadata.title.clone())
            .collect()
    }

    /// Whether a course with this exact title is indexed.
    pub fn has_course(&self, title: &str) -> bool {
        let state = self.state.read().unwrap();
        state
            .courses
            .iter()
            .any(|entry| entry.metadata.title == title)
    }

    /// Index size counters.
    pub fn stats(&self) -> IndexStats {
        let state = self.state.read().unwrap();
        IndexStats {
            courses: state.courses.len(),
            chunks: state.chunks.len(),
        }
    }

    /// Remove every course and chunk.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap();
        state.courses.clear();
        state.chunks.clear();
        tracing::info!("Cleared semantic index");
    }
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use crate::types::Lesson;

    fn test_index() -> SemanticIndex {
        SemanticIndex::new(Arc::new(TrigramProvider::new(384)))
    }

    fn ml_course() -> CourseMetadata {
        CourseMetadata {
            title: "Introduction to Machine Learning".to_string(),
            course_link: Some("https://example.com/ml".to_string()),
            instructor: Some("Ada Lovelace".to_string()),
            lessons: vec![
                Lesson {
                    number: 1,
                    title: "Supervised learning".to_string(),
                    lesson_link: Some("https://example.com/ml/1".to_string()),
                },
                Lesson {
                    number: 2,
                    title: "Gradient descent".to_string(),
                    lesson_link: None,
                },
            ],
        }
    }

    fn ml_chunks() -> Vec<CourseChunk> {
        vec![
            CourseChunk {
                course_title: "Introduction to Machine Learning".to_string(),
                lesson_number: Some(1),
                chunk_index: 0,
                text: "Supervised learning trains a model on labeled examples.".to_string(),
                embedding: None,
            },
            CourseChunk {
                course_title: "Introduction to Machine Learning".to_string(),
                lesson_number: Some(2),
                chunk_index: 1,
                text: "Gradient descent updates model weights using the learning rate."
                    .to_string(),
                embedding: None,
            },
        ]
    }

    fn pottery_course() -> CourseMetadata {
        CourseMetadata {
            title: "Advanced Pottery Techniques".to_string(),
            course_link: None,
            instructor: None,
            lessons: vec![Lesson {
                number: 1,
                title: "Glazing".to_string(),
                lesson_link: None,
            }],
        }
    }

    fn pottery_chunks() -> Vec<CourseChunk> {
        vec![CourseChunk {
            course_title: "Advanced Pottery Techniques".to_string(),
            lesson_number: Some(1),
            chunk_index: 0,
            text: "Glazing seals the clay surface before the final kiln firing.".to_string(),
            embedding: None,
        }]
    }

    #[tokio::test]
    async fn test_add_course_and_stats() {
        let index = test_index();
        let added = index.add_course(ml_course(), ml_chunks()).await.unwrap();
        assert!(added);

        let stats = index.stats();
        assert_eq!(stats.courses, 1);
        assert_eq!(stats.chunks, 2);
    }

    #[tokio::test]
    async fn test_add_course_skips_duplicates() {
        let index = test_index();
        assert!(index.add_course(ml_course(), ml_chunks()).await.unwrap());
        assert!(!index.add_course(ml_course(), ml_chunks()).await.unwrap());
        assert_eq!(index.stats().chunks, 2);
    }

    #[tokio::test]
    async fn test_search_ranks_matching_chunk_first() {
        let index = test_index();
        index.add_course(ml_course(), ml_chunks()).await.unwrap();
        index
            .add_course(pottery_course(), pottery_chunks())
            .await
            .unwrap();

        let results = index
            .search("gradient descent learning rate", &SearchFilter::none())
            .await
            .unwrap();

        assert!(!results.is_empty());
        assert!(results.hits[0].text.contains("Gradient descent"));
        assert_eq!(results.hits[0].lesson_number, Some(2));
    }

    #[tokio::test]
    async fn test_search_respects_lesson_filter() {
        let index = test_index();
        index.add_course(ml_course(), ml_chunks()).await.unwrap();

        let filter = SearchFilter::for_course("Introduction to Machine Learning").with_lesson(1);
        let results = index
            .search("supervised learning labeled examples", &filter)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results.hits[0].lesson_number, Some(1));
    }

    #[tokio::test]
    async fn test_search_empty_for_missing_lesson() {
        let index = test_index();
        index.add_course(ml_course(), ml_chunks()).await.unwrap();

        let filter = SearchFilter::none().with_lesson(99);
        let results = index
            .search("supervised learning", &filter)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_empty_on_empty_index() {
        let index = test_index();
        let results = index
            .search("anything at all", &SearchFilter::none())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_fuzzy_course_resolution() {
        let index = test_index();
        index.add_course(ml_course(), ml_chunks()).await.unwrap();
        index
            .add_course(pottery_course(), pottery_chunks())
            .await
            .unwrap();

        let resolved = index.resolve_course_name("Intro to ML").await.unwrap();
        assert_eq!(
            resolved.as_deref(),
            Some("Introduction to Machine Learning")
        );
    }

    #[tokio::test]
    async fn test_exact_resolution_ignores_case() {
        let index = test_index();
        index.add_course(ml_course(), ml_chunks()).await.unwrap();

        let resolved = index
            .resolve_course_name("introduction to machine learning")
            .await
            .unwrap();
        assert_eq!(
            resolved.as_deref(),
            Some("Introduction to Machine Learning")
        );
    }

    #[tokio::test]
    async fn test_resolution_on_empty_index() {
        let index = test_index();
        let resolved = index.resolve_course_name("Anything").await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_search_with_fuzzy_course_filter() {
        let index = test_index();
        index.add_course(ml_course(), ml_chunks()).await.unwrap();
        index
            .add_course(pottery_course(), pottery_chunks())
            .await
            .unwrap();

        let filter = SearchFilter::for_course("Intro to ML");
        let results = index
            .search("gradient descent learning rate", &filter)
            .await
            .unwrap();

        assert!(!results.is_empty());
        assert!(results
            .hits
            .iter()
            .all(|hit| hit.course_title == "Introduction to Machine Learning"));
    }

    #[tokio::test]
    async fn test_outline_and_lesson_link() {
        let index = test_index();
        index.add_course(ml_course(), ml_chunks()).await.unwrap();

        let outline = index.outline("Introduction to Machine Learning").unwrap();
        assert_eq!(outline.lessons.len(), 2);

        assert_eq!(
            index.lesson_link("Introduction to Machine Learning", 1),
            Some("https://example.com/ml/1".to_string())
        );
        assert_eq!(index.lesson_link("Introduction to Machine Learning", 2), None);
    }

    #[tokio::test]
    async fn test_clear() {
        let index = test_index();
        index.add_course(ml_course(), ml_chunks()).await.unwrap();
        index.clear();
        assert_eq!(index.stats().courses, 0);
        assert_eq!(index.stats().chunks, 0);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![1.0, 0.0, 0.0];
        let d = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&c, &d) - 0.0).abs() < 0.001);

        // Mismatched lengths are treated as no similarity
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
