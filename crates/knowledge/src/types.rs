//! Core data types for the course knowledge base.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One lesson within a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    /// Lesson ordinal, as shown to students
    pub number: u32,

    /// Lesson title
    pub title: String,

    /// Link to the lesson page, when the source material has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_link: Option<String>,
}

/// Course-level metadata.
///
/// The title doubles as the course identifier: chunks reference their owning
/// course by title, and tolerant course-name matching resolves user-supplied
/// names to one of these titles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseMetadata {
    /// Course title (unique within the index)
    pub title: String,

    /// Link to the course page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_link: Option<String>,

    /// Course instructor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,

    /// Ordered lesson list
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl CourseMetadata {
    /// Look up a lesson's link by number.
    pub fn lesson_link(&self, number: u32) -> Option<&str> {
        self.lessons
            .iter()
            .find(|lesson| lesson.number == number)
            .and_then(|lesson| lesson.lesson_link.as_deref())
    }
}

/// Smallest indexed unit of course content.
///
/// Chunks are produced by the external ingestion pipeline and are immutable
/// once indexed; a full reload is the only way to replace them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseChunk {
    /// Title of the owning course
    pub course_title: String,

    /// Owning lesson, if the chunk came from inside a lesson
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_number: Option<u32>,

    /// Position of this chunk within the course
    pub chunk_index: u32,

    /// Chunk text
    pub text: String,

    /// Embedding vector; filled at load time when the record carries none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Per-query constraints on a search. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Restrict to one course, matched tolerantly against indexed titles
    pub course_name: Option<String>,

    /// Restrict to one lesson within the matched course(s)
    pub lesson_number: Option<u32>,
}

impl SearchFilter {
    /// An unconstrained filter.
    pub fn none() -> Self {
        Self::default()
    }

    /// Filter to a course by (possibly partial) name.
    pub fn for_course(course_name: impl Into<String>) -> Self {
        Self {
            course_name: Some(course_name.into()),
            lesson_number: None,
        }
    }

    /// Additionally filter to one lesson.
    pub fn with_lesson(mut self, lesson_number: u32) -> Self {
        self.lesson_number = Some(lesson_number);
        self
    }
}

/// One scored search match.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Chunk text
    pub text: String,

    /// Owning course title
    pub course_title: String,

    /// Owning lesson, when known
    pub lesson_number: Option<u32>,

    /// Cosine similarity against the query
    pub score: f32,
}

/// Ordered search results, best match first.
///
/// An empty result set is a normal value, not an error: it means nothing in
/// the (possibly filtered) corpus scored above the relevance threshold.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
}

impl SearchResults {
    /// An empty result set.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }
}

/// Ingestion record: one course plus its pre-chunked content.
///
/// This is the read-only interface to the external ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDocument {
    pub course: CourseMetadata,

    #[serde(default)]
    pub chunks: Vec<CourseChunk>,
}

/// Index size counters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IndexStats {
    pub courses: usize,
    pub chunks: usize,
}

/// Outcome of loading a directory of course documents.
#[derive(Debug, Clone, Serialize)]
pub struct LoadStats {
    /// Courses newly added to the index
    pub courses_loaded: usize,

    /// Chunks indexed across the added courses
    pub chunks_indexed: usize,

    /// Courses skipped because their title was already indexed
    pub courses_skipped: usize,

    /// Wall-clock duration of the load
    pub duration_secs: f64,

    /// When the load finished
    pub finished_at: DateTime<Utc>,
}
