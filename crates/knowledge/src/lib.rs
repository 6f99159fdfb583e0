//! Course knowledge base for CourseQA.
//!
//! Holds the indexed course corpus and answers nearest-neighbor queries over
//! it. Ingestion (parsing and chunking documents) happens elsewhere; this
//! crate consumes pre-chunked course records, embeds what still needs
//! embedding, and serves filtered similarity search with tolerant
//! course-name matching.

pub mod embeddings;
pub mod index;
pub mod loader;
pub mod types;

// Re-export commonly used types
pub use index::SemanticIndex;
pub use types::{
    CourseChunk, CourseDocument, CourseMetadata, IndexStats, Lesson, LoadStats, SearchFilter,
    SearchHit, SearchResults,
};
