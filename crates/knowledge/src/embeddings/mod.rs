//! Embedding generation for the course knowledge base.
//!
//! The index treats embedding as a black-box function text -> vector behind
//! the [`EmbeddingProvider`] trait; providers must be deterministic for
//! identical input.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingConfig, EmbeddingProvider};
