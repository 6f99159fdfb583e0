//! Deterministic trigram embedding provider.
//!
//! Generates content-dependent vectors from character trigrams and word
//! frequencies. Not semantically accurate like a neural model, but fully
//! offline and deterministic, which makes it the default for development and
//! the test suite. Related texts still land near each other because they
//! share trigrams, so tolerant course-name matching works against it.

use crate::embeddings::provider::EmbeddingProvider;
use courseqa_core::AppResult;
use std::collections::{HashMap, HashSet};

/// Words carrying no topical signal, skipped before hashing.
const STOP_WORDS: [&str; 31] = [
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they",
];

/// Trigram-based embedding provider.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    /// Create a new trigram provider with the given dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Embed one text.
    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
        let lower = text.to_lowercase();

        let words: Vec<&str> = lower
            .split_whitespace()
            .filter(|w| !stop_words.contains(w) && w.len() > 2)
            .collect();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in &words {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            // Character trigrams spread each word over several dimensions
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let dim = (hash_str(&trigram, 37) as usize) % self.dimensions;
                // sqrt scale keeps frequent words from dominating
                embedding[dim] += (*freq as f32).sqrt();
            }

            // Whole word gets one dimension of its own
            let dim = (hash_str(word, 31) as usize) % self.dimensions;
            embedding[dim] += *freq as f32;
        }

        normalize(&mut embedding);
        embedding
    }
}

/// Cheap multiplicative string hash with a caller-chosen multiplier.
fn hash_str(s: &str, multiplier: u64) -> u64 {
    s.bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64))
}

/// Scale a vector to unit length; zero vectors stay zero.
fn normalize(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in embedding.iter_mut() {
            *v /= norm;
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}
