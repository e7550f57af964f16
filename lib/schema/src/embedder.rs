//! Text embedding backends
//!
//! Defines the [`TextEmbedder`] trait that text spaces call into, plus the
//! default deterministic hashing embedder. The hashing embedder maps
//! character trigrams and whole words to vector positions, seeded by the
//! model identity, so distinct model names produce distinct vector layouts
//! and identical text always embeds identically.

use rankx_core::{Result, Vector};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Default dimension for text embeddings
pub const DEFAULT_TEXT_DIM: usize = 64;

/// A backend that turns text into a fixed-dimension dense vector
///
/// `embed` is a blocking call and may be slow (model load, inference).
/// Implementations that reach external resources fail with
/// `Error::EmbeddingUnavailable`; text spaces memoize results per instance
/// so repeated text is embedded once. Deterministic output for identical
/// input is part of the contract.
pub trait TextEmbedder: Send + Sync {
    /// Identity of the underlying model, pinned at construction
    fn model(&self) -> &str;

    /// Output dimension, fixed per instance
    fn dim(&self) -> usize;

    /// Embed one text into a vector of `dim()` components
    fn embed(&self, text: &str) -> Result<Vector>;
}

/// Deterministic hash-based text embedder
///
/// Trigrams and words hash to vector positions; words contribute more than
/// trigrams. Vectors are unit-normalized, so cosine similarity between two
/// texts reflects their trigram/word overlap.
#[derive(Debug, Clone)]
pub struct HashingTextEmbedder {
    model: String,
    dim: usize,
}

impl HashingTextEmbedder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            dim: DEFAULT_TEXT_DIM,
        }
    }

    #[must_use]
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    fn position(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        self.model.hash(&mut hasher);
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dim
    }
}

impl TextEmbedder for HashingTextEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        let mut components = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();
        if normalized.trim().is_empty() {
            return Ok(Vector::new(components));
        }

        for trigram in generate_trigrams(&normalized) {
            components[self.position(&trigram)] += 1.0;
        }

        // Words contribute more than trigrams
        for word in normalized.split_whitespace() {
            components[self.position(word)] += 2.0;
        }

        let mut vector = Vector::new(components);
        vector.normalize();
        Ok(vector)
    }
}

/// Generate padded character trigrams from a string
fn generate_trigrams(s: &str) -> Vec<String> {
    let padded = format!("  {}  ", s);
    let chars: Vec<char> = padded.chars().collect();

    if chars.len() < 3 {
        return Vec::new();
    }

    chars
        .windows(3)
        .map(|w| w.iter().collect::<String>())
        .collect()
}
