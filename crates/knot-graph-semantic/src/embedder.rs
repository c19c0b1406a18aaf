//! Text to vector.
//!
//! Description vectors come from an external model and arrive as a prebuilt
//! [`VectorIndex`](crate::VectorIndex). Titles are short enough that a
//! hashed character-trigram embedding matches them well, including typos,
//! so [`TrigramEmbedder`] is built in.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use thiserror::Error;

use crate::Embedding;

#[derive(Debug, Error)]
#[error("embed: {message}")]
pub struct EmbedError {
    pub message: String,
}

impl EmbedError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

/// Turns one passage of text into a vector of fixed dimension.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Embedding, EmbedError>;

    fn dimension(&self) -> usize;

    /// Identifier recorded next to an index built with this embedder.
    fn model_name(&self) -> &str;
}

/// Counts of hashed character trigrams over the lowercased, word-padded text.
///
/// `"Alien"` becomes the trigrams of `" alien "`. Punctuation is dropped and
/// runs of whitespace collapse to one space.
#[derive(Debug, Clone, Copy)]
pub struct TrigramEmbedder {
    dim: usize,
}

impl TrigramEmbedder {
    pub const DEFAULT_DIMENSION: usize = 512;

    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for TrigramEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSION)
    }
}

impl Embedder for TrigramEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
        if self.dim == 0 {
            return Err(EmbedError::new("trigram dimension must be at least 1"));
        }

        let cleaned: String = text
            .chars()
            .flat_map(char::to_lowercase)
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        let words: Vec<&str> = cleaned.split_whitespace().collect();
        let padded: Vec<char> = format!(" {} ", words.join(" ")).chars().collect();

        let mut vector = vec![0.0; self.dim];
        for trigram in padded.windows(3) {
            let mut hasher = DefaultHasher::new();
            trigram.hash(&mut hasher);
            vector[(hasher.finish() % self.dim as u64) as usize] += 1.0;
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        "char-trigram"
    }
}
