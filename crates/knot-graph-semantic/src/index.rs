//! Brute-force cosine similarity index over movie description embeddings.
//!
//! Catalogs are a few thousand movies, so a linear scan per query is fast
//! enough and keeps the index a plain serializable list.

use knot_graph_core::MovieId;
use serde::{Deserialize, Serialize};

use crate::Embedding;

/// One indexed movie and its description vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub movie_id: MovieId,
    pub embedding: Embedding,
}

/// A scored search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub movie_id: MovieId,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
}

/// In-memory vector index with brute-force cosine similarity search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Create an empty index expecting vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Insert or replace the embedding for a movie.
    pub fn upsert(&mut self, movie_id: MovieId, embedding: Embedding) {
        debug_assert_eq!(
            embedding.len(),
            self.dimension,
            "dimension mismatch: expected {}, got {}",
            self.dimension,
            embedding.len()
        );
        if let Some(entry) = self.entries.iter_mut().find(|e| e.movie_id == movie_id) {
            entry.embedding = embedding;
        } else {
            self.entries.push(IndexEntry {
                movie_id,
                embedding,
            });
        }
    }

    /// Remove a movie from the index if present.
    pub fn remove(&mut self, movie_id: &MovieId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.movie_id != movie_id);
        self.entries.len() != before
    }

    pub fn get(&self, movie_id: &MovieId) -> Option<&Embedding> {
        self.entries
            .iter()
            .find(|e| &e.movie_id == movie_id)
            .map(|e| &e.embedding)
    }

    pub fn contains(&self, movie_id: &MovieId) -> bool {
        self.get(movie_id).is_some()
    }

    /// The `top_k` entries most similar to `query`, best first.
    ///
    /// A zero-norm query matches nothing.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<SearchHit> {
        self.rank(query, top_k, None)
    }

    /// Like [`search`](Self::search), keeping only hits scoring at least `threshold`.
    pub fn search_above(&self, query: &[f32], top_k: usize, threshold: f32) -> Vec<SearchHit> {
        self.search(query, top_k)
            .into_iter()
            .filter(|h| h.score >= threshold)
            .collect()
    }

    /// The `top_k` movies closest to an indexed movie, excluding the movie
    /// itself. Empty if `movie_id` is not indexed.
    pub fn neighbors_of(&self, movie_id: &MovieId, top_k: usize) -> Vec<SearchHit> {
        match self.get(movie_id) {
            Some(embedding) => self.rank(embedding, top_k, Some(movie_id)),
            None => Vec::new(),
        }
    }

    pub fn movie_ids(&self) -> impl Iterator<Item = &MovieId> + '_ {
        self.entries.iter().map(|e| &e.movie_id)
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    fn rank(&self, query: &[f32], top_k: usize, skip: Option<&MovieId>) -> Vec<SearchHit> {
        let query_norm = l2_norm(query);
        if query_norm == 0.0 {
            return Vec::new();
        }

        let mut scored: Vec<SearchHit> = self
            .entries
            .iter()
            .filter(|entry| Some(&entry.movie_id) != skip)
            .map(|entry| SearchHit {
                movie_id: entry.movie_id.clone(),
                score: cosine_similarity(query, &entry.embedding, query_norm),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        scored
    }
}

// ---------------------------------------------------------------------------
// Math helpers
// ---------------------------------------------------------------------------

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine_similarity(a: &[f32], b: &[f32], a_norm: f32) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let b_norm = l2_norm(b);
    if b_norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot / (a_norm * b_norm)
}
