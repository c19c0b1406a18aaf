//! Semantic layer for Knot-Graph.
//!
//! Two lookups sit on top of a brute-force cosine index:
//!
//! - title search: typed text to catalog movies, for picking a prompt;
//! - recommendation: a prompt movie grown outward through its description
//!   neighbors, then scored, with the result handed to a new layout.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────┐      ┌────────────────────┐
//! │ TrigramEmbedder  │─────▶│ title index  │─────▶│ TitleSearch        │
//! └──────────────────┘      └──────────────┘      └────────────────────┘
//!
//! ┌──────────────────┐      ┌──────────────┐      ┌────────────────────┐
//! │ description model│─────▶│ VectorIndex  │─────▶│ Recommender        │──▶ layout_candidates
//! │ (external)       │      │ (JSON)       │      │ (expand + score)   │
//! └──────────────────┘      └──────────────┘      └────────────────────┘
//! ```

pub mod embedder;
pub mod index;
pub mod recommend;
pub mod search;

pub use embedder::{EmbedError, Embedder, TrigramEmbedder};
pub use index::{IndexEntry, SearchHit, VectorIndex};
pub use recommend::{
    layout_candidates, relevance_score, RecommendConfig, RecommendError, Recommendation,
    Recommender,
};
pub use search::{TitleMatch, TitleSearch, DEFAULT_SEARCH_LIMIT};

/// Dense floating-point vector representing a text passage in embedding space.
pub type Embedding = Vec<f32>;
