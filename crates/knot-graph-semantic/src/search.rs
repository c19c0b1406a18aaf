//! Find catalog movies by (approximate) title.
//!
//! Every title is embedded once into its own [`VectorIndex`]. A lookup
//! embeds the typed text the same way and returns catalog movies in the
//! order the index ranks them.

use std::collections::HashMap;
use std::sync::Arc;

use knot_graph_core::{MovieId, MovieNode};
use tracing::debug;

use crate::embedder::{EmbedError, Embedder};
use crate::index::VectorIndex;

/// Results returned when the caller does not pick a limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

#[derive(Debug, Clone)]
pub struct TitleMatch {
    pub movie: MovieNode,
    /// Cosine similarity between the typed text and the title.
    pub score: f32,
}

/// Title index over one catalog.
pub struct TitleSearch {
    embedder: Arc<dyn Embedder>,
    titles: VectorIndex,
    catalog: HashMap<MovieId, MovieNode>,
}

impl TitleSearch {
    /// Embed the title of every movie in `catalog`.
    pub fn build(embedder: Arc<dyn Embedder>, catalog: &[MovieNode]) -> Result<Self, EmbedError> {
        let mut titles = VectorIndex::new(embedder.dimension());
        for movie in catalog {
            titles.upsert(movie.id.clone(), embedder.embed(&movie.title)?);
        }
        debug!(
            model = embedder.model_name(),
            titles = titles.len(),
            "Title index built"
        );

        Ok(Self {
            embedder,
            titles,
            catalog: catalog.iter().map(|m| (m.id.clone(), m.clone())).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Up to `limit` movies whose titles resemble `text`, best first.
    ///
    /// Blank text and titles with nothing in common (similarity ≤ 0) yield
    /// no matches.
    pub fn search(&self, text: &str, limit: usize) -> Result<Vec<TitleMatch>, EmbedError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(text)?;
        let matches: Vec<TitleMatch> = self
            .titles
            .search(&query, limit)
            .into_iter()
            .filter(|hit| hit.score > 0.0)
            .filter_map(|hit| {
                let movie = self.catalog.get(&hit.movie_id)?;
                Some(TitleMatch {
                    movie: movie.clone(),
                    score: hit.score,
                })
            })
            .collect();

        debug!(query = text, matches = matches.len(), "Title search");
        Ok(matches)
    }
}
