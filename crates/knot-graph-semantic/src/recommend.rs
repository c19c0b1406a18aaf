//! Recommendations grown outward from a prompt movie.
//!
//! The prompt's nearest neighbors in description space are collected, then
//! the neighbors of those, for a configurable number of steps. Every movie
//! reached is scored against the prompt on four signals:
//!
//! | Signal      | Weight | Value                                            |
//! |-------------|--------|--------------------------------------------------|
//! | similarity  | 0.5    | mean cosine similarity over every time reached   |
//! | genres      | 0.1    | shared genres / prompt genres                    |
//! | ratings     | 0.3    | (critics + audience) / 200                       |
//! | release     | 0.2    | 1 − \|Δyear\| / 100, or 0 when a year is missing |

use std::collections::{BTreeMap, HashMap, HashSet};

use knot_graph_core::{MovieId, MovieNode};
use thiserror::Error;
use tracing::debug;

use crate::index::VectorIndex;

const SIMILARITY_WEIGHT: f64 = 0.5;
const GENRE_WEIGHT: f64 = 0.1;
const RATING_WEIGHT: f64 = 0.3;
const RELEASE_WEIGHT: f64 = 0.2;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("movie {0} is not in the catalog")]
    UnknownMovie(MovieId),

    #[error("movie {0} has no embedding in the index")]
    NotIndexed(MovieId),
}

/// How far the neighbor search reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendConfig {
    /// Neighbors requested per movie.
    pub neighbors: usize,
    /// Expansion rounds after the prompt's own neighbors.
    pub steps: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            neighbors: 10,
            steps: 2,
        }
    }
}

/// One ranked candidate.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub movie: MovieNode,
    pub score: f64,
    /// Mean similarity over all the times the movie was reached.
    pub similarity: f64,
    /// How many times the movie was reached.
    pub hits: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Recommender {
    config: RecommendConfig,
}

impl Recommender {
    pub fn new(config: RecommendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> RecommendConfig {
        self.config
    }

    /// Rank catalog movies related to `prompt`, best first.
    ///
    /// The prompt itself never appears in the result. Movies reached through
    /// the index but absent from `catalog` are skipped.
    pub fn recommend(
        &self,
        prompt: &MovieId,
        catalog: &[MovieNode],
        index: &VectorIndex,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let by_id: HashMap<&MovieId, &MovieNode> = catalog.iter().map(|m| (&m.id, m)).collect();
        let prompt_movie = by_id
            .get(prompt)
            .copied()
            .ok_or_else(|| RecommendError::UnknownMovie(prompt.clone()))?;
        if !index.contains(prompt) {
            return Err(RecommendError::NotIndexed(prompt.clone()));
        }

        let reached = self.collect_neighbors(prompt, index);

        let mut ranked: Vec<Recommendation> = reached
            .into_iter()
            .filter(|(id, _)| id != prompt)
            .filter_map(|(id, similarities)| {
                let Some(movie) = by_id.get(&id) else {
                    debug!(movie = %id, "Skipping indexed movie missing from catalog");
                    return None;
                };
                let similarity = mean(&similarities);
                Some(Recommendation {
                    score: relevance_score(prompt_movie, movie, similarity),
                    movie: (*movie).clone(),
                    similarity,
                    hits: similarities.len(),
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.movie.id.cmp(&b.movie.id))
        });

        debug!(prompt = %prompt, candidates = ranked.len(), "Recommendations ranked");
        Ok(ranked)
    }

    /// Every movie reached from `prompt`, with one similarity per arrival.
    ///
    /// Each movie is expanded at most once.
    fn collect_neighbors(&self, prompt: &MovieId, index: &VectorIndex) -> BTreeMap<MovieId, Vec<f32>> {
        let mut reached: BTreeMap<MovieId, Vec<f32>> = BTreeMap::new();
        let mut expanded: HashSet<MovieId> = HashSet::from([prompt.clone()]);
        let mut frontier = Vec::new();

        for hit in index.neighbors_of(prompt, self.config.neighbors) {
            frontier.push(hit.movie_id.clone());
            reached.entry(hit.movie_id).or_default().push(hit.score);
        }

        for step in 0..self.config.steps {
            let mut next = Vec::new();
            for id in frontier {
                if !expanded.insert(id.clone()) {
                    continue;
                }
                for hit in index.neighbors_of(&id, self.config.neighbors) {
                    next.push(hit.movie_id.clone());
                    reached.entry(hit.movie_id).or_default().push(hit.score);
                }
            }
            debug!(step, reached = reached.len(), "Neighbor expansion");
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        reached
    }
}

/// Weighted relevance of `movie` to `prompt` given their mean similarity.
pub fn relevance_score(prompt: &MovieNode, movie: &MovieNode, similarity: f64) -> f64 {
    let genres = if prompt.genres.is_empty() {
        0.0
    } else {
        prompt.genres.intersection(&movie.genres).count() as f64 / prompt.genres.len() as f64
    };

    let ratings = (f64::from(movie.critics_rating.unwrap_or(0))
        + f64::from(movie.audience_rating.unwrap_or(0)))
        / 200.0;

    let release = match (prompt.release_year, movie.release_year) {
        (Some(a), Some(b)) => 1.0 - f64::from((a - b).abs()) / 100.0,
        _ => 0.0,
    };

    SIMILARITY_WEIGHT * similarity
        + GENRE_WEIGHT * genres
        + RATING_WEIGHT * ratings
        + RELEASE_WEIGHT * release
}

/// Nodes for a fresh layout: the watched movies followed by recommendations
/// not already among them.
pub fn layout_candidates(
    recommended: impl IntoIterator<Item = MovieNode>,
    watched: impl IntoIterator<Item = MovieNode>,
) -> Vec<MovieNode> {
    let mut seen = HashSet::new();
    watched
        .into_iter()
        .chain(recommended)
        .filter(|movie| seen.insert(movie.id.clone()))
        .collect()
}

fn mean(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> MovieId {
        MovieId::new(s)
    }

    /// p ≈ a, c sits between p and b.
    fn fixture() -> (Vec<MovieNode>, VectorIndex) {
        let catalog = vec![
            MovieNode::new("p", "Prompt"),
            MovieNode::new("a", "Close"),
            MovieNode::new("b", "Far"),
            MovieNode::new("c", "Between"),
        ];
        let mut index = VectorIndex::new(2);
        index.upsert(id("p"), vec![1.0, 0.0]);
        index.upsert(id("a"), vec![0.9, 0.1]);
        index.upsert(id("b"), vec![0.1, 1.0]);
        index.upsert(id("c"), vec![0.7, 0.7]);
        (catalog, index)
    }

    fn ids(ranked: &[Recommendation]) -> Vec<&str> {
        ranked.iter().map(|r| r.movie.id.as_str()).collect()
    }

    #[test]
    fn test_relevance_score_weights() {
        let prompt = MovieNode::new("p", "Prompt")
            .with_genres(["drama", "scifi"])
            .with_release_year(2000);
        let movie = MovieNode::new("m", "Movie")
            .with_genres(["drama"])
            .with_release_year(1990)
            .with_ratings(Some(80), Some(60));

        // 0.5·0.75 + 0.1·0.5 + 0.3·0.7 + 0.2·0.9
        let score = relevance_score(&prompt, &movie, 0.75);
        assert!((score - 0.815).abs() < 1e-9, "score = {score}");
    }

    #[test]
    fn test_missing_year_and_genres_contribute_nothing() {
        let prompt = MovieNode::new("p", "Prompt");
        let movie = MovieNode::new("m", "Movie")
            .with_genres(["drama"])
            .with_release_year(1990);
        assert_eq!(relevance_score(&prompt, &movie, 0.0), 0.0);
    }

    #[test]
    fn test_direct_neighbors_only() {
        let (catalog, index) = fixture();
        let recommender = Recommender::new(RecommendConfig {
            neighbors: 2,
            steps: 0,
        });

        let ranked = recommender.recommend(&id("p"), &catalog, &index).unwrap();
        assert_eq!(ids(&ranked), vec!["a", "c"]);
        assert_eq!(ranked[0].hits, 1);
    }

    #[test]
    fn test_expansion_reaches_neighbors_of_neighbors() {
        let (catalog, index) = fixture();
        let recommender = Recommender::new(RecommendConfig {
            neighbors: 2,
            steps: 1,
        });

        let ranked = recommender.recommend(&id("p"), &catalog, &index).unwrap();
        let mut found = ids(&ranked);
        found.sort_unstable();
        assert_eq!(found, vec!["a", "b", "c"]);
        assert!(ranked.iter().all(|r| r.movie.id != id("p")));

        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        // a: from p, and from c.
        let a = ranked.iter().find(|r| r.movie.id == id("a")).unwrap();
        assert_eq!(a.hits, 2);
    }

    #[test]
    fn test_metadata_lifts_rank() {
        let (mut catalog, index) = fixture();
        catalog[3] = MovieNode::new("c", "Between").with_ratings(Some(100), Some(100));
        let recommender = Recommender::new(RecommendConfig {
            neighbors: 2,
            steps: 0,
        });

        let ranked = recommender.recommend(&id("p"), &catalog, &index).unwrap();
        assert_eq!(ids(&ranked), vec!["c", "a"]);
    }

    #[test]
    fn test_indexed_but_uncatalogued_is_skipped() {
        let (catalog, mut index) = fixture();
        index.upsert(id("ghost"), vec![1.0, 0.01]);
        let ranked = Recommender::default()
            .recommend(&id("p"), &catalog, &index)
            .unwrap();
        assert!(ranked.iter().all(|r| r.movie.id != id("ghost")));
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_prompt_errors() {
        let (catalog, mut index) = fixture();
        let recommender = Recommender::default();

        assert!(matches!(
            recommender.recommend(&id("nope"), &catalog, &index),
            Err(RecommendError::UnknownMovie(_))
        ));

        index.remove(&id("p"));
        assert!(matches!(
            recommender.recommend(&id("p"), &catalog, &index),
            Err(RecommendError::NotIndexed(_))
        ));
    }

    #[test]
    fn test_layout_candidates_deduplicate() {
        let watched = vec![MovieNode::new("heat", "Heat"), MovieNode::new("ronin", "Ronin")];
        let recommended = vec![
            MovieNode::new("ronin", "Ronin"),
            MovieNode::new("thief", "Thief"),
        ];

        let merged = layout_candidates(recommended, watched);
        let merged_ids: Vec<_> = merged.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(merged_ids, vec!["heat", "ronin", "thief"]);
    }
}
