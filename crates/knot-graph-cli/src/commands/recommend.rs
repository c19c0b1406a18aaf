//! `knot recommend`: rank the catalog against a prompt movie, optionally
//! laying out the result next to what was already watched.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use knot_graph_core::{MovieId, MovieNode};
use knot_graph_layout::LayoutSession;
use knot_graph_semantic::{layout_candidates, RecommendConfig, Recommender, VectorIndex};
use serde::Serialize;
use tracing::info;

use super::layout::{positions_by_id, settle};
use super::{load_movies, write_json};
use crate::config::Config;

/// Where and how long to lay out the recommended graph.
#[derive(Debug, Clone)]
pub struct RecommendLayout {
    pub output: PathBuf,
    /// Ids shown alongside the recommendations, besides the prompt.
    pub watched: Vec<String>,
    pub duration: Duration,
}

#[derive(Debug, Serialize)]
struct RecommendationReport<'a> {
    id: &'a MovieId,
    title: &'a str,
    score: f64,
    similarity: f64,
    hits: usize,
}

pub async fn execute(
    config: &Config,
    movies_path: &Path,
    index_path: &Path,
    prompt: &str,
    steps: usize,
    limit: Option<usize>,
    layout: Option<RecommendLayout>,
) -> Result<()> {
    let catalog = load_movies(movies_path)?;

    let contents = std::fs::read_to_string(index_path)
        .with_context(|| format!("Failed to read index from {}", index_path.display()))?;
    let index: VectorIndex = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse index in {}", index_path.display()))?;

    let recommender = Recommender::new(RecommendConfig {
        neighbors: config.neighbors,
        steps,
    });
    let prompt = MovieId::new(prompt);
    let mut ranked = recommender.recommend(&prompt, &catalog, &index)?;
    ranked.truncate(limit.unwrap_or(usize::MAX));

    let report: Vec<RecommendationReport> = ranked
        .iter()
        .map(|r| RecommendationReport {
            id: &r.movie.id,
            title: &r.movie.title,
            score: r.score,
            similarity: r.similarity,
            hits: r.hits,
        })
        .collect();
    write_json(&report, None)?;

    let Some(layout) = layout else {
        return Ok(());
    };

    let watched_ids: Vec<MovieId> = std::iter::once(prompt)
        .chain(layout.watched.iter().map(MovieId::new))
        .collect();
    let watched = lookup(&catalog, &watched_ids)?;
    let candidates = layout_candidates(ranked.into_iter().map(|r| r.movie), watched);
    info!(candidates = candidates.len(), "Laying out recommendations");

    let mut session = LayoutSession::new(config.layout.clone());
    session
        .replace(candidates)
        .await
        .context("Failed to start recommendation layout")?;
    let engine = session
        .engine_mut()
        .context("Recommendation layout was not kept")?;
    settle(engine, layout.duration).await;
    write_json(&positions_by_id(engine), Some(&layout.output))?;

    session.clear().await;
    Ok(())
}

/// Catalog entry for each id, in order.
fn lookup(catalog: &[MovieNode], ids: &[MovieId]) -> Result<Vec<MovieNode>> {
    ids.iter()
        .map(|id| match catalog.iter().find(|m| &m.id == id) {
            Some(movie) => Ok(movie.clone()),
            None => bail!("Watched movie {id} is not in the catalog"),
        })
        .collect()
}
