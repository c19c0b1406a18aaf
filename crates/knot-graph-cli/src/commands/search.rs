//! `knot search`: find catalog movies by title.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use knot_graph_core::MovieId;
use knot_graph_semantic::{TitleSearch, TrigramEmbedder};
use serde::Serialize;

use super::{load_movies, write_json};

#[derive(Debug, Serialize)]
struct TitleReport<'a> {
    id: &'a MovieId,
    title: &'a str,
    score: f32,
}

pub fn execute(movies_path: &Path, text: &str, limit: usize) -> Result<()> {
    let catalog = load_movies(movies_path)?;
    let search = TitleSearch::build(Arc::new(TrigramEmbedder::default()), &catalog)
        .context("Failed to index titles")?;
    let matches = search.search(text, limit)?;

    let report: Vec<TitleReport> = matches
        .iter()
        .map(|m| TitleReport {
            id: &m.movie.id,
            title: &m.movie.title,
            score: m.score,
        })
        .collect();

    write_json(&report, None)
}
