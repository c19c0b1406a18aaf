//! Command implementations.

pub mod edges;
pub mod layout;
pub mod recommend;
pub mod search;

use std::path::Path;

use anyhow::{Context, Result};
use knot_graph_core::MovieNode;
use serde::Serialize;

/// Read a JSON array of movies.
pub fn load_movies(path: &Path) -> Result<Vec<MovieNode>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read movies from {}", path.display()))?;
    let movies: Vec<MovieNode> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse movies in {}", path.display()))?;
    tracing::debug!(count = movies.len(), path = %path.display(), "Movies loaded");
    Ok(movies)
}

/// Pretty-print `value` to `output`, or to stdout when no path is given.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write output to {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
