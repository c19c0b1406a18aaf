//! `knot edges`: the shared-people graph of a catalog.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use knot_graph_core::{assign_position_indices, connection_counts, find_connections, MovieId};
use serde::Serialize;

use super::{load_movies, write_json};

#[derive(Debug, Serialize)]
struct EdgeReport<'a> {
    a: &'a MovieId,
    b: &'a MovieId,
    writers: bool,
    directors: bool,
    actors: bool,
    shared: u8,
}

#[derive(Debug, Serialize)]
struct GraphReport<'a> {
    nodes: usize,
    edges: Vec<EdgeReport<'a>>,
    connections: BTreeMap<&'a MovieId, usize>,
}

pub fn execute(movies_path: &Path, output: Option<&Path>) -> Result<()> {
    let mut movies = load_movies(movies_path)?;
    assign_position_indices(&mut movies);
    let edges = find_connections(&movies);
    let counts = connection_counts(&edges, movies.len());

    let report = GraphReport {
        nodes: movies.len(),
        edges: edges
            .iter()
            .map(|edge| EdgeReport {
                a: &movies[edge.a].id,
                b: &movies[edge.b].id,
                writers: edge.writers,
                directors: edge.directors,
                actors: edge.actors,
                shared: edge.shared_count(),
            })
            .collect(),
        connections: movies.iter().map(|m| &m.id).zip(counts).collect(),
    };

    write_json(&report, output)
}
