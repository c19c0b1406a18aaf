//! `knot layout`: run the live engine headless and dump where nodes settled.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use knot_graph_core::MovieId;
use knot_graph_layout::{Bounds, LayoutEngine};
use serde::Serialize;
use tracing::info;

use super::{load_movies, write_json};
use crate::config::Config;

/// Viewport and run length of one headless layout.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRun {
    pub duration: Duration,
    pub bounds: Bounds,
    pub zoom: f64,
    pub circular: bool,
}

#[derive(Debug, Serialize)]
pub struct Point {
    x: f64,
    y: f64,
}

pub async fn execute(
    config: &Config,
    movies_path: &Path,
    run: LayoutRun,
    output: Option<&Path>,
) -> Result<()> {
    let movies = load_movies(movies_path)?;
    let layout_config = config.layout.clone().with_circular(run.circular);

    let mut engine =
        LayoutEngine::new(movies, layout_config).context("Failed to build layout engine")?;
    engine.set_bounds(run.bounds);
    engine.set_zoom(run.zoom);
    engine.start().context("Failed to start layout loops")?;

    settle(&mut engine, run.duration).await;
    write_json(&positions_by_id(&engine), output)
}

/// Let a started engine run for `duration`, then stop both loops.
pub async fn settle(engine: &mut LayoutEngine, duration: Duration) {
    tokio::time::sleep(duration).await;

    // Let presentation catch up with the final tick before stopping it.
    engine.stop_simulation();
    tokio::time::sleep(engine.config().presentation_interval() * 2).await;
    engine.shutdown().await;

    info!(
        tick = engine.positions().source_tick,
        nodes = engine.nodes().len(),
        "Layout finished"
    );
}

/// Last published position of every movie, keyed by id.
pub fn positions_by_id(engine: &LayoutEngine) -> BTreeMap<&MovieId, Point> {
    let published = engine.positions();
    engine
        .nodes()
        .iter()
        .enumerate()
        .filter_map(|(idx, node)| {
            let (x, y) = published.position(idx)?;
            Some((&node.id, Point { x, y }))
        })
        .collect()
}
