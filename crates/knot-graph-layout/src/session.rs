//! Swapping one running layout for another.

use knot_graph_core::MovieNode;
use tracing::info;

use crate::{LayoutConfig, LayoutEngine, LayoutResult};

/// Holds the engine currently on screen and replaces it safely.
///
/// A new graph (for example after a recommendation search) never runs next to
/// the old one: the previous engine's loops are cancelled and awaited before
/// its buffers are dropped.
#[derive(Debug)]
pub struct LayoutSession {
    config: LayoutConfig,
    engine: Option<LayoutEngine>,
}

impl LayoutSession {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            engine: None,
        }
    }

    pub fn engine(&self) -> Option<&LayoutEngine> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut LayoutEngine> {
        self.engine.as_mut()
    }

    /// Build and start a layout for `nodes`, retiring the current one.
    ///
    /// The viewport size carries over to the new engine. If building fails
    /// the current engine keeps running.
    pub async fn replace(&mut self, nodes: Vec<MovieNode>) -> LayoutResult<&LayoutEngine> {
        let mut next = LayoutEngine::new(nodes, self.config.clone())?;

        if let Some(mut previous) = self.engine.take() {
            next.set_bounds(previous.view().bounds);
            previous.shutdown().await;
        }

        next.start()?;
        info!(nodes = next.nodes().len(), edges = next.edges().len(), "Layout replaced");
        Ok(self.engine.insert(next))
    }

    /// Stop and drop the current engine, if any.
    pub async fn clear(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.shutdown().await;
        }
    }
}
