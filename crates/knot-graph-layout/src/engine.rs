//! The layout orchestrator.
//!
//! A [`LayoutEngine`] owns two buffer pairs with one writer each:
//!
//! - raw positions/velocities, written only by the simulation loop and
//!   published as a [`RawSnapshot`] after every completed tick;
//! - normalized positions, written only by the presentation loop and
//!   published as an `Arc<NormalizedPositions>` for the renderer.
//!
//! Publishing goes through `tokio::sync::watch`, so a reader always sees a
//! complete buffer. The writers are moved into their tasks on
//! [`LayoutEngine::start`]; before that the engine can be stepped
//! synchronously.

use std::sync::Arc;
use std::time::{Duration, Instant};

use knot_graph_core::{
    assign_position_indices, connection_counts, find_connections, validate_position_indices,
    MovieEdge, MovieNode,
};
use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::circular::circle_positions;
use crate::presentation::normalize;
use crate::simulation::{self, kinetic_energy};
use crate::state::{
    BatchGeometry, Bounds, NormalizedPositions, PhysicsParams, RawSnapshot, SimulationState,
    UnitPoint, ViewState,
};
use crate::{LayoutConfig, LayoutError, LayoutResult};

/// Lifecycle of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// Built, loops not started. Synchronous stepping is available.
    Idle,
    /// Simulation and presentation loops are running.
    Running,
    /// Static circle layout; only the presentation loop runs.
    Circularized,
    /// Loops were shut down.
    Stopped,
}

/// Force-directed layout of a movie graph.
pub struct LayoutEngine {
    nodes: Arc<[MovieNode]>,
    edges: Arc<[MovieEdge]>,
    config: LayoutConfig,
    geometry: BatchGeometry,
    params: PhysicsParams,
    status: EngineStatus,

    /// Writer side of the raw buffers, held until `start` hands it to the loop.
    idle_state: Option<SimulationState>,
    raw_tx: Option<watch::Sender<RawSnapshot>>,
    raw_rx: watch::Receiver<RawSnapshot>,

    /// Writer side of the normalized buffers, same handoff as above.
    normalized_tx: Option<watch::Sender<Arc<NormalizedPositions>>>,
    normalized_rx: watch::Receiver<Arc<NormalizedPositions>>,

    view_tx: watch::Sender<ViewState>,

    cancel: CancellationToken,
    simulation_cancel: CancellationToken,
    presentation_cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl LayoutEngine {
    /// Build an engine with thread-local randomness for initial positions.
    pub fn new(nodes: Vec<MovieNode>, config: LayoutConfig) -> LayoutResult<Self> {
        Self::with_rng(nodes, config, &mut rand::rng())
    }

    /// Build an engine drawing initial positions from `rng`.
    ///
    /// Assigns position indices, derives the edge list once and places every
    /// slot at random. Does not start any loop.
    pub fn with_rng<R: Rng>(
        mut nodes: Vec<MovieNode>,
        config: LayoutConfig,
        rng: &mut R,
    ) -> LayoutResult<Self> {
        config.validate()?;

        assign_position_indices(&mut nodes);
        let geometry = BatchGeometry::new(nodes.len(), config.batch_width);
        validate_position_indices(&nodes, geometry.num_points)?;

        let edges = find_connections(&nodes);
        let state = SimulationState::random(&geometry, config.passive_bound, rng);
        let view = ViewState::with_bounds(Bounds::square(config.passive_bound));

        let initial = NormalizedPositions {
            positions: normalize(&state.positions, &geometry, &view),
            source_tick: state.tick,
        };
        let (raw_tx, raw_rx) = watch::channel(state.snapshot());
        let (normalized_tx, normalized_rx) = watch::channel(Arc::new(initial));
        let (view_tx, _) = watch::channel(view);

        info!(
            nodes = geometry.node_count,
            edges = edges.len(),
            num_points = geometry.num_points,
            batches = geometry.batch_count,
            "Layout engine built"
        );

        let cancel = CancellationToken::new();
        Ok(Self {
            nodes: nodes.into(),
            edges: edges.into(),
            params: PhysicsParams::from(&config),
            config,
            geometry,
            status: EngineStatus::Idle,
            idle_state: Some(state),
            raw_tx: Some(raw_tx),
            raw_rx,
            normalized_tx: Some(normalized_tx),
            normalized_rx,
            view_tx,
            simulation_cancel: cancel.child_token(),
            presentation_cancel: cancel.child_token(),
            cancel,
            tasks: Vec::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Render consumer
    // -------------------------------------------------------------------------

    /// Nodes in position-index order.
    pub fn nodes(&self) -> &[MovieNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[MovieEdge] {
        &self.edges
    }

    /// Edges per node, derived from the edge list.
    pub fn connection_counts(&self) -> Vec<usize> {
        connection_counts(&self.edges, self.nodes.len())
    }

    pub fn geometry(&self) -> BatchGeometry {
        self.geometry
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Latest published viewport positions.
    pub fn positions(&self) -> Arc<NormalizedPositions> {
        Arc::clone(&self.normalized_rx.borrow())
    }

    /// Receiver that is notified on every presentation publish.
    pub fn subscribe(&self) -> watch::Receiver<Arc<NormalizedPositions>> {
        self.normalized_rx.clone()
    }

    /// Latest published raw simulation positions.
    pub fn raw_positions(&self) -> RawSnapshot {
        self.raw_rx.borrow().clone()
    }

    // -------------------------------------------------------------------------
    // View state (UI side)
    // -------------------------------------------------------------------------

    pub fn view(&self) -> ViewState {
        *self.view_tx.borrow()
    }

    /// Replace the whole view state at once. Invalid views are ignored.
    pub fn set_view(&self, view: ViewState) {
        self.update_view(|current| *current = view);
    }

    /// Edit the view state; readers see either the old or the new full set.
    ///
    /// The edit is dropped if it leaves the view invalid (see
    /// [`ViewState::is_valid`]), so the renderer never gets NaN or
    /// out-of-bounds pixels.
    pub fn update_view(&self, edit: impl FnOnce(&mut ViewState)) {
        self.view_tx.send_if_modified(|view| {
            let mut next = *view;
            edit(&mut next);
            if !next.is_valid() {
                warn!(view = ?next, "Ignoring invalid view state");
                return false;
            }
            let changed = next != *view;
            *view = next;
            changed
        });
    }

    pub fn set_bounds(&self, bounds: Bounds) {
        self.update_view(|view| view.bounds = bounds);
    }

    pub fn set_zoom(&self, zoom: f64) {
        self.update_view(|view| view.zoom = zoom);
    }

    pub fn set_zoom_center(&self, center: UnitPoint) {
        self.update_view(|view| view.zoom_center = center);
    }

    pub fn set_translate(&self, translate: UnitPoint) {
        self.update_view(|view| view.translate = translate);
    }

    // -------------------------------------------------------------------------
    // Synchronous stepping (idle only)
    // -------------------------------------------------------------------------

    /// Run one simulation tick in place and publish it. Returns the tick count.
    pub fn step(&mut self) -> LayoutResult<u64> {
        let (Some(state), Some(raw_tx)) = (self.idle_state.as_mut(), self.raw_tx.as_ref()) else {
            return Err(LayoutError::NotIdle);
        };

        *state = simulation::step(state, &self.edges, &self.geometry, &self.params);
        raw_tx.send_replace(state.snapshot());
        Ok(state.tick)
    }

    /// Run one presentation tick against the current raw and view state.
    pub fn refresh(&mut self) -> LayoutResult<Arc<NormalizedPositions>> {
        let Some(normalized_tx) = self.normalized_tx.as_ref() else {
            return Err(LayoutError::NotIdle);
        };

        let raw = self.raw_rx.borrow().clone();
        let view = *self.view_tx.borrow();
        let published = Arc::new(NormalizedPositions {
            positions: normalize(&raw.positions, &self.geometry, &view),
            source_tick: raw.tick,
        });
        normalized_tx.send_replace(Arc::clone(&published));
        Ok(published)
    }

    // -------------------------------------------------------------------------
    // Loops
    // -------------------------------------------------------------------------

    /// Spawn the simulation and presentation loops on the current runtime.
    ///
    /// With `circular` set, nodes are placed on a circle once and only the
    /// presentation loop runs.
    pub fn start(&mut self) -> LayoutResult<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| LayoutError::NoRuntime)?;
        let (Some(state), Some(raw_tx), Some(normalized_tx)) = (
            self.idle_state.take(),
            self.raw_tx.take(),
            self.normalized_tx.take(),
        ) else {
            return Err(LayoutError::AlreadyStarted);
        };

        if self.config.circular {
            raw_tx.send_replace(RawSnapshot {
                positions: Arc::new(circle_positions(&self.geometry)),
                tick: state.tick + 1,
            });
            self.status = EngineStatus::Circularized;
            info!(nodes = self.geometry.node_count, "Layout circularized");
        } else {
            let simulation = SimulationLoop {
                state,
                edges: Arc::clone(&self.edges),
                geometry: self.geometry,
                params: self.params,
                interval: self.config.simulation_interval(),
                raw_tx,
                cancel: self.simulation_cancel.clone(),
            };
            self.tasks.push(runtime.spawn(simulation.run()));
            self.status = EngineStatus::Running;
        }

        let presentation = PresentationLoop {
            geometry: self.geometry,
            interval: self.config.presentation_interval(),
            raw_rx: self.raw_rx.clone(),
            view_rx: self.view_tx.subscribe(),
            normalized_tx,
            cancel: self.presentation_cancel.clone(),
        };
        self.tasks.push(runtime.spawn(presentation.run()));

        info!(
            simulation_ms = self.config.simulation_interval_ms,
            presentation_ms = self.config.presentation_interval_ms,
            "Layout loops started"
        );
        Ok(())
    }

    /// Stop the simulation loop after its current tick. Positions freeze.
    pub fn stop_simulation(&self) {
        self.simulation_cancel.cancel();
    }

    /// Stop the presentation loop. The last normalized buffer stays published.
    pub fn stop_presentation(&self) {
        self.presentation_cancel.cancel();
    }

    /// Cancel both loops and wait until they have exited.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                error!(error = %e, "Layout loop terminated abnormally");
            }
        }
        if self.status != EngineStatus::Idle {
            self.status = EngineStatus::Stopped;
        }
        info!("Layout engine stopped");
    }
}

impl Drop for LayoutEngine {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("geometry", &self.geometry)
            .field("status", &self.status)
            .finish()
    }
}

// =============================================================================
// Loop bodies
// =============================================================================

struct SimulationLoop {
    state: SimulationState,
    edges: Arc<[MovieEdge]>,
    geometry: BatchGeometry,
    params: PhysicsParams,
    interval: Duration,
    raw_tx: watch::Sender<RawSnapshot>,
    cancel: CancellationToken,
}

impl SimulationLoop {
    async fn run(mut self) {
        debug!("Simulation loop started");

        while !self.cancel.is_cancelled() {
            let started = Instant::now();
            let input = self.state;
            let edges = Arc::clone(&self.edges);
            let (geometry, params) = (self.geometry, self.params);

            // The tick runs to completion off the async workers; cancellation
            // is only observed between ticks.
            let ticked = tokio::task::spawn_blocking(move || {
                simulation::step(&input, &edges, &geometry, &params)
            })
            .await;

            self.state = match ticked {
                Ok(state) => state,
                Err(e) => {
                    error!(error = %e, "Simulation tick failed");
                    return;
                }
            };
            self.raw_tx.send_replace(self.state.snapshot());

            trace!(
                tick = self.state.tick,
                elapsed_us = started.elapsed().as_micros() as u64,
                energy = kinetic_energy(&self.state.velocities, &self.geometry),
                "Simulation tick"
            );

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        debug!(tick = self.state.tick, "Simulation loop stopped");
    }
}

struct PresentationLoop {
    geometry: BatchGeometry,
    interval: Duration,
    raw_rx: watch::Receiver<RawSnapshot>,
    view_rx: watch::Receiver<ViewState>,
    normalized_tx: watch::Sender<Arc<NormalizedPositions>>,
    cancel: CancellationToken,
}

impl PresentationLoop {
    async fn run(mut self) {
        debug!("Presentation loop started");
        let mut last: Option<(u64, ViewState)> = None;

        while !self.cancel.is_cancelled() {
            let raw = self.raw_rx.borrow_and_update().clone();
            let view = *self.view_rx.borrow_and_update();

            // Same snapshot, same view: the output would be identical.
            if last != Some((raw.tick, view)) {
                let positions = normalize(&raw.positions, &self.geometry, &view);
                self.normalized_tx.send_replace(Arc::new(NormalizedPositions {
                    positions,
                    source_tick: raw.tick,
                }));
                last = Some((raw.tick, view));
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        debug!("Presentation loop stopped");
    }
}
