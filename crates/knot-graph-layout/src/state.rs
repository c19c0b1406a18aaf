//! Numeric layout state: batch geometry, flat point buffers and view state.

use std::ops::Range;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::LayoutConfig;

// =============================================================================
// Batch geometry
// =============================================================================

/// How node slots are chunked into fixed-width batches.
///
/// Slots `node_count..num_points` are padding: they exist only to keep
/// batch boundaries uniform and never take part in force computation or
/// normalization statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchGeometry {
    pub node_count: usize,
    pub batch_width: usize,
    pub batch_count: usize,
    pub num_points: usize,
}

impl BatchGeometry {
    pub fn new(node_count: usize, batch_width: usize) -> Self {
        let batch_width = batch_width.max(1);
        let batch_count = node_count.div_ceil(batch_width);
        Self {
            node_count,
            batch_width,
            batch_count,
            num_points: batch_count * batch_width,
        }
    }

    /// Slot range of batch `b`, padding included.
    pub fn batch(&self, b: usize) -> Range<usize> {
        let start = b * self.batch_width;
        start..start + self.batch_width
    }

    /// Real (non-padding) slots of batch `b`. Empty for a pure padding batch.
    pub fn real_slots(&self, b: usize) -> Range<usize> {
        let range = self.batch(b);
        range.start.min(self.node_count)..range.end.min(self.node_count)
    }

    pub fn is_padding(&self, slot: usize) -> bool {
        slot >= self.node_count
    }
}

// =============================================================================
// Buffers
// =============================================================================

/// A pair of flat per-axis buffers indexed by position index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBuffer {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl PointBuffer {
    pub fn zeros(len: usize) -> Self {
        Self {
            x: vec![0.0; len],
            y: vec![0.0; len],
        }
    }

    /// Every slot drawn independently from `[-bound, bound]`.
    pub fn random<R: Rng>(len: usize, bound: f64, rng: &mut R) -> Self {
        let x = (0..len).map(|_| rng.random_range(-bound..=bound)).collect();
        let y = (0..len).map(|_| rng.random_range(-bound..=bound)).collect();
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<(f64, f64)> {
        Some((*self.x.get(slot)?, *self.y.get(slot)?))
    }

    pub fn is_finite(&self) -> bool {
        self.x.iter().chain(self.y.iter()).all(|v| v.is_finite())
    }
}

/// Raw simulation state, exclusively owned by the simulation loop.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Unbounded simulation-space positions. Shared read-only once published.
    pub positions: Arc<PointBuffer>,
    pub velocities: PointBuffer,
    /// Number of completed simulation ticks.
    pub tick: u64,
}

impl SimulationState {
    /// Random positions for every slot, zero velocities.
    pub fn random<R: Rng>(geometry: &BatchGeometry, bound: f64, rng: &mut R) -> Self {
        Self {
            positions: Arc::new(PointBuffer::random(geometry.num_points, bound, rng)),
            velocities: PointBuffer::zeros(geometry.num_points),
            tick: 0,
        }
    }

    /// Start from known positions with zero velocities.
    pub fn from_positions(positions: PointBuffer) -> Self {
        let len = positions.len();
        Self {
            positions: Arc::new(positions),
            velocities: PointBuffer::zeros(len),
            tick: 0,
        }
    }

    pub fn snapshot(&self) -> RawSnapshot {
        RawSnapshot {
            positions: Arc::clone(&self.positions),
            tick: self.tick,
        }
    }
}

/// Positions published by the simulation loop after a completed tick.
#[derive(Debug, Clone, Default)]
pub struct RawSnapshot {
    pub positions: Arc<PointBuffer>,
    pub tick: u64,
}

/// Viewport-space positions published for the renderer.
#[derive(Debug, Clone, Default)]
pub struct NormalizedPositions {
    pub positions: PointBuffer,
    /// Simulation tick of the raw snapshot these were derived from.
    pub source_tick: u64,
}

impl NormalizedPositions {
    /// Pixel position of the node with the given position index.
    pub fn position(&self, index: usize) -> Option<(f64, f64)> {
        self.positions.get(index)
    }
}

/// Scalar physics constants of one engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    pub repulsion: f64,
    pub attraction: f64,
    pub damping: f64,
    pub min_distance: f64,
}

impl From<&LayoutConfig> for PhysicsParams {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            repulsion: config.repulsion,
            attraction: config.attraction,
            damping: config.damping,
            min_distance: config.min_distance,
        }
    }
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self::from(&LayoutConfig::default())
    }
}

// =============================================================================
// View state
// =============================================================================

/// A point in unit-square coordinates, `(0, 0)` top-left, `(1, 1)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitPoint {
    pub x: f64,
    pub y: f64,
}

impl UnitPoint {
    pub const CENTER: UnitPoint = UnitPoint { x: 0.5, y: 0.5 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Remap from `[0, 1]` to `[-1, 1]`.
    pub fn to_signed(self) -> (f64, f64) {
        (2.0 * self.x - 1.0, 2.0 * self.y - 1.0)
    }
}

impl Default for UnitPoint {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Pixel size of the active viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn square(edge: f64) -> Self {
        Self::new(edge, edge)
    }
}

/// User pan/zoom and viewport size, written by the UI, read by presentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub zoom: f64,
    /// Anchor of the zoom; the default center reproduces a plain scale.
    pub zoom_center: UnitPoint,
    pub translate: UnitPoint,
    pub bounds: Bounds,
}

impl ViewState {
    pub fn with_bounds(bounds: Bounds) -> Self {
        Self {
            zoom: 1.0,
            zoom_center: UnitPoint::CENTER,
            translate: UnitPoint::CENTER,
            bounds,
        }
    }

    /// Whether normalization can map through this view to finite pixels
    /// inside `[0, bounds]`.
    pub fn is_valid(&self) -> bool {
        let finite = |p: UnitPoint| p.x.is_finite() && p.y.is_finite();
        self.zoom.is_finite()
            && self.zoom > 0.0
            && self.bounds.width.is_finite()
            && self.bounds.height.is_finite()
            && self.bounds.width >= 0.0
            && self.bounds.height >= 0.0
            && finite(self.translate)
            && finite(self.zoom_center)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::with_bounds(Bounds::square(LayoutConfig::default().passive_bound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_geometry_rounds_up_to_batch() {
        let g = BatchGeometry::new(65, 64);
        assert_eq!(g.batch_count, 2);
        assert_eq!(g.num_points, 128);
        assert_eq!(g.real_slots(1), 64..65);
        assert!(g.is_padding(65));
        assert!(!g.is_padding(64));
    }

    #[test]
    fn test_geometry_exact_multiple_and_empty() {
        let g = BatchGeometry::new(128, 64);
        assert_eq!(g.num_points, 128);

        let g = BatchGeometry::new(0, 64);
        assert_eq!(g.batch_count, 0);
        assert_eq!(g.num_points, 0);
    }

    #[test]
    fn test_random_positions_within_bound() {
        let mut rng = StdRng::seed_from_u64(7);
        let g = BatchGeometry::new(10, 8);
        let state = SimulationState::random(&g, 100.0, &mut rng);
        assert_eq!(state.positions.len(), 16);
        assert!(state
            .positions
            .x
            .iter()
            .chain(state.positions.y.iter())
            .all(|v| (-100.0..=100.0).contains(v)));
        assert!(state.velocities.x.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_view_validity() {
        let view = ViewState::default();
        assert!(view.is_valid());
        assert!(ViewState::with_bounds(Bounds::new(0.0, 0.0)).is_valid());

        let invalid = [
            ViewState { zoom: f64::NAN, ..view },
            ViewState { zoom: 0.0, ..view },
            ViewState { zoom: -2.0, ..view },
            ViewState::with_bounds(Bounds::new(-200.0, 100.0)),
            ViewState::with_bounds(Bounds::new(100.0, f64::INFINITY)),
            ViewState {
                translate: UnitPoint::new(f64::NAN, 0.5),
                ..view
            },
            ViewState {
                zoom_center: UnitPoint::new(0.5, f64::NEG_INFINITY),
                ..view
            },
        ];
        for view in invalid {
            assert!(!view.is_valid(), "{view:?}");
        }
    }

    #[test]
    fn test_unit_point_to_signed() {
        assert_eq!(UnitPoint::CENTER.to_signed(), (0.0, 0.0));
        assert_eq!(UnitPoint::new(1.0, 0.0).to_signed(), (1.0, -1.0));
    }
}
