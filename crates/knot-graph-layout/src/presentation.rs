//! The normalize/view tick: raw simulation space to viewport pixels.
//!
//! ```text
//! raw ──▶ [-1, 1] (min/max) ──▶ recenter on mean ──▶ zoom ──▶ translate
//!     ──▶ [0, 1] ──▶ clamp ──▶ × viewport size
//! ```

use crate::state::{BatchGeometry, PointBuffer, ViewState};

/// Bounding box and mean of the real nodes in raw space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub mean_x: f64,
    pub mean_y: f64,
}

impl Extent {
    /// Single pass over the real slots. `None` for an empty graph.
    pub fn of(raw: &PointBuffer, geometry: &BatchGeometry) -> Option<Self> {
        let count = geometry.node_count.min(raw.len());
        if count == 0 {
            return None;
        }

        let mut extent = Extent {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
            mean_x: 0.0,
            mean_y: 0.0,
        };
        for (&x, &y) in raw.x[..count].iter().zip(&raw.y[..count]) {
            extent.min_x = extent.min_x.min(x);
            extent.max_x = extent.max_x.max(x);
            extent.min_y = extent.min_y.min(y);
            extent.max_y = extent.max_y.max(y);
            extent.mean_x += x;
            extent.mean_y += y;
        }
        extent.mean_x /= count as f64;
        extent.mean_y /= count as f64;

        Some(extent)
    }
}

/// Map `value` from `[min, max]` to `[-1, 1]`. A zero-width range maps to -1.
pub fn to_signed_unit(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    let ratio = if span > 0.0 { (value - min) / span } else { 0.0 };
    ratio * 2.0 - 1.0
}

/// Produce viewport coordinates for every slot of `raw`.
///
/// Deterministic: identical input and view state give identical output.
pub fn normalize(raw: &PointBuffer, geometry: &BatchGeometry, view: &ViewState) -> PointBuffer {
    let mut out = PointBuffer::zeros(raw.len());
    let Some(extent) = Extent::of(raw, geometry) else {
        return out;
    };

    let mean_x = to_signed_unit(extent.mean_x, extent.min_x, extent.max_x);
    let mean_y = to_signed_unit(extent.mean_y, extent.min_y, extent.max_y);
    let (translate_x, translate_y) = view.translate.to_signed();
    let (center_x, center_y) = view.zoom_center.to_signed();
    let zoom = view.zoom;

    let place = |signed: f64, center: f64, translate: f64, size: f64| -> f64 {
        let zoomed = (signed - center) * zoom + center;
        let unit = (zoomed + translate + 1.0) / 2.0;
        unit.clamp(0.0, 1.0) * size
    };

    for slot in 0..raw.len() {
        let x = to_signed_unit(raw.x[slot], extent.min_x, extent.max_x) - mean_x;
        let y = to_signed_unit(raw.y[slot], extent.min_y, extent.max_y) - mean_y;
        out.x[slot] = place(x, center_x, translate_x, view.bounds.width);
        out.y[slot] = place(y, center_y, translate_y, view.bounds.height);
    }

    out
}
