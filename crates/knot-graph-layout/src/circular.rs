//! Static "circularized" placement used instead of the physics simulation.

use std::f64::consts::TAU;

use crate::state::{BatchGeometry, PointBuffer};

/// Real nodes spaced evenly around the unit circle; padding slots at the origin.
pub fn circle_positions(geometry: &BatchGeometry) -> PointBuffer {
    let mut buffer = PointBuffer::zeros(geometry.num_points);
    if geometry.node_count == 0 {
        return buffer;
    }

    let step = TAU / geometry.node_count as f64;
    for idx in 0..geometry.node_count {
        let angle = idx as f64 * step;
        buffer.x[idx] = angle.cos();
        buffer.y[idx] = angle.sin();
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_on_unit_circle() {
        let geometry = BatchGeometry::new(6, 4);
        let buffer = circle_positions(&geometry);
        assert_eq!(buffer.len(), 8);

        for i in 0..6 {
            let (x, y) = buffer.get(i).unwrap();
            assert!((x.hypot(y) - 1.0).abs() < 1e-12);
        }
        assert_eq!(buffer.get(6), Some((0.0, 0.0)));
    }

    #[test]
    fn test_points_evenly_spaced() {
        let geometry = BatchGeometry::new(4, 4);
        let buffer = circle_positions(&geometry);
        let expected = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];
        for (i, (ex, ey)) in expected.iter().enumerate() {
            assert!((buffer.x[i] - ex).abs() < 1e-12);
            assert!((buffer.y[i] - ey).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_and_empty() {
        assert!(circle_positions(&BatchGeometry::new(0, 4)).is_empty());
        let one = circle_positions(&BatchGeometry::new(1, 4));
        assert_eq!(one.get(0), Some((1.0, 0.0)));
    }
}
