//! The physics tick: pairwise repulsion, edge attraction, damped integration.
//!
//! [`step`] is a pure function of the input state. Both force passes read the
//! same pre-tick positions and only accumulate into a fresh velocity buffer;
//! integration then produces a new position buffer. The caller publishes the
//! result as a whole.

use std::sync::Arc;

use knot_graph_core::MovieEdge;

use crate::state::{BatchGeometry, PhysicsParams, PointBuffer, SimulationState};

/// Advance the simulation by one tick.
pub fn step(
    input: &SimulationState,
    edges: &[MovieEdge],
    geometry: &BatchGeometry,
    params: &PhysicsParams,
) -> SimulationState {
    let positions = input.positions.as_ref();
    let mut velocities = input.velocities.clone();

    apply_repulsion(positions, &mut velocities, geometry, params);
    apply_attraction(positions, &mut velocities, edges, geometry, params);
    let positions = integrate(positions, &mut velocities, geometry, params.damping);

    SimulationState {
        positions: Arc::new(positions),
        velocities,
        tick: input.tick + 1,
    }
}

/// Force exerted on the second node of a pair, pointing away from the first.
///
/// The distance is floored at `min_distance`. Coincident nodes have no
/// direction of their own, so the second node is pushed along +x.
pub fn repulsion_force(dx: f64, dy: f64, params: &PhysicsParams) -> (f64, f64) {
    let raw = dx.hypot(dy);
    let distance = raw.max(params.min_distance);
    let force = params.repulsion / (distance * distance);
    if raw == 0.0 {
        return (force, 0.0);
    }
    (force * dx / distance, force * dy / distance)
}

/// Spring force pulling the first node toward the second.
pub fn attraction_force(dx: f64, dy: f64, strength: f64, params: &PhysicsParams) -> (f64, f64) {
    let distance = dx.hypot(dy);
    let force = distance * strength;
    let norm = distance.max(params.min_distance);
    (force * dx / norm, force * dy / norm)
}

/// Repulsion between every pair of real nodes, walked batch pair by batch pair.
///
/// Padding slots are skipped entirely.
pub fn apply_repulsion(
    positions: &PointBuffer,
    velocities: &mut PointBuffer,
    geometry: &BatchGeometry,
    params: &PhysicsParams,
) {
    for a_batch in 0..geometry.batch_count {
        let a_slots = geometry.real_slots(a_batch);
        if a_slots.is_empty() {
            break;
        }

        for b_batch in a_batch..geometry.batch_count {
            let b_slots = geometry.real_slots(b_batch);
            if b_slots.is_empty() {
                break;
            }

            for i in a_slots.clone() {
                let j_start = if a_batch == b_batch { i + 1 } else { b_slots.start };
                for j in j_start..b_slots.end {
                    let dx = positions.x[j] - positions.x[i];
                    let dy = positions.y[j] - positions.y[i];
                    let (fx, fy) = repulsion_force(dx, dy, params);

                    velocities.x[i] -= fx;
                    velocities.y[i] -= fy;
                    velocities.x[j] += fx;
                    velocities.y[j] += fy;
                }
            }
        }
    }
}

/// Attraction along every edge, scaled by the number of shared roles.
pub fn apply_attraction(
    positions: &PointBuffer,
    velocities: &mut PointBuffer,
    edges: &[MovieEdge],
    geometry: &BatchGeometry,
    params: &PhysicsParams,
) {
    for edge in edges {
        let (i, j) = (edge.a, edge.b);
        // Edges only ever reference real nodes.
        if geometry.is_padding(i) || geometry.is_padding(j) {
            continue;
        }

        let dx = positions.x[j] - positions.x[i];
        let dy = positions.y[j] - positions.y[i];
        let (fx, fy) = attraction_force(dx, dy, edge.strength(params.attraction), params);

        velocities.x[i] += fx;
        velocities.y[i] += fy;
        velocities.x[j] -= fx;
        velocities.y[j] -= fy;
    }
}

/// Damp velocities in place and return the advanced positions.
pub fn integrate(
    positions: &PointBuffer,
    velocities: &mut PointBuffer,
    geometry: &BatchGeometry,
    damping: f64,
) -> PointBuffer {
    let mut next = positions.clone();

    for batch in 0..geometry.batch_count {
        for slot in geometry.real_slots(batch) {
            velocities.x[slot] *= damping;
            velocities.y[slot] *= damping;
            next.x[slot] += velocities.x[slot];
            next.y[slot] += velocities.y[slot];
        }
    }

    next
}

/// Sum of squared speeds over real nodes; a convergence indicator.
pub fn kinetic_energy(velocities: &PointBuffer, geometry: &BatchGeometry) -> f64 {
    (0..geometry.node_count)
        .map(|i| velocities.x[i] * velocities.x[i] + velocities.y[i] * velocities.y[i])
        .sum()
}
