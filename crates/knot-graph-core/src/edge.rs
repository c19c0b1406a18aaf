//! Shared-people edges and the all-pairs edge builder.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{EdgeError, MovieNode, MovieRole};

/// Which credit categories two movies have in common.
///
/// Each category is compared only against the same category of the other
/// movie: a director of one film who wrote the other does not count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedRoles {
    pub writers: bool,
    pub directors: bool,
    pub actors: bool,
}

impl SharedRoles {
    pub fn between(a: &MovieNode, b: &MovieNode) -> Self {
        let shares = |role: MovieRole| !a.people(role).is_disjoint(b.people(role));
        Self {
            writers: shares(MovieRole::Writer),
            directors: shares(MovieRole::Director),
            actors: shares(MovieRole::Actor),
        }
    }

    pub fn any(&self) -> bool {
        self.writers || self.directors || self.actors
    }

    /// Number of shared categories, 0 to 3.
    pub fn count(&self) -> u8 {
        self.writers as u8 + self.directors as u8 + self.actors as u8
    }
}

/// An undirected connection between two movies that share people.
///
/// `a < b` always holds. At least one of the role flags is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieEdge {
    /// Position index of the first endpoint.
    pub a: usize,
    /// Position index of the second endpoint.
    pub b: usize,
    pub writers: bool,
    pub directors: bool,
    pub actors: bool,
}

impl MovieEdge {
    /// Build the edge between two indexed movies.
    ///
    /// Neither node is modified; connection counts are derived from the
    /// finished edge list with [`connection_counts`].
    pub fn between(a: &MovieNode, b: &MovieNode) -> Result<Self, EdgeError> {
        let shared = SharedRoles::between(a, b);
        if !shared.any() {
            return Err(EdgeError::NoSharedPeople {
                a: a.id.clone(),
                b: b.id.clone(),
            });
        }
        Self::with_roles(a, b, shared)
    }

    fn with_roles(a: &MovieNode, b: &MovieNode, shared: SharedRoles) -> Result<Self, EdgeError> {
        let a_idx = a
            .position_index()
            .ok_or_else(|| EdgeError::MissingPositionIndex { id: a.id.clone() })?;
        let b_idx = b
            .position_index()
            .ok_or_else(|| EdgeError::MissingPositionIndex { id: b.id.clone() })?;

        Ok(Self {
            a: a_idx.min(b_idx),
            b: a_idx.max(b_idx),
            writers: shared.writers,
            directors: shared.directors,
            actors: shared.actors,
        })
    }

    pub fn roles(&self) -> SharedRoles {
        SharedRoles {
            writers: self.writers,
            directors: self.directors,
            actors: self.actors,
        }
    }

    /// Number of shared categories, used as the attraction multiplier.
    pub fn shared_count(&self) -> u8 {
        self.roles().count()
    }

    /// Spring constant of this edge for a base attraction strength.
    pub fn strength(&self, attraction: f64) -> f64 {
        attraction * f64::from(self.shared_count())
    }
}

/// Derive every edge of the graph by comparing all pairs of movies.
///
/// Pairs that share nobody are skipped before construction. A pair that
/// still fails (a node without a position index) is logged and dropped so
/// the remaining graph builds.
pub fn find_connections(nodes: &[MovieNode]) -> Vec<MovieEdge> {
    let mut edges = Vec::new();
    let mut dropped = 0usize;

    for (a_idx, a) in nodes.iter().enumerate() {
        for b in &nodes[a_idx + 1..] {
            let shared = SharedRoles::between(a, b);
            if !shared.any() {
                continue;
            }
            match MovieEdge::with_roles(a, b, shared) {
                Ok(edge) => edges.push(edge),
                Err(e) => {
                    dropped += 1;
                    warn!(error = %e, "Discarding edge");
                }
            }
        }
    }

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        dropped,
        "Built movie connections"
    );
    edges
}

/// Number of edges touching each slot in `0..len`.
pub fn connection_counts(edges: &[MovieEdge], len: usize) -> Vec<usize> {
    let mut counts = vec![0; len];
    for edge in edges {
        if let Some(c) = counts.get_mut(edge.a) {
            *c += 1;
        }
        if let Some(c) = counts.get_mut(edge.b) {
            *c += 1;
        }
    }
    counts
}
