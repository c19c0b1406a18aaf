//! Error types for graph construction.

use thiserror::Error;

use crate::MovieId;

/// Reasons an edge between two movies cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EdgeError {
    /// The two movies share no writer, director or actor.
    #[error("movies {a} and {b} share no people")]
    NoSharedPeople { a: MovieId, b: MovieId },

    /// A node was handed to edge construction before it had a slot.
    #[error("movie {id} has no position index")]
    MissingPositionIndex { id: MovieId },
}

/// Violations of the position-index invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("movie {id} has no position index")]
    Unassigned { id: MovieId },

    #[error("movie {id} has index {index} outside 0..{num_points}")]
    OutOfRange {
        id: MovieId,
        index: usize,
        num_points: usize,
    },

    #[error("movie {id} reuses position index {index}")]
    Duplicate { id: MovieId, index: usize },
}
