//! Core domain types shared across the Knot-Graph workspace.
//!
//! A [`MovieNode`] is one watched (or recommended) movie. Two movies are
//! connected by a [`MovieEdge`] when they share at least one writer,
//! director or actor. Edges address nodes through their *position index*,
//! the slot a node occupies in the flat simulation buffers of the layout
//! engine.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

mod edge;
mod error;

pub use edge::{connection_counts, find_connections, MovieEdge, SharedRoles};
pub use error::{EdgeError, IndexError};

// =============================================================================
// Identifiers
// =============================================================================

/// Stable identifier of a movie (the catalog id, e.g. a Rotten Tomatoes slug).
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub String);

impl MovieId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MovieId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier of a person credited on a movie. Names are used as ids.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The credit categories that can connect two movies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovieRole {
    Writer,
    Director,
    Actor,
}

impl MovieRole {
    pub const ALL: [MovieRole; 3] = [MovieRole::Writer, MovieRole::Director, MovieRole::Actor];

    pub fn label(&self) -> &'static str {
        match self {
            MovieRole::Writer => "writer",
            MovieRole::Director => "director",
            MovieRole::Actor => "actor",
        }
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// A graph vertex representing one movie.
///
/// Nodes are created by the data layer and handed to the layout engine as an
/// ordered sequence. The engine only ever touches the position index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieNode {
    /// Stable identity.
    pub id: MovieId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub writers: BTreeSet<PersonId>,
    #[serde(default)]
    pub directors: BTreeSet<PersonId>,
    #[serde(default)]
    pub actors: BTreeSet<PersonId>,
    /// Genre labels, used by recommendation scoring.
    #[serde(default)]
    pub genres: BTreeSet<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    /// Critics score in `0..=100`.
    #[serde(default)]
    pub critics_rating: Option<u8>,
    /// Audience score in `0..=100`.
    #[serde(default)]
    pub audience_rating: Option<u8>,
    /// Slot in the layout buffers. Assigned by the layout engine.
    #[serde(skip)]
    position_index: Option<usize>,
}

impl MovieNode {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: MovieId(id.into()),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_writers<I, P>(mut self, people: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PersonId>,
    {
        self.writers.extend(people.into_iter().map(Into::into));
        self
    }

    pub fn with_directors<I, P>(mut self, people: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PersonId>,
    {
        self.directors.extend(people.into_iter().map(Into::into));
        self
    }

    pub fn with_actors<I, P>(mut self, people: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PersonId>,
    {
        self.actors.extend(people.into_iter().map(Into::into));
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres.extend(genres.into_iter().map(Into::into));
        self
    }

    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }

    pub fn with_ratings(mut self, critics: Option<u8>, audience: Option<u8>) -> Self {
        self.critics_rating = critics;
        self.audience_rating = audience;
        self
    }

    /// People credited in the given role.
    pub fn people(&self, role: MovieRole) -> &BTreeSet<PersonId> {
        match role {
            MovieRole::Writer => &self.writers,
            MovieRole::Director => &self.directors,
            MovieRole::Actor => &self.actors,
        }
    }

    /// Slot of this node in the layout buffers, once assigned.
    pub fn position_index(&self) -> Option<usize> {
        self.position_index
    }

    /// Builder form of [`assign_position_indices`] for a single node.
    pub fn with_position_index(mut self, index: usize) -> Self {
        self.position_index = Some(index);
        self
    }
}

impl PartialEq for MovieNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MovieNode {}

// =============================================================================
// Position indices
// =============================================================================

/// Give every node the slot matching its position in the sequence.
///
/// This must run before [`find_connections`]; edges are built from indices.
pub fn assign_position_indices(nodes: &mut [MovieNode]) {
    for (idx, node) in nodes.iter_mut().enumerate() {
        node.position_index = Some(idx);
    }
}

/// Check that every node carries a unique index below `num_points`.
pub fn validate_position_indices(nodes: &[MovieNode], num_points: usize) -> Result<(), IndexError> {
    let mut seen = vec![false; num_points];
    for node in nodes {
        let index = node.position_index.ok_or_else(|| IndexError::Unassigned {
            id: node.id.clone(),
        })?;
        if index >= num_points {
            return Err(IndexError::OutOfRange {
                id: node.id.clone(),
                index,
                num_points,
            });
        }
        if seen[index] {
            return Err(IndexError::Duplicate {
                id: node.id.clone(),
                index,
            });
        }
        seen[index] = true;
    }
    Ok(())
}
