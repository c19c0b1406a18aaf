//! Continuously running force-directed layout for the movie graph.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   edges (once)   ┌─────────────────────────────────┐
//! │  MovieNodes  │─────────────────▶│          LayoutEngine           │
//! └──────────────┘                  │                                 │
//!                                   │  simulation loop (every 20 ms)  │
//!                                   │  repulsion → attraction →       │
//!                                   │  integrate → publish raw        │
//!                                   │               │ watch           │
//!                                   │               ▼                 │
//!  UI: zoom / pan / bounds ────────▶│  presentation loop (every 10 ms)│
//!                     watch         │  normalize → publish pixels     │
//!                                   └───────────────┬─────────────────┘
//!                                                   │ Arc<NormalizedPositions>
//!                                                   ▼
//!                                               renderer
//! ```
//!
//! The two loops run at independent cadences. Each buffer pair has exactly
//! one writer, and hand-off is an `Arc` swap, so no lock sits on the hot
//! path. Repulsion is all-pairs (O(n²)) over fixed-width batches of node
//! slots; slots past the node count are padding and never exert or receive
//! force.

mod circular;
mod config;
mod engine;
mod error;
pub mod presentation;
mod session;
pub mod simulation;
mod state;

pub use circular::circle_positions;
pub use config::LayoutConfig;
pub use engine::{EngineStatus, LayoutEngine};
pub use error::LayoutError;
pub use session::LayoutSession;
pub use state::{
    BatchGeometry, Bounds, NormalizedPositions, PhysicsParams, PointBuffer, RawSnapshot,
    SimulationState, UnitPoint, ViewState,
};

/// Result type for layout operations.
pub type LayoutResult<T> = std::result::Result<T, LayoutError>;
