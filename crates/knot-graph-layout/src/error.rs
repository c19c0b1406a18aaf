//! Error types for layout operations.

use knot_graph_core::IndexError;
use thiserror::Error;

/// Errors that can occur while building or driving a layout.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// A configuration value is out of its valid range.
    #[error("invalid layout config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Node position indices violate the buffer invariant.
    #[error("invalid position index: {0}")]
    InvalidIndex(#[from] IndexError),

    /// `start` was called outside a tokio runtime.
    #[error("layout loops need a tokio runtime")]
    NoRuntime,

    /// The background loops were already started once.
    #[error("layout already started")]
    AlreadyStarted,

    /// Synchronous stepping is only possible before the loops start.
    #[error("layout is running; synchronous stepping is unavailable")]
    NotIdle,
}
