//! Error types for the spatial partitioning system.
//!
//! Only configuration can fail. Inserting an out-of-world entity is reported
//! through a `bool` and queries always return a (possibly empty) list.

use crate::bounds::Bounds;

/// Errors raised while validating a spatial configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpatialError {
    /// World bounds must be finite with a positive width and height
    #[error("Invalid world bounds {0:?}: extents must be finite and positive")]
    InvalidBounds(Bounds),

    /// Nodes must be able to hold at least one object before subdividing
    #[error("Node capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),

    /// Depth limit beyond what f64 quadrant splitting can resolve
    #[error("Maximum depth {depth} exceeds supported limit {limit}")]
    InvalidMaxDepth { depth: u8, limit: u8 },

    /// The tree has to be rebuilt at least every frame
    #[error("Rebuild interval must be at least one frame")]
    InvalidRebuildInterval,
}
