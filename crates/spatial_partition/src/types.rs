//! # Core Type Definitions
//!
//! The value types exchanged between the entity store and the spatial index.
//!
//! ## Key Types
//!
//! - [`EntityId`] - Unique identifier for an entity owned by the simulation world
//! - [`Position`] - 2D world-space position with double precision
//! - [`SpatialObject`] - An entity handle paired with the position it was indexed at

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entity in the simulation world.
///
/// This is a wrapper around UUID so entity handles cannot be confused with
/// other identifiers. The spatial index never owns the entity itself, only
/// this handle.
///
/// # Examples
///
/// ```rust
/// use spatial_partition::EntityId;
///
/// let id = EntityId::new();
/// let parsed: EntityId = id.to_string().parse().unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Creates a new random entity ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::str::FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A position in the 2D simulation plane.
///
/// Y grows downward, matching screen space: "north" means smaller `y`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate (west to east)
    pub x: f64,
    /// Y coordinate (north to south)
    pub y: f64,
}

impl Position {
    /// Creates a new position with the specified coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    ///
    /// Radius checks compare against `radius * radius` so no square root is
    /// taken per candidate.
    #[inline]
    pub fn distance_squared(self, other: Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Position) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// An entity handle stored in the spatial index.
///
/// The position is required: the entity store resolves which entities have a
/// position before handing them over, so the index never has to deal with a
/// missing one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialObject<T> {
    /// Handle of the entity in the owning world
    pub id: T,
    /// Position the entity had when it was indexed
    pub position: Position,
}

impl<T> SpatialObject<T> {
    /// Pairs an entity handle with its position.
    pub fn new(id: T, position: Position) -> Self {
        Self { id, position }
    }
}
