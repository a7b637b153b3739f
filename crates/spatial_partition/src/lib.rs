//! # Spatial Partition
//!
//! A 2D broad-phase index that answers "which entities are near point P" and
//! "which entities are inside region R" without scanning every live entity
//! every frame.
//!
//! ## Components
//!
//! - [`Bounds`] - axis-aligned rectangle with half-open point containment
//! - [`QuadTree`] - arena-backed point quadtree with region and radius queries
//! - [`SpatialPartitionSystem`] - owns the world tree and rebuilds it on a
//!   fixed frame cadence, exposing queries and [`SpatialStatistics`]
//!
//! ## Usage
//!
//! ```rust
//! use spatial_partition::{Bounds, EntityId, Position, SpatialConfig, SpatialObject, SpatialPartitionSystem};
//!
//! let mut system = SpatialPartitionSystem::new(SpatialConfig::new(Bounds::new(0.0, 0.0, 1000.0, 1000.0)))?;
//!
//! let player = EntityId::new();
//! system.rebuild([
//!     SpatialObject::new(player, Position::new(100.0, 100.0)),
//!     SpatialObject::new(EntityId::new(), Position::new(900.0, 900.0)),
//! ]);
//!
//! let nearby = system.query_radius(110.0, 100.0, 20.0);
//! assert_eq!(nearby.len(), 1);
//! assert_eq!(nearby[0].id, player);
//! # Ok::<(), spatial_partition::SpatialError>(())
//! ```
//!
//! Queries return candidates by position only; callers apply their own exact
//! checks (team, line of sight) afterwards.

pub mod bounds;
pub mod config;
pub mod error;
pub mod quadtree;
pub mod stats;
pub mod system;
pub mod types;

pub use bounds::Bounds;
pub use config::{SpatialConfig, MAX_SUPPORTED_DEPTH};
pub use error::SpatialError;
pub use quadtree::{QuadTree, QuadTreeNode, TreeStats};
pub use stats::SpatialStatistics;
pub use system::SpatialPartitionSystem;
pub use types::{EntityId, Position, SpatialObject};
