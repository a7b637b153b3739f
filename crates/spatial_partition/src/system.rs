//! # Spatial Partition System
//!
//! Owns the world quadtree and rebuilds it from an entity snapshot on a fixed
//! frame cadence. Between rebuilds the tree is read-only and query results
//! reflect positions as of the last rebuild.

use crate::bounds::Bounds;
use crate::config::SpatialConfig;
use crate::error::SpatialError;
use crate::quadtree::QuadTree;
use crate::stats::SpatialStatistics;
use crate::types::{EntityId, SpatialObject};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Periodically rebuilt spatial index over the simulation world.
///
/// `update` is called once per tick and rebuilds the tree every
/// `rebuild_every` calls. Queries take `&self` and return references into the
/// tree, so results cannot be held across the next rebuild.
///
/// # Examples
///
/// ```rust
/// use spatial_partition::{Bounds, EntityId, Position, SpatialConfig, SpatialObject, SpatialPartitionSystem};
/// use std::time::Duration;
///
/// let config = SpatialConfig {
///     rebuild_every: 2,
///     ..SpatialConfig::new(Bounds::new(0.0, 0.0, 100.0, 100.0))
/// };
/// let mut system = SpatialPartitionSystem::new(config)?;
/// let entities = vec![SpatialObject::new(EntityId::new(), Position::new(5.0, 5.0))];
///
/// assert!(!system.update(entities.iter().copied(), Duration::from_millis(16)));
/// assert!(system.update(entities.iter().copied(), Duration::from_millis(16)));
/// assert_eq!(system.query_radius(5.0, 5.0, 1.0).len(), 1);
/// # Ok::<(), spatial_partition::SpatialError>(())
/// ```
#[derive(Debug)]
pub struct SpatialPartitionSystem<T = EntityId> {
    tree: QuadTree<T>,
    config: SpatialConfig,
    /// `update` calls since the last rebuild
    frame_count: u32,
    /// Simulated time since the last rebuild
    staleness: Duration,
    query_count: AtomicU64,
    last_rebuild_time: Duration,
    total_rebuilds: u64,
    entity_count: usize,
    dropped_last_rebuild: usize,
}

impl<T> SpatialPartitionSystem<T> {
    /// Creates a system with an empty tree covering `config.world`.
    pub fn new(config: SpatialConfig) -> Result<Self, SpatialError> {
        config.validate()?;

        info!(
            "Spatial partition created: world {:?}, capacity {}, max depth {}, rebuild every {} frames",
            config.world, config.capacity, config.max_depth, config.rebuild_every
        );

        Ok(Self {
            tree: QuadTree::new(config.world, config.capacity, config.max_depth),
            config,
            frame_count: 0,
            staleness: Duration::ZERO,
            query_count: AtomicU64::new(0),
            last_rebuild_time: Duration::ZERO,
            total_rebuilds: 0,
            entity_count: 0,
            dropped_last_rebuild: 0,
        })
    }

    /// Advances one frame, rebuilding when the interval has elapsed.
    ///
    /// `entities` is only consumed on rebuild frames, so passing a lazy
    /// iterator over the world costs nothing on the other frames. Returns
    /// whether a rebuild happened.
    pub fn update<I>(&mut self, entities: I, delta_time: Duration) -> bool
    where
        I: IntoIterator<Item = SpatialObject<T>>,
    {
        self.frame_count += 1;
        self.staleness += delta_time;

        if self.frame_count < self.config.rebuild_every {
            return false;
        }

        self.rebuild(entities);
        true
    }

    /// Rebuilds the tree from `entities` immediately.
    ///
    /// Also used at world init so queries are answered before the first
    /// interval has elapsed. Returns the number of entities indexed.
    pub fn rebuild<I>(&mut self, entities: I) -> usize
    where
        I: IntoIterator<Item = SpatialObject<T>>,
    {
        let start = Instant::now();
        let mut offered = 0usize;
        let inserted = self
            .tree
            .rebuild(entities.into_iter().inspect(|_| offered += 1));
        let elapsed = start.elapsed();

        let dropped = offered - inserted;
        if dropped > 0 {
            warn!(
                "{} of {} entities lie outside world bounds {:?} and were not indexed",
                dropped, offered, self.config.world
            );
        }

        debug!(
            "Rebuilt spatial index with {} entities in {:?} ({} nodes)",
            inserted,
            elapsed,
            self.tree.node_count()
        );

        self.frame_count = 0;
        self.staleness = Duration::ZERO;
        self.last_rebuild_time = elapsed;
        self.total_rebuilds += 1;
        self.entity_count = inserted;
        self.dropped_last_rebuild = dropped;
        inserted
    }

    /// Entities within `radius` of `(x, y)` as of the last rebuild.
    pub fn query_radius(&self, x: f64, y: f64, radius: f64) -> Vec<&SpatialObject<T>> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        self.tree.query_radius(x, y, radius)
    }

    /// Entities positioned inside `bounds` as of the last rebuild.
    ///
    /// Render culling passes the viewport with its own margin already added.
    pub fn query_bounds(&self, bounds: &Bounds) -> Vec<&SpatialObject<T>> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        self.tree.query(bounds)
    }

    /// Gets a statistics snapshot.
    pub fn get_statistics(&self) -> SpatialStatistics {
        let tree_stats = self.tree.stats();
        SpatialStatistics {
            entity_count: self.entity_count,
            last_rebuild_duration: self.last_rebuild_time,
            query_count: self.query_count.load(Ordering::Relaxed),
            frames_since_rebuild: self.frame_count,
            total_rebuilds: self.total_rebuilds,
            dropped_last_rebuild: self.dropped_last_rebuild,
            staleness: self.staleness,
            node_count: tree_stats.node_count,
            max_depth: tree_stats.max_depth,
        }
    }

    pub fn config(&self) -> &SpatialConfig {
        &self.config
    }

    pub fn world_bounds(&self) -> &Bounds {
        self.tree.bounds()
    }

    /// Read-only access to the underlying tree.
    pub fn tree(&self) -> &QuadTree<T> {
        &self.tree
    }
}
