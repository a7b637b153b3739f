//! Diagnostic snapshots exposed for debugging and tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Point-in-time statistics for a [`SpatialPartitionSystem`](crate::SpatialPartitionSystem).
///
/// Meant for logs and tuning dashboards. Callers should not branch on these
/// values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialStatistics {
    /// Entities indexed by the last rebuild
    pub entity_count: usize,
    /// Wall-clock time spent in the last rebuild
    pub last_rebuild_duration: Duration,
    /// Queries served since the system was created
    pub query_count: u64,
    /// `update` calls since the last rebuild
    pub frames_since_rebuild: u32,
    /// Rebuilds performed since the system was created
    pub total_rebuilds: u64,
    /// Entities the last rebuild skipped for lying outside the world
    pub dropped_last_rebuild: usize,
    /// Simulated time accumulated since the last rebuild
    pub staleness: Duration,
    /// Nodes allocated in the tree arena
    pub node_count: usize,
    /// Deepest node currently in the tree
    pub max_depth: u8,
}

impl SpatialStatistics {
    /// Fraction of offered entities the last rebuild indexed, 1.0 when none
    /// were offered.
    pub fn indexed_ratio(&self) -> f64 {
        let offered = self.entity_count + self.dropped_last_rebuild;
        if offered == 0 {
            1.0
        } else {
            self.entity_count as f64 / offered as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_ratio() {
        let mut stats = SpatialStatistics::default();
        assert_eq!(stats.indexed_ratio(), 1.0);

        stats.entity_count = 3;
        stats.dropped_last_rebuild = 1;
        assert_eq!(stats.indexed_ratio(), 0.75);
    }

    #[test]
    fn test_statistics_serialize() {
        let stats = SpatialStatistics {
            entity_count: 12,
            query_count: 40,
            last_rebuild_duration: Duration::from_micros(250),
            ..Default::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        let back: SpatialStatistics = serde_json::from_str(&json).unwrap();
        assert_eq!(stats, back);
    }
}
