//! Configuration for the spatial partitioning system.
//!
//! The rebuild cadence is the main performance lever, so it lives here next
//! to the tree shape parameters instead of being a constant.

use crate::bounds::Bounds;
use crate::error::SpatialError;
use serde::{Deserialize, Serialize};

/// Deepest subdivision accepted by [`SpatialConfig::validate`]
pub const MAX_SUPPORTED_DEPTH: u8 = 32;

/// Default world extent for serde deserialization
fn default_world() -> Bounds {
    Bounds::new(-1000.0, -1000.0, 2000.0, 2000.0)
}

fn default_capacity() -> usize {
    4
}

fn default_max_depth() -> u8 {
    10
}

/// Default rebuild cadence: once per second at 60 frames per second
fn default_rebuild_every() -> u32 {
    60
}

/// Settings for a [`SpatialPartitionSystem`](crate::SpatialPartitionSystem).
///
/// Every field has a serde default, so a TOML table only needs the values
/// it overrides.
///
/// # Examples
///
/// ```rust
/// use spatial_partition::{Bounds, SpatialConfig};
///
/// let config = SpatialConfig {
///     rebuild_every: 30,
///     ..SpatialConfig::new(Bounds::new(0.0, 0.0, 512.0, 512.0))
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialConfig {
    /// Static extent of the playable world; entities outside it are not indexed
    #[serde(default = "default_world")]
    pub world: Bounds,
    /// Objects a node stores directly before subdividing
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Depth at which nodes stop subdividing and store without limit
    #[serde(default = "default_max_depth")]
    pub max_depth: u8,
    /// Number of `update` calls between rebuilds
    #[serde(default = "default_rebuild_every")]
    pub rebuild_every: u32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self::new(default_world())
    }
}

impl SpatialConfig {
    /// Default settings over the given world bounds.
    pub fn new(world: Bounds) -> Self {
        Self {
            world,
            capacity: default_capacity(),
            max_depth: default_max_depth(),
            rebuild_every: default_rebuild_every(),
        }
    }

    /// Checks that the configuration can build a usable tree.
    pub fn validate(&self) -> Result<(), SpatialError> {
        if !self.world.is_valid() || self.world.width <= 0.0 || self.world.height <= 0.0 {
            return Err(SpatialError::InvalidBounds(self.world));
        }
        if self.capacity == 0 {
            return Err(SpatialError::InvalidCapacity(self.capacity));
        }
        if self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(SpatialError::InvalidMaxDepth {
                depth: self.max_depth,
                limit: MAX_SUPPORTED_DEPTH,
            });
        }
        if self.rebuild_every == 0 {
            return Err(SpatialError::InvalidRebuildInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = SpatialConfig::default();
        assert_eq!(config.world, Bounds::new(-1000.0, -1000.0, 2000.0, 2000.0));
        assert_eq!(config.capacity, 4);
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.rebuild_every, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let base = SpatialConfig::default();

        let flat = SpatialConfig {
            world: Bounds::new(0.0, 0.0, 100.0, 0.0),
            ..base
        };
        assert_eq!(flat.validate(), Err(SpatialError::InvalidBounds(flat.world)));

        let nan = SpatialConfig {
            world: Bounds::new(f64::NAN, 0.0, 100.0, 100.0),
            ..base
        };
        assert!(matches!(nan.validate(), Err(SpatialError::InvalidBounds(_))));

        let empty_nodes = SpatialConfig { capacity: 0, ..base };
        assert_eq!(empty_nodes.validate(), Err(SpatialError::InvalidCapacity(0)));

        let too_deep = SpatialConfig { max_depth: 40, ..base };
        assert_eq!(
            too_deep.validate(),
            Err(SpatialError::InvalidMaxDepth { depth: 40, limit: MAX_SUPPORTED_DEPTH })
        );

        let never = SpatialConfig { rebuild_every: 0, ..base };
        assert_eq!(never.validate(), Err(SpatialError::InvalidRebuildInterval));
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
capacity = 8
rebuild_every = 30

[world]
x = 0.0
y = 0.0
width = 4096.0
height = 2048.0
        "#;

        let config: SpatialConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.world, Bounds::new(0.0, 0.0, 4096.0, 2048.0));
        assert_eq!(config.capacity, 8);
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.rebuild_every, 30);
    }

    #[test]
    fn test_config_serialization() {
        let config = SpatialConfig {
            capacity: 16,
            ..SpatialConfig::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: SpatialConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }
}
