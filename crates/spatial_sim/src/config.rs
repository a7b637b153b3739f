//! Configuration management for the spatial simulation.
//!
//! Loads the TOML configuration file, writing a default one when it does not
//! exist yet, and validates the result.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use spatial_partition::SpatialConfig;
use std::path::Path;
use tracing::{info, warn};

fn default_tick_interval() -> u64 {
    16 // ~60 ticks per second
}

fn default_stats_every() -> u64 {
    300
}

fn default_detection_radius() -> f64 {
    50.0
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Simulation loop and entity settings
    pub simulation: SimulationSettings,
    /// Spatial index settings, handed to the library unchanged
    #[serde(default)]
    pub spatial: SpatialConfig,
    /// Logging configuration settings
    pub logging: LoggingSettings,
}

/// Simulation loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Tick interval in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Number of entities spawned at start
    pub entity_count: usize,
    /// Stop after this many ticks, 0 runs until interrupted
    #[serde(default)]
    pub max_ticks: u64,
    /// Log statistics every this many ticks
    #[serde(default = "default_stats_every")]
    pub stats_every: u64,
    /// Radius of the AI detection scan
    #[serde(default = "default_detection_radius")]
    pub detection_radius: f64,
    /// Seed for entity spawning and movement
    #[serde(default)]
    pub seed: u64,
    /// Render viewport used for visibility culling
    pub viewport: ViewportSettings,
}

/// Render viewport dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportSettings {
    pub width: f64,
    pub height: f64,
    /// Extra border around the viewport to avoid pop-in at screen edges
    pub margin: f64,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationSettings {
                tick_interval_ms: default_tick_interval(),
                entity_count: 2_000,
                max_ticks: 0,
                stats_every: default_stats_every(),
                detection_radius: default_detection_radius(),
                seed: 0,
                viewport: ViewportSettings {
                    width: 640.0,
                    height: 360.0,
                    margin: 32.0,
                },
            },
            spatial: SpatialConfig::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at
    /// the specified path and returns the default configuration.
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            match toml::from_str::<AppConfig>(&content) {
                Ok(config) => Ok(config),
                Err(e) => {
                    warn!("Failed to parse config file {}: {}", path.display(), e);
                    Err(e.into())
                }
            }
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        self.spatial.validate().map_err(|e| e.to_string())?;

        if self.simulation.tick_interval_ms == 0 {
            return Err("Tick interval must be at least 1 ms".to_string());
        }
        if self.simulation.stats_every == 0 {
            return Err("stats_every must be at least 1".to_string());
        }
        let radius = self.simulation.detection_radius;
        if radius.is_nan() || radius < 0.0 {
            return Err(format!("Invalid detection radius: {radius}"));
        }

        let viewport = &self.simulation.viewport;
        let usable = viewport.width > 0.0 && viewport.height > 0.0 && viewport.margin >= 0.0;
        if !usable {
            return Err("Viewport needs a positive size and a non-negative margin".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spatial_partition::Bounds;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.simulation.tick_interval_ms, 16);
        assert_eq!(config.simulation.entity_count, 2_000);
        assert_eq!(config.simulation.max_ticks, 0);
        assert_eq!(config.spatial.rebuild_every, 60);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().unwrap_err().contains("Invalid log level"));

        let mut config = AppConfig::default();
        config.spatial.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.simulation.viewport.width = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.simulation.detection_radius = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spatial_sim.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.simulation.entity_count, 2_000);

        // The default file is written out and loads back identically
        assert!(path.exists());
        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.spatial, config.spatial);
        assert_eq!(reloaded.simulation.tick_interval_ms, config.simulation.tick_interval_ms);
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let toml_content = r#"
[simulation]
entity_count = 500
max_ticks = 90
seed = 7

[simulation.viewport]
width = 800.0
height = 600.0
margin = 16.0

[spatial]
capacity = 8
rebuild_every = 30

[spatial.world]
x = 0.0
y = 0.0
width = 1024.0
height = 1024.0

[logging]
level = "debug"
json_format = true
"#;

        let temp_file = NamedTempFile::new().unwrap();
        tokio::fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = AppConfig::load_from_file(temp_file.path()).await.unwrap();

        assert_eq!(config.simulation.entity_count, 500);
        assert_eq!(config.simulation.max_ticks, 90);
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.tick_interval_ms, 16);
        assert_eq!(config.simulation.detection_radius, 50.0);
        assert_eq!(config.spatial.world, Bounds::new(0.0, 0.0, 1024.0, 1024.0));
        assert_eq!(config.spatial.capacity, 8);
        assert_eq!(config.spatial.max_depth, 10);
        assert_eq!(config.spatial.rebuild_every, 30);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[tokio::test]
    async fn test_load_invalid_toml() {
        let temp_file = NamedTempFile::new().unwrap();
        tokio::fs::write(temp_file.path(), "[simulation\nentity_count = ").await.unwrap();

        assert!(AppConfig::load_from_file(temp_file.path()).await.is_err());
    }
}
