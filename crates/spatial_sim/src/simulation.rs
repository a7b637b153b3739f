//! Fixed-tick simulation driving the spatial partition.
//!
//! Each tick moves the world, lets the partition system decide whether to
//! rebuild, then runs the two query consumers: viewport culling for render
//! and enemy detection for AI.

use anyhow::{Context, Result};
use spatial_partition::{SpatialPartitionSystem, SpatialStatistics};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{AppConfig, SimulationSettings};
use crate::world::{SimWorld, Viewport};

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// Whether the spatial index was rebuilt this tick
    pub rebuilt: bool,
    /// Entities inside the culling region
    pub visible: usize,
    /// Enemy pairs found by the AI scan
    pub detections: usize,
}

pub struct Simulation {
    world: SimWorld,
    system: SpatialPartitionSystem,
    settings: SimulationSettings,
    viewport: Viewport,
    tick: u64,
}

impl Simulation {
    /// Spawns the world and primes the index so the first ticks already see
    /// every entity.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut system = SpatialPartitionSystem::new(config.spatial)
            .context("Failed to create spatial partition")?;

        let settings = config.simulation.clone();
        let world = SimWorld::spawn(settings.entity_count, config.spatial.world, settings.seed);
        let indexed = system.rebuild(world.snapshot());
        let pending = world
            .agents()
            .iter()
            .filter(|agent| agent.position.is_none())
            .count();

        info!(
            "🌍 Spawned {} entities: {} indexed, {} still spawning",
            settings.entity_count, indexed, pending
        );

        let viewport = Viewport {
            width: settings.viewport.width,
            height: settings.viewport.height,
            margin: settings.viewport.margin,
        };

        Ok(Self {
            world,
            system,
            settings,
            viewport,
            tick: 0,
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.settings.tick_interval_ms)
    }

    /// Runs one tick of `delta_time` simulated time.
    pub fn tick(&mut self, delta_time: Duration) -> TickReport {
        self.tick += 1;
        self.world.step(delta_time);

        let rebuilt = self.system.update(self.world.snapshot(), delta_time);

        let culling = self.viewport.culling_bounds(self.world.camera_focus());
        let visible = self.system.query_bounds(&culling).len();
        let detections = self
            .world
            .detect_enemies(&self.system, self.settings.detection_radius);

        if rebuilt {
            debug!(
                "Tick {}: index rebuilt, {} visible, {} detections",
                self.tick, visible, detections
            );
        }

        TickReport {
            tick: self.tick,
            rebuilt,
            visible,
            detections,
        }
    }

    /// True once the configured tick limit is reached. A limit of 0 never ends.
    pub fn is_finished(&self) -> bool {
        self.settings.max_ticks != 0 && self.tick >= self.settings.max_ticks
    }

    /// True on ticks where statistics should be logged.
    pub fn should_report(&self) -> bool {
        self.tick > 0 && self.tick % self.settings.stats_every == 0
    }

    pub fn statistics(&self) -> SpatialStatistics {
        self.system.get_statistics()
    }

    pub fn ticks_run(&self) -> u64 {
        self.tick
    }
}
