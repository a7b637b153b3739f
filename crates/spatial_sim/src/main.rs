//! Headless simulation driving the spatial partitioning system.
//!
//! Loads configuration, sets up logging, then ticks the simulation on a fixed
//! interval until the tick limit is reached or a shutdown signal arrives.

use anyhow::Result;
use std::time::Instant;
use tracing::{error, info};

mod cli;
mod config;
mod logging;
mod signals;
mod simulation;
mod world;

use cli::CliArgs;
use config::AppConfig;
use simulation::Simulation;

/// Main application: configuration plus the running simulation.
struct Application {
    config: AppConfig,
    simulation: Simulation,
}

impl Application {
    async fn new(args: CliArgs) -> Result<Self> {
        // Load configuration first (before logging setup)
        let mut config = AppConfig::load_from_file(&args.config_path).await?;
        args.apply_to(&mut config);

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;

        logging::setup_logging(&config.logging)?;

        info!("🚀 Spatial Simulation v{}", env!("CARGO_PKG_VERSION"));
        info!("📂 Config: {}", args.config_path.display());

        let simulation = Simulation::new(&config)?;
        Ok(Self { config, simulation })
    }

    async fn run(mut self) -> Result<()> {
        let spatial = &self.config.spatial;
        info!("📋 Configuration Summary:");
        info!(
            "  🌍 World: {:.0}x{:.0} at ({:.0}, {:.0})",
            spatial.world.width, spatial.world.height, spatial.world.x, spatial.world.y
        );
        info!(
            "  🌳 Node capacity {} | max depth {} | rebuild every {} ticks",
            spatial.capacity, spatial.max_depth, spatial.rebuild_every
        );
        info!(
            "  ⏱️ Tick interval: {}ms | tick limit: {}",
            self.config.simulation.tick_interval_ms, self.config.simulation.max_ticks
        );

        let tick_interval = self.simulation.tick_interval();
        let mut interval = tokio::time::interval(tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let shutdown = signals::wait_for_shutdown();
        tokio::pin!(shutdown);

        info!("✅ Simulation running, press Ctrl+C to stop");
        let started = Instant::now();

        while !self.simulation.is_finished() {
            tokio::select! {
                result = &mut shutdown => {
                    if let Err(e) = result {
                        error!("❌ Signal handling failed: {}", e);
                    }
                    info!("🛑 Shutdown signal received, stopping simulation");
                    break;
                }
                _ = interval.tick() => {
                    let report = self.simulation.tick(tick_interval);
                    if self.simulation.should_report() {
                        let stats = self.simulation.statistics();
                        info!(
                            "📊 Tick {} | {} visible | {} detections | {}",
                            report.tick,
                            report.visible,
                            report.detections,
                            serde_json::to_string(&stats)?
                        );
                    }
                }
            }
        }

        let stats = self.simulation.statistics();
        info!(
            "✅ Simulation finished after {} ticks in {:.2?}",
            self.simulation.ticks_run(),
            started.elapsed()
        );
        info!("📊 Final Statistics:");
        info!("  - Entities indexed: {}", stats.entity_count);
        info!("  - Dropped at last rebuild: {}", stats.dropped_last_rebuild);
        info!("  - Total rebuilds: {}", stats.total_rebuilds);
        info!("  - Queries served: {}", stats.query_count);
        info!("  - Last rebuild took: {:?}", stats.last_rebuild_duration);
        info!("  - Tree nodes: {} (depth {})", stats.node_count, stats.max_depth);

        Ok(())
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to start application: {e:?}");
            std::process::exit(1);
        }
    }

    Ok(())
}
