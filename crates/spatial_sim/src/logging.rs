//! Logging system setup and configuration
//!
//! Initializes the tracing subscriber used by the simulation and the
//! spatial partition library.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingSettings;

/// Builds the level filter, letting `RUST_LOG` override the configured level.
fn build_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level))
}

/// Initialize the logging system
///
/// Installs a global subscriber with environment-aware filtering and either
/// plain or JSON formatted output.
///
/// # Environment Variables
/// * `RUST_LOG` - Override the configured filter (e.g. "debug", "spatial_partition=trace")
///
/// # Errors
/// Fails if a global subscriber has already been installed.
pub fn setup_logging(settings: &LoggingSettings) -> Result<()> {
    let filter = build_filter(settings);

    if settings.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(false))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init()?;
    }

    Ok(())
}
