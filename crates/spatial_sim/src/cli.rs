//! Command-line interface handling for the spatial simulation.
//!
//! Uses the `clap` builder API; every flag overrides a value from the
//! configuration file.

use crate::config::AppConfig;
use clap::{Arg, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Optional override for the number of ticks to run
    pub ticks: Option<u64>,
    /// Optional override for the number of simulated entities
    pub entities: Option<usize>,
}

impl CliArgs {
    fn command() -> Command {
        Command::new("Spatial Simulation")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Headless simulation driving the quadtree spatial partition")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("spatial_sim.toml"),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
            .arg(
                Arg::new("ticks")
                    .short('t')
                    .long("ticks")
                    .value_name("COUNT")
                    .help("Stop after this many ticks (0 runs until interrupted)")
                    .value_parser(clap::value_parser!(u64)),
            )
            .arg(
                Arg::new("entities")
                    .short('n')
                    .long("entities")
                    .value_name("COUNT")
                    .help("Number of simulated entities")
                    .value_parser(clap::value_parser!(usize)),
            )
    }

    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    /// Parses an explicit argument list, exiting with usage on error.
    pub fn parse_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::from_matches(&Self::command().get_matches_from(args))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("spatial_sim.toml")),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            ticks: matches.get_one::<u64>("ticks").copied(),
            entities: matches.get_one::<usize>("entities").copied(),
        }
    }

    /// Applies command-line overrides on top of a loaded configuration.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.json_format = true;
        }
        if let Some(ticks) = self.ticks {
            config.simulation.max_ticks = ticks;
        }
        if let Some(entities) = self.entities {
            config.simulation.entity_count = entities;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["spatial_sim"]);
        assert_eq!(args.config_path, PathBuf::from("spatial_sim.toml"));
        assert!(args.log_level.is_none());
        assert!(!args.json_logs);
        assert!(args.ticks.is_none());
        assert!(args.entities.is_none());
    }

    #[test]
    fn test_overrides_apply() {
        let args = CliArgs::parse_from([
            "spatial_sim",
            "-c",
            "custom.toml",
            "--log-level",
            "debug",
            "--json-logs",
            "-t",
            "120",
            "-n",
            "5000",
        ]);
        assert_eq!(args.config_path, PathBuf::from("custom.toml"));

        let mut config = AppConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
        assert_eq!(config.simulation.max_ticks, 120);
        assert_eq!(config.simulation.entity_count, 5000);
    }
}
