//! Command-line interface argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::config::AppConfig;

/// Intelligent Disaster Monitor
///
/// Periodically gathers disaster and economic data, runs a chain of
/// analyst personas over it and alerts an operator with the resulting
/// economic recommendation.
///
/// Examples:
///   disaster_monitor
///   disaster_monitor --config ./config.yaml --once
///   disaster_monitor --verbose
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    ///
    /// A missing file means built-in defaults.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = AppConfig::DEFAULT_PATH,
        env = "MONITOR_CONFIG"
    )]
    pub config: PathBuf,

    /// Run a single monitoring cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Enable debug logging (ignored when RUST_LOG is set)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Default log directive when RUST_LOG is absent.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
