//! Command-line interface definitions.
//!
//! Defines the CLI structure for the valuator binary using `clap`.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Config file read when `--config` is not given, if present.
pub const DEFAULT_CONFIG_PATH: &str = "valuator.toml";

/// Leader-ownership valuation engine
#[derive(Parser, Debug)]
#[command(name = "valuator")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one valuation pass and print its summary
    Recompute(RecomputeArgs),

    /// Run valuation passes periodically until interrupted
    Run(RunArgs),

    /// Validate configuration and prepare the database
    Check,
}

/// Arguments for `valuator recompute`.
#[derive(Args, Debug, Default)]
pub struct RecomputeArgs {
    /// Print the pass report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `valuator run`.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Seconds between passes (overrides `scheduler.interval_secs`)
    #[arg(long)]
    pub interval_secs: Option<u64>,
}

impl Cli {
    /// Resolve the configuration: the explicit `--config` file, else
    /// `valuator.toml` when it exists, else built-in defaults. Environment
    /// overrides apply in every case.
    ///
    /// # Errors
    /// Returns an error if the chosen file cannot be read or is invalid.
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH),
            None => Ok(Config::from_env()),
        }
    }
}
