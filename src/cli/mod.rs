//! Command-line interface for bundle-cache.
//!
//! # Commands
//!
//! - `resolve`: resolve every artifact of the configuration and bring the cache up to date
//! - `list`: resolve without copying and print the tracked artifacts
//! - `clean`: remove the cache directories
//!
//! # Global options
//!
//! - `-v, --verbose`: debug logging, and one info line per tracked or skipped artifact
//! - `-q, --quiet`: warnings and errors only
//! - `-c, --config <PATH>`: configuration file instead of searching for `bundle-cache.toml`
//! - `--offline`: never touch the network; remote indexes are read from the cache
//!
//! `RUST_LOG`, when set, takes precedence over `--verbose` and `--quiet`.
//!
//! # Examples
//!
//! ```bash
//! bundle-cache resolve
//! bundle-cache --offline -c dist/bundle-cache.toml resolve
//! bundle-cache list --embeddable --format json
//! bundle-cache -q clean
//! ```

mod clean;
mod list;
mod resolve;


use crate::config::Config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use list::TrackerSummary;

/// Runtime configuration derived from the global flags.
///
/// Kept apart from [`Cli`] so that tests and embedding code can run commands without parsing
/// arguments.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Default log filter directive, `None` to keep the subscriber default
    pub log_level: Option<String>,
    /// Per-artifact summaries at info level
    pub verbose: bool,
    /// Force offline mode over the configuration file
    pub offline: bool,
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    #[must_use]
    pub const fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Load the configuration and apply the command-line overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::discover(self.config_path.as_deref())?;
        config.resolution.offline |= self.offline;
        config.resolution.verbose |= self.verbose;
        Ok(config)
    }
}

/// Resolve, track and cache the bundles of an assembly.
#[derive(Parser)]
#[command(
    name = "bundle-cache",
    about = "Resolve, track and cache OSGi bundles, subsystems and P2 artifacts",
    version,
    long_about = "bundle-cache resolves the artifacts an OSGi assembly embeds or references, \
                  packs in-build modules on the fly and keeps a local cache of them."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging and per-artifact summaries
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to bundle-cache.toml
    ///
    /// By default the file is searched in the current directory and its parents.
    #[arg(short, long, global = true, env = "BUNDLE_CACHE_CONFIG")]
    config: Option<PathBuf>,

    /// Never touch the network
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every artifact and bring the cache up to date
    Resolve(resolve::ResolveCommand),

    /// Resolve and print the tracked artifacts without copying anything
    List(list::ListCommand),

    /// Remove the cache directories
    Clean(clean::CleanCommand),
}

impl Cli {
    /// Run the selected command.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(&config)
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            verbose: self.verbose,
            offline: self.offline,
            config_path: self.config.clone(),
        }
    }

    /// Run the selected command with an explicit runtime configuration.
    pub fn execute_with_config(self, config: &CliConfig) -> Result<()> {
        match self.command {
            Commands::Resolve(cmd) => cmd.execute(config),
            Commands::List(cmd) => cmd.execute(config),
            Commands::Clean(cmd) => cmd.execute(config),
        }
    }
}
