//! `bundle-cache clean`

use super::CliConfig;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Remove the global cache directory and those declared by artifact sets.
#[derive(Args, Debug, Default)]
pub struct CleanCommand {}

impl CleanCommand {
    pub fn execute(self, cli: &CliConfig) -> Result<()> {
        let config = cli.load_config()?;
        let mut manager = config.tracker_manager()?;
        manager.clean_cache()?;
        println!("{} {}", "Removed".green().bold(), config.cache_directory().display());
        Ok(())
    }
}
