//! `bundle-cache resolve`

use super::CliConfig;
use crate::core::BundleCacheError;
use crate::resolver::CacheReport;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::debug;

/// Resolve every artifact of the configuration and bring the cache up to date.
///
/// Workspace modules are packed, repository and properties artifacts are copied and remote index
/// artifacts are downloaded, each only when its cached copy is missing or stale. The command fails
/// when an artifact could not be cached.
#[derive(Args, Debug, Default)]
pub struct ResolveCommand {
    /// Remove the cache directories first, forcing every artifact to be cached again
    #[arg(long)]
    clean: bool,
}

impl ResolveCommand {
    pub fn execute(self, cli: &CliConfig) -> Result<()> {
        let config = cli.load_config()?;
        let session = config.build_session()?;
        let mut manager = config.tracker_manager()?;

        if self.clean {
            manager.clean_cache()?;
        }
        manager.resolve_all(&session)?;
        debug!("Resolved {} artifact(s) for {}", manager.len(), session.project());

        let report = manager.cache_all()?;
        print_report(manager.len(), &report);

        if report.is_success() {
            Ok(())
        } else {
            Err(BundleCacheError::FileSystemError {
                operation: format!("cache {} artifact(s)", report.failed.len()),
                path: config.cache_directory().display().to_string(),
            }
            .into())
        }
    }
}

fn print_report(tracked: usize, report: &CacheReport) {
    println!("{} {} artifact(s)", "Tracked".green().bold(), tracked);
    println!("{} {}", "Cache".green().bold(), report);
    for failed in &report.failed {
        println!("  {} {}", "failed".red(), failed);
    }
}
