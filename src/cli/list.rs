//! `bundle-cache list`

use super::CliConfig;
use crate::tracker::Tracker;
use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

/// Resolve without copying anything and print the tracked artifacts.
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Only artifacts of this packaging type
    #[arg(long = "type", value_name = "TYPE")]
    type_: Option<String>,

    /// Only artifacts to embed into the assembly
    #[arg(long)]
    embeddable: bool,

    /// Only artifacts that belong on a build class path
    #[arg(long, conflicts_with = "embeddable")]
    classpath: bool,

    /// Output format (table, json)
    #[arg(short = 'f', long, default_value = "table")]
    format: String,
}

/// One line of `list` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerSummary {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub scope: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbolic_name: Option<String>,
    pub start_level: u32,
    pub cached_file: String,
    pub to_be_cached: bool,
    pub to_be_embedded: bool,
    pub classpath: bool,
    pub cached: bool,
}

impl From<&Tracker> for TrackerSummary {
    fn from(tracker: &Tracker) -> Self {
        Self {
            group_id: tracker.group_id().to_string(),
            artifact_id: tracker.artifact_id().to_string(),
            version: tracker.version().to_string(),
            type_: tracker.type_().to_string(),
            scope: tracker.scope().to_string(),
            source: tracker.kind().to_string(),
            symbolic_name: tracker.symbolic_name().map(str::to_string),
            start_level: tracker.start_level(),
            cached_file: tracker.cached_file().display().to_string(),
            to_be_cached: tracker.is_to_be_cached(),
            to_be_embedded: tracker.is_to_be_embedded(),
            classpath: tracker.handler().is_build_classpath_type(),
            cached: tracker.is_cached(),
        }
    }
}

impl ListCommand {
    pub fn execute(self, cli: &CliConfig) -> Result<()> {
        if !matches!(self.format.as_str(), "table" | "json") {
            bail!("Unknown output format '{}': expected table or json", self.format);
        }

        let config = cli.load_config()?;
        let session = config.build_session()?;
        let mut manager = config.tracker_manager()?;
        manager.resolve_all(&session)?;

        let trackers = if self.embeddable {
            manager.embeddable(&[])
        } else if self.classpath {
            manager.build_classpath()
        } else {
            manager.trackers()
        };
        let summaries: Vec<TrackerSummary> = trackers
            .iter()
            .filter(|t| self.type_.as_deref().is_none_or(|type_| t.type_() == type_))
            .map(TrackerSummary::from)
            .collect();

        if self.format == "json" {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        } else {
            print_table(&summaries);
        }
        Ok(())
    }
}

fn print_table(summaries: &[TrackerSummary]) {
    if summaries.is_empty() {
        println!("No artifacts tracked.");
        return;
    }

    println!(
        "{:<40} {:<16} {:<10} {:<10} {:<6} {}",
        "Artifact".cyan().bold(),
        "Version".cyan().bold(),
        "Type".cyan().bold(),
        "Scope".cyan().bold(),
        "Level".cyan().bold(),
        "Cached file".cyan().bold()
    );
    println!("{}", "-".repeat(100).bright_black());

    for summary in summaries {
        let marker = match (summary.to_be_embedded, summary.cached) {
            (true, _) => "embed".green(),
            (false, true) => "cached".normal(),
            (false, false) => "-".bright_black(),
        };
        println!(
            "{:<40} {:<16} {:<10} {:<10} {:<6} {} [{}]",
            format!("{}:{}", summary.group_id, summary.artifact_id),
            summary.version,
            summary.type_,
            summary.scope,
            summary.start_level,
            summary.cached_file,
            marker
        );
    }
    println!();
    println!("{}: {} artifact(s)", "Total".green().bold(), summaries.len());
}
