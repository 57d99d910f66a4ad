//! Copy phases: populating the cache directory from the tracker set.
//!
//! Only trackers that are to be cached and whose cached copy is missing or stale are touched.
//! Workspace projects are packed with the archiver matching their handler, repository and
//! properties artifacts are copied, remote index artifacts are downloaded.

use super::TrackerManager;
use crate::archiver::ArchiverFactory;
use crate::artifact::ArtifactSet;
use crate::core::BundleCacheError;
use crate::tracker::{CacheStatus, Tracker, TrackerKind};
use crate::utils::Transport;
use crate::utils::fs::{copy_file, remove_dir_all, remove_file};
use crate::utils::http::file_url_path;
use anyhow::Result;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Outcome of one or more copy phases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheReport {
    /// Files copied from the repository or a properties set
    pub copied: usize,
    /// Workspace projects packed on the fly
    pub packed: usize,
    /// Files downloaded from a remote index
    pub downloaded: usize,
    /// Cached copies already fresh
    pub up_to_date: usize,
    /// Downloads left out in offline mode
    pub skipped: usize,
    /// Artifacts whose copy failed
    pub failed: Vec<String>,
}

impl CacheReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: Self) {
        self.copied += other.copied;
        self.packed += other.packed;
        self.downloaded += other.downloaded;
        self.up_to_date += other.up_to_date;
        self.skipped += other.skipped;
        self.failed.extend(other.failed);
    }

    /// Number of files written to the cache.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.copied + self.packed + self.downloaded
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for CacheReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} copied, {} packed, {} downloaded, {} up to date",
            self.copied, self.packed, self.downloaded, self.up_to_date
        )?;
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        if !self.failed.is_empty() {
            write!(f, ", {} failed", self.failed.len())?;
        }
        Ok(())
    }
}

impl TrackerManager {
    /// Run every copy phase: repository, remote index, properties.
    pub fn cache_all(&mut self) -> Result<CacheReport> {
        let mut report = self.copy_maven_artifacts_to_cache()?;
        report.merge(self.copy_remote_index_artifacts_to_cache()?);
        report.merge(self.copy_properties_artifacts_to_cache()?);
        info!("Cache updated: {}", report);
        Ok(report)
    }

    /// Pack workspace projects and copy repository artifacts into the cache.
    ///
    /// A packing failure is fatal ([`BundleCacheError::PackagingError`]); a failed copy is logged
    /// and reported.
    pub fn copy_maven_artifacts_to_cache(&mut self) -> Result<CacheReport> {
        let mut report = CacheReport::default();
        let archivers = self.archivers.as_ref();

        for tracker in self.trackers.values_mut().filter(|t| t.kind() == TrackerKind::Repository) {
            if !tracker.is_to_be_cached() {
                continue;
            }
            if tracker.cache_status() == CacheStatus::Fresh {
                debug!("{} is up to date", tracker);
                report.up_to_date += 1;
                continue;
            }

            if tracker.is_workspace_project() {
                pack_workspace_artifact(archivers, tracker)?;
                report.packed += 1;
                tracker.mark_cached();
            } else if copy_tracked_file(tracker, &mut report) {
                tracker.mark_cached();
            }
        }
        Ok(report)
    }

    /// Download remote index artifacts into the cache.
    ///
    /// In offline mode only `file://` downloads run; the others are skipped with a warning.
    pub fn copy_remote_index_artifacts_to_cache(&mut self) -> Result<CacheReport> {
        let mut report = CacheReport::default();
        let transport = &self.transport;
        let offline = self.config.offline;

        for tracker in self.trackers.values_mut().filter(|t| t.kind() == TrackerKind::RemoteIndex) {
            if !tracker.is_to_be_cached() {
                continue;
            }
            if tracker.cache_status() == CacheStatus::Fresh {
                report.up_to_date += 1;
                continue;
            }
            let Some(url) = tracker.download_url().map(str::to_string) else {
                continue;
            };
            if offline && file_url_path(&url).is_none() {
                warn!("Offline: {} is not cached and cannot be downloaded from {}", tracker, url);
                report.skipped += 1;
                continue;
            }
            if download_tracked_file(transport, tracker, &url, &mut report) {
                tracker.mark_cached();
            }
        }
        Ok(report)
    }

    /// Copy properties-set artifacts into the cache.
    pub fn copy_properties_artifacts_to_cache(&mut self) -> Result<CacheReport> {
        let mut report = CacheReport::default();

        for tracker in self.trackers.values_mut().filter(|t| t.kind() == TrackerKind::Properties) {
            if !tracker.is_to_be_cached() {
                continue;
            }
            if tracker.cache_status() == CacheStatus::Fresh {
                report.up_to_date += 1;
                continue;
            }
            if copy_tracked_file(tracker, &mut report) {
                tracker.mark_cached();
            }
        }
        Ok(report)
    }

    /// Remove every cache directory: the global one and those declared by the sets.
    pub fn clean_cache(&mut self) -> Result<()> {
        let mut directories = BTreeSet::<PathBuf>::new();
        directories.insert(self.config.cache_directory.clone());
        directories.extend(
            self.repository_sets.iter().filter_map(|s| s.cache_directory()).map(PathBuf::from),
        );
        directories.extend(
            self.remote_index_sets.iter().filter_map(|s| s.cache_directory()).map(PathBuf::from),
        );
        directories.extend(
            self.properties_sets.iter().filter_map(|s| s.cache_directory()).map(PathBuf::from),
        );

        for directory in &directories {
            info!("Removing cache directory {}", directory.display());
            remove_dir_all(directory)?;
        }
        for tracker in self.trackers.values_mut() {
            tracker.mark_cached();
        }
        Ok(())
    }
}

/// Pack a workspace project's output into its cached file, replacing a stale one.
fn pack_workspace_artifact(archivers: &dyn ArchiverFactory, tracker: &Tracker) -> Result<()> {
    let packaging_error = |archiver: &str, reason: String| BundleCacheError::PackagingError {
        coordinates: tracker.to_string(),
        archiver: archiver.to_string(),
        reason,
    };

    let kind = tracker.handler().archiver_kind().ok_or_else(|| {
        packaging_error("none", format!("{} has no archiver", tracker.handler().name()))
    })?;
    let directory = tracker
        .workspace_directory()
        .ok_or_else(|| packaging_error(&kind.to_string(), "no workspace directory".to_string()))?;
    if !directory.is_dir() {
        return Err(packaging_error(
            &kind.to_string(),
            format!("workspace directory {} does not exist", directory.display()),
        )
        .into());
    }

    remove_file(tracker.cached_file())
        .map_err(|e| packaging_error(&kind.to_string(), format!("{e:#}")))?;

    let mut archiver = archivers.create(kind);
    let manifest_file = tracker
        .handler()
        .default_manifest_path()
        .map(|entry| directory.join(entry))
        .filter(|path| path.is_file());
    if let Some(manifest_file) = &manifest_file {
        archiver.set_manifest_file(manifest_file);
    } else if !tracker.headers().is_empty() {
        archiver.set_manifest(tracker.headers().clone());
    }
    archiver.add_directory_contents(directory);
    archiver.set_destination(tracker.cached_file());
    let archive = archiver
        .create_archive()
        .map_err(|e| packaging_error(&kind.to_string(), format!("{e:#}")))?;

    info!("Packed {} into {}", tracker, archive.display());
    Ok(())
}

/// Returns whether the cached copy was written.
fn copy_tracked_file(tracker: &Tracker, report: &mut CacheReport) -> bool {
    let Some(source) = tracker.file() else {
        return false;
    };
    match copy_file(source, tracker.cached_file()) {
        Ok(bytes) => {
            debug!("Copied {} ({} bytes) to {}", tracker, bytes, tracker.cached_file().display());
            report.copied += 1;
            true
        }
        Err(e) => {
            warn!("Failed to cache {}: {:#}", tracker, e);
            report.failed.push(tracker.to_string());
            false
        }
    }
}

fn download_tracked_file(
    transport: &Transport,
    tracker: &Tracker,
    url: &str,
    report: &mut CacheReport,
) -> bool {
    match transport.download(url, tracker.cached_file()) {
        Ok(bytes) => {
            debug!("Downloaded {} ({} bytes) from {}", tracker, bytes, url);
            report.downloaded += 1;
            true
        }
        Err(e) => {
            warn!("Failed to download {}: {:#}", tracker, e);
            report.failed.push(tracker.to_string());
            false
        }
    }
}
