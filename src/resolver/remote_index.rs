//! Resolution of artifacts published in P2-style remote repositories.

use super::TrackerManager;
use crate::artifact::{ArtifactSet, RemoteIndexSet};
use crate::constants::DEFAULT_SCOPE;
use crate::core::BundleCacheError;
use crate::tracker::TrackerBuilder;
use crate::utils::http::path_to_file_url;
use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};

impl TrackerManager {
    /// Track the entries of every remote index set.
    ///
    /// Each set's index URL is probed first; an unreachable index fails the pass with
    /// [`BundleCacheError::RepositoryUnreachable`]. Returns the number of trackers added.
    pub fn resolve_remote_index_artifacts(&mut self) -> Result<usize> {
        let sets = self.remote_index_sets.clone();
        let mut added = 0;

        for set in sets.iter().filter(|s| !s.is_empty()) {
            let cache_directory = self.cache_directory_for(set.cache_directory());
            let index_url = self.effective_index_url(set, &cache_directory)?;

            if !self.transport.is_reachable(&index_url) {
                return Err(BundleCacheError::RepositoryUnreachable {
                    url: index_url,
                }
                .into());
            }
            info!("Using remote index {} ({} entries)", index_url, set.references().len());

            let (_, to_be_embedded) = self.config.classify_scope(DEFAULT_SCOPE);
            for reference in set.references() {
                let Some(declared_url) = reference.url.as_deref() else {
                    continue;
                };
                let download_url = self.rebase_download_url(set, declared_url);

                let mut builder = TrackerBuilder::remote_index(
                    &cache_directory,
                    self.config.group_by_type,
                    self.config.previous_caching_required,
                )
                .with_group_id(reference.group_id.as_deref().unwrap_or(set.default_group_id()))
                .with_artifact_id(&reference.artifact_id)
                .with_version(reference.version.as_deref().unwrap_or_default())
                .with_classifier(reference.classifier.clone())
                .with_type(&reference.type_)
                .with_scope(DEFAULT_SCOPE)
                .with_start_level(reference.start_level)
                .with_handler(self.handlers.resolve_handler(&reference.type_, None))
                .with_download_url(download_url)
                .with_cache_subdirectory(reference.cache_subdirectory.clone())
                .with_to_be_cached(true)
                .with_to_be_embedded(to_be_embedded);
                if let Some(name) = reference.copy_name.as_deref().filter(|n| !n.is_empty()) {
                    builder = builder.with_cache_file_name(name);
                }

                if self.insert_tracker(builder.build()?) {
                    added += 1;
                }
            }
        }
        Ok(added)
    }

    /// Index URL to probe: the configured override, then the cache directory in offline mode,
    /// then the set's declared URL.
    fn effective_index_url(&self, set: &RemoteIndexSet, cache_directory: &Path) -> Result<String> {
        if let Some(url) = &self.config.remote_index_override {
            return Ok(url.clone());
        }
        if self.config.offline {
            return Ok(path_to_file_url(cache_directory));
        }
        set.url().map(str::to_string).ok_or_else(|| {
            BundleCacheError::ConfigurationError {
                message: "remote index set declares no URL".to_string(),
            }
            .into()
        })
    }

    /// Move a download URL derived from the set's URL onto the override URL. Explicit URLs pointing
    /// elsewhere are left alone.
    fn rebase_download_url(&self, set: &RemoteIndexSet, url: &str) -> String {
        let (Some(target), Some(base)) = (&self.config.remote_index_override, set.url()) else {
            return url.to_string();
        };
        match url.strip_prefix(base.trim_end_matches('/')) {
            Some(rest) => {
                let rebased = format!("{}{}", target.trim_end_matches('/'), rest);
                debug!("Rebased {} onto {}", url, rebased);
                rebased
            }
            None => url.to_string(),
        }
    }
}
