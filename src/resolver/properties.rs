//! Resolution of artifacts referenced from properties sets.

use super::{TrackerManager, resolution_error};
use crate::artifact::{ArtifactReference, ArtifactSet};
use crate::constants::DEFAULT_SCOPE;
use crate::tracker::TrackerBuilder;
use anyhow::Result;
use std::path::PathBuf;

impl TrackerManager {
    /// Track every properties-set entry, resolved directly through the repository system.
    ///
    /// Entries are required: one that is incomplete or cannot be resolved fails the pass with
    /// [`BundleCacheError::ResolutionError`](crate::core::BundleCacheError::ResolutionError).
    /// The cached file is named after the declared copy name, or the resolved file.
    pub fn resolve_properties_artifacts(&mut self) -> Result<usize> {
        let sets: Vec<(PathBuf, Vec<ArtifactReference>)> = self
            .properties_sets
            .iter()
            .map(|s| (self.cache_directory_for(s.cache_directory()), s.references().to_vec()))
            .collect();

        let (to_be_cached, to_be_embedded) = self.config.classify_scope(DEFAULT_SCOPE);
        let mut added = 0;
        for (cache_directory, references) in sets {
            for reference in references {
                let coordinates = reference.coordinates().ok_or_else(|| {
                    resolution_error(&reference, "group, artifact and version are required")
                })?;
                let file = self
                    .repository
                    .resolve_artifact(&coordinates)
                    .map_err(|e| resolution_error(&coordinates, format!("{e:#}")))?
                    .ok_or_else(|| resolution_error(&coordinates, "not found in the repository"))?;

                let handler = self.handler_for(&coordinates)?;

                let mut builder = TrackerBuilder::properties(
                    &cache_directory,
                    self.config.group_by_type,
                    self.config.previous_caching_required,
                )
                .with_group_id(&coordinates.group_id)
                .with_artifact_id(&coordinates.artifact_id)
                .with_version(&coordinates.version)
                .with_classifier(coordinates.classifier.clone())
                .with_type(&coordinates.type_)
                .with_scope(DEFAULT_SCOPE)
                .with_start_level(reference.start_level)
                .with_handler(handler)
                .with_file(file)
                .with_cache_subdirectory(reference.cache_subdirectory.clone())
                .with_to_be_cached(to_be_cached)
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
}
