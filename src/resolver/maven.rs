//! Resolution of artifacts coming from the build tool: the dependency graph, the repository sets
//! and the in-build workspace projects.

use super::{TrackerManager, resolution_error};
use crate::artifact::{ArtifactReference, ArtifactSet};
use crate::constants::DEFAULT_SCOPE;
use crate::core::BundleCacheError;
use crate::handler::{TypeHandler, project_build_directory};
use crate::manifest::ManifestHeaders;
use crate::resolver::filter::ArtifactFilter;
use crate::session::{BuildSession, ResolvedArtifact, WorkspaceProject};
use crate::tracker::TrackerBuilder;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An artifact about to be tracked, with the declaration that claimed it, if any.
struct Candidate {
    artifact: ResolvedArtifact,
    reference: Option<ArtifactReference>,
    cache_directory: PathBuf,
}

impl TrackerManager {
    /// Track the artifacts of the dependency graph and of the repository sets.
    ///
    /// `filter` runs after the configured filters. Returns the number of trackers added.
    ///
    /// # Errors
    ///
    /// - [`BundleCacheError::ResolutionError`] when a repository-set entry matches no dependency
    ///   and declares no version, or when a required artifact cannot be resolved
    /// - [`BundleCacheError::MissingBuilderField`] when a tracker cannot be built
    pub fn resolve_maven_artifacts(
        &mut self,
        session: &BuildSession,
        filter: Option<&dyn ArtifactFilter>,
    ) -> Result<usize> {
        let mut pool: Vec<ResolvedArtifact> = session
            .dependencies()
            .iter()
            .filter(|d| d.direct || self.config.include_transitive)
            .cloned()
            .collect();
        debug!("{} dependency candidate(s) for {}", pool.len(), session.project());

        let sets: Vec<(PathBuf, Vec<ArtifactReference>)> = self
            .repository_sets
            .iter()
            .map(|s| (self.cache_directory_for(s.cache_directory()), s.references().to_vec()))
            .collect();

        let mut candidates = Vec::new();
        for (cache_directory, references) in sets {
            for reference in references {
                let artifact = match pool.iter().position(|c| reference.matches(&c.coordinates)) {
                    Some(index) => pool.remove(index),
                    None => custom_artifact(&reference)?,
                };
                candidates.push(Candidate {
                    artifact,
                    reference: Some(reference),
                    cache_directory: cache_directory.clone(),
                });
            }
        }
        candidates.extend(pool.into_iter().map(|artifact| Candidate {
            artifact,
            reference: None,
            cache_directory: self.config.cache_directory.clone(),
        }));

        let mut added = 0;
        for candidate in candidates {
            if let Some(rejected_by) = self.filters.rejection(&candidate.artifact, filter) {
                let message = format!(
                    "Skipping {} (rejected by {})",
                    candidate.artifact.coordinates, rejected_by
                );
                if self.config.verbose {
                    info!("{message}");
                } else {
                    debug!("{message}");
                }
                continue;
            }
            if self.track_candidate(session, candidate)? {
                added += 1;
            }
        }
        Ok(added)
    }

    fn track_candidate(&mut self, session: &BuildSession, candidate: Candidate) -> Result<bool> {
        let coordinates = &candidate.artifact.coordinates;
        let handler = self.handler_for(coordinates)?;
        debug!("{} handled by {}", coordinates, handler.name());

        match session.workspace_project(coordinates) {
            Some(project) if handler.is_pack_on_the_fly_allowed() => {
                self.track_workspace_artifact(candidate, project, handler)
            }
            _ => self.track_repository_artifact(candidate, handler),
        }
    }

    /// Workspace path: the artifact is packed from the project's unpacked build output.
    fn track_workspace_artifact(
        &mut self,
        candidate: Candidate,
        project: &WorkspaceProject,
        handler: Arc<dyn TypeHandler>,
    ) -> Result<bool> {
        let Candidate {
            artifact,
            reference,
            cache_directory,
        } = candidate;
        let coordinates = &artifact.coordinates;
        let main_file = project.main_file();
        let workspace_directory = handler.workspace_directory(&main_file);

        let headers = if handler.is_manifest_file_required() {
            let Some(entry) = handler.default_manifest_path() else {
                skip_artifact(coordinates, "handler requires a manifest but knows no location");
                return Ok(false);
            };
            match ManifestHeaders::read_from_directory(&workspace_directory, entry) {
                Ok(Some(headers)) if handler.is_artifact_manifest_valid(&headers) => headers,
                Ok(Some(_)) => {
                    skip_artifact(
                        coordinates,
                        &format!("{entry} lacks the headers required by {}", handler.name()),
                    );
                    return Ok(false);
                }
                Ok(None) => {
                    skip_artifact(
                        coordinates,
                        &format!("no {} in {}", entry, workspace_directory.display()),
                    );
                    return Ok(false);
                }
                Err(e) => {
                    skip_artifact(coordinates, &format!("{e:#}"));
                    return Ok(false);
                }
            }
        } else {
            ManifestHeaders::default()
        };

        let symbolic_name = handler
            .default_symbolic_name_header()
            .and_then(|h| headers.main_value(h))
            .map(str::to_string);
        let naming_version = handler
            .default_version_header()
            .and_then(|h| headers.main_value(h))
            .or_else(|| reference.as_ref().and_then(|r| r.version.as_deref()))
            .filter(|v| !v.is_empty())
            .unwrap_or(&coordinates.version)
            .to_string();

        let file_name = self.cache_file_name(
            reference.as_ref().and_then(|r| r.copy_name.as_deref()),
            &coordinates.artifact_id,
            coordinates.classifier.as_deref(),
            symbolic_name.as_deref(),
            &naming_version,
            handler.default_extension().unwrap_or("jar"),
        );
        let original = project_build_directory(&main_file).join(&file_name);
        let (_, to_be_embedded) = self.config.classify_scope(&artifact.scope);

        let mut builder = self
            .tracker_builder(&cache_directory, &artifact, reference.as_ref(), handler)
            .with_headers(headers)
            .with_file(original)
            .with_cache_file_name(file_name)
            .with_workspace_directory(workspace_directory)
            .with_to_be_cached(true)
            .with_to_be_embedded(to_be_embedded);
        if let Some(symbolic_name) = symbolic_name {
            builder = builder.with_symbolic_name(symbolic_name);
        }

        Ok(self.insert_tracker(builder.build()?))
    }

    /// Repository path: the artifact is a packed file, resolved through the repository system
    /// when the session did not resolve it.
    fn track_repository_artifact(
        &mut self,
        candidate: Candidate,
        handler: Arc<dyn TypeHandler>,
    ) -> Result<bool> {
        let Candidate {
            artifact,
            reference,
            cache_directory,
        } = candidate;
        let coordinates = &artifact.coordinates;

        let file = match &artifact.file {
            Some(file) => file.clone(),
            None => match self.repository.resolve_artifact(coordinates) {
                Ok(Some(file)) => file,
                Ok(None) if artifact.optional => {
                    warn!("Skipping optional {}: not found in the repository", coordinates);
                    return Ok(false);
                }
                Ok(None) => {
                    return Err(resolution_error(coordinates, "not found in the repository"));
                }
                Err(e) if artifact.optional => {
                    warn!("Skipping optional {}: {:#}", coordinates, e);
                    return Ok(false);
                }
                Err(e) => return Err(resolution_error(coordinates, format!("{e:#}"))),
            },
        };

        let headers = if handler.is_manifest_file_required() {
            match read_valid_manifest(&file, handler.as_ref()) {
                Ok(headers) => headers,
                Err(reason) => {
                    skip_artifact(coordinates, &reason);
                    return Ok(false);
                }
            }
        } else {
            ManifestHeaders::default()
        };

        let symbolic_name = handler
            .default_symbolic_name_header()
            .and_then(|h| headers.main_value(h))
            .map(str::to_string);
        let extension = file
            .extension()
            .and_then(|e| e.to_str())
            .or_else(|| handler.default_extension())
            .unwrap_or("jar")
            .to_string();
        let file_name = self.cache_file_name(
            reference.as_ref().and_then(|r| r.copy_name.as_deref()),
            &coordinates.artifact_id,
            coordinates.classifier.as_deref(),
            symbolic_name.as_deref(),
            &coordinates.version,
            &extension,
        );
        let (to_be_cached, to_be_embedded) = self.config.classify_scope(&artifact.scope);

        let mut builder = self
            .tracker_builder(&cache_directory, &artifact, reference.as_ref(), handler)
            .with_headers(headers)
            .with_file(file)
            .with_cache_file_name(file_name)
            .with_to_be_cached(to_be_cached)
            .with_to_be_embedded(to_be_embedded);
        if let Some(symbolic_name) = symbolic_name {
            builder = builder.with_symbolic_name(symbolic_name);
        }

        Ok(self.insert_tracker(builder.build()?))
    }

    fn tracker_builder(
        &self,
        cache_directory: &Path,
        artifact: &ResolvedArtifact,
        reference: Option<&ArtifactReference>,
        handler: Arc<dyn TypeHandler>,
    ) -> TrackerBuilder {
        let coordinates = &artifact.coordinates;
        TrackerBuilder::repository(
            cache_directory,
            self.config.group_by_type,
            self.config.previous_caching_required,
        )
        .with_group_id(&coordinates.group_id)
        .with_artifact_id(&coordinates.artifact_id)
        .with_version(&coordinates.version)
        .with_classifier(coordinates.classifier.clone())
        .with_type(&coordinates.type_)
        .with_scope(&artifact.scope)
        .with_start_level(reference.map_or(0, |r| r.start_level))
        .with_cache_subdirectory(reference.and_then(|r| r.cache_subdirectory.clone()))
        .with_optional(artifact.optional)
        .with_handler(handler)
    }
}

/// Dependency standing for a repository-set entry that matched nothing in the graph.
fn custom_artifact(reference: &ArtifactReference) -> Result<ResolvedArtifact> {
    if !reference.has_version() {
        return Err(resolution_error(reference, "no version declared and no matching dependency"));
    }
    let coordinates = reference
        .coordinates()
        .ok_or_else(|| resolution_error(reference, "group id is required"))?;
    debug!("{} is not a dependency, resolving it directly", coordinates);
    Ok(ResolvedArtifact::new(coordinates, DEFAULT_SCOPE))
}

/// Headers of the packed artifact, or the reason they are unusable.
fn read_valid_manifest(file: &Path, handler: &dyn TypeHandler) -> Result<ManifestHeaders, String> {
    let entry = handler
        .default_manifest_path()
        .ok_or_else(|| format!("no manifest location for type handler {}", handler.name()))?;
    match ManifestHeaders::read(file, entry) {
        Ok(Some(headers)) if handler.is_artifact_manifest_valid(&headers) => Ok(headers),
        Ok(Some(_)) => Err(format!("{entry} lacks the headers required by {}", handler.name())),
        Ok(None) => Err(format!("no {entry} in {}", file.display())),
        Err(e) => Err(format!("{e:#}")),
    }
}

fn skip_artifact(coordinates: impl ToString, reason: &str) {
    let error = BundleCacheError::ManifestValidationError {
        coordinates: coordinates.to_string(),
        reason: reason.to_string(),
    };
    warn!("Skipping artifact: {}", error);
}
