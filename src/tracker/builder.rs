//! Tracker construction.
//!
//! A builder is bound to a [`TrackerKind`] when it is created, together with the settings every
//! tracker of a pass shares (cache directory, group-by-type, previous-caching-required). Fields
//! are accumulated with chained `with_*` setters; [`TrackerBuilder::build`] checks the identity
//! fields and hands over to the factory of the bound kind.
//!
//! The cached file lives at `<cache directory>/<subdirectory>/<file name>`, where the
//! subdirectory is the declared override, or the type when grouping by type, or nothing.

use super::{Tracker, TrackerKind};
use crate::core::BundleCacheError;
use crate::handler::TypeHandler;
use crate::manifest::ManifestHeaders;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Accumulates the fields of one [`Tracker`].
#[derive(Debug, Clone)]
pub struct TrackerBuilder {
    kind: TrackerKind,
    cache_directory: PathBuf,
    group_by_type: bool,
    previous_caching_required: bool,
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    classifier: Option<String>,
    type_: Option<String>,
    scope: Option<String>,
    start_level: u32,
    symbolic_name: Option<String>,
    headers: ManifestHeaders,
    handler: Option<Arc<dyn TypeHandler>>,
    file: Option<PathBuf>,
    cache_file_name: Option<String>,
    cache_subdirectory: Option<String>,
    download_url: Option<String>,
    workspace_directory: Option<PathBuf>,
    to_be_cached: bool,
    to_be_embedded: bool,
    cached: bool,
    optional: bool,
    workspace_project: bool,
}

impl TrackerBuilder {
    fn new(
        kind: TrackerKind,
        cache_directory: &Path,
        group_by_type: bool,
        previous_caching_required: bool,
    ) -> Self {
        Self {
            kind,
            cache_directory: cache_directory.to_path_buf(),
            group_by_type,
            previous_caching_required,
            group_id: None,
            artifact_id: None,
            version: None,
            classifier: None,
            type_: None,
            scope: None,
            start_level: 0,
            symbolic_name: None,
            headers: ManifestHeaders::default(),
            handler: None,
            file: None,
            cache_file_name: None,
            cache_subdirectory: None,
            download_url: None,
            workspace_directory: None,
            to_be_cached: false,
            to_be_embedded: false,
            cached: false,
            optional: false,
            workspace_project: false,
        }
    }

    /// Builder for an artifact of the build-tool repository or the workspace.
    #[must_use]
    pub fn repository(
        cache_directory: &Path,
        group_by_type: bool,
        previous_caching_required: bool,
    ) -> Self {
        Self::new(
            TrackerKind::Repository,
            cache_directory,
            group_by_type,
            previous_caching_required,
        )
    }

    /// Builder for an artifact downloaded from a remote index.
    #[must_use]
    pub fn remote_index(
        cache_directory: &Path,
        group_by_type: bool,
        previous_caching_required: bool,
    ) -> Self {
        Self::new(
            TrackerKind::RemoteIndex,
            cache_directory,
            group_by_type,
            previous_caching_required,
        )
    }

    /// Builder for an artifact referenced from a properties file.
    #[must_use]
    pub fn properties(
        cache_directory: &Path,
        group_by_type: bool,
        previous_caching_required: bool,
    ) -> Self {
        Self::new(
            TrackerKind::Properties,
            cache_directory,
            group_by_type,
            previous_caching_required,
        )
    }

    pub(super) fn from_tracker(tracker: &Tracker) -> Self {
        let cache_file_name =
            tracker.cached_file.file_name().map(|n| n.to_string_lossy().into_owned());
        let cache_subdirectory = tracker
            .cached_file
            .parent()
            .and_then(|p| p.strip_prefix(&tracker.cache_directory).ok())
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_string_lossy().into_owned());

        Self {
            kind: tracker.kind,
            cache_directory: tracker.cache_directory.clone(),
            group_by_type: false,
            previous_caching_required: tracker.previous_caching_required,
            group_id: Some(tracker.group_id.clone()),
            artifact_id: Some(tracker.artifact_id.clone()),
            version: Some(tracker.version.clone()),
            classifier: tracker.classifier.clone(),
            type_: Some(tracker.type_.clone()),
            scope: Some(tracker.scope.clone()),
            start_level: tracker.start_level,
            symbolic_name: tracker.symbolic_name.clone(),
            headers: tracker.headers.clone(),
            handler: Some(Arc::clone(&tracker.handler)),
            file: tracker.file.clone(),
            cache_file_name,
            cache_subdirectory,
            download_url: tracker.download_url.clone(),
            workspace_directory: tracker.workspace_directory.clone(),
            to_be_cached: tracker.to_be_cached,
            to_be_embedded: tracker.to_be_embedded,
            cached: tracker.cached,
            optional: tracker.optional,
            workspace_project: tracker.workspace_project,
        }
    }

    /// Kind the builder is bound to.
    #[must_use]
    pub const fn kind(&self) -> TrackerKind {
        self.kind
    }

    #[must_use]
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    #[must_use]
    pub fn with_artifact_id(mut self, artifact_id: impl Into<String>) -> Self {
        self.artifact_id = Some(artifact_id.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Option<String>) -> Self {
        self.classifier = classifier.filter(|c| !c.is_empty());
        self
    }

    #[must_use]
    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    #[must_use]
    pub const fn with_start_level(mut self, start_level: u32) -> Self {
        self.start_level = start_level;
        self
    }

    #[must_use]
    pub fn with_symbolic_name(mut self, symbolic_name: impl Into<String>) -> Self {
        self.symbolic_name = Some(symbolic_name.into());
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: ManifestHeaders) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn TypeHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Original file (resolved file, or the file a workspace pack will create).
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// File name of the cached copy, usually produced by the naming pattern.
    #[must_use]
    pub fn with_cache_file_name(mut self, name: impl Into<String>) -> Self {
        self.cache_file_name = Some(name.into());
        self
    }

    /// Subdirectory of the cache directory, overriding grouping by type.
    #[must_use]
    pub fn with_cache_subdirectory(mut self, subdirectory: Option<String>) -> Self {
        self.cache_subdirectory = subdirectory.filter(|s| !s.is_empty());
        self
    }

    #[must_use]
    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_workspace_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.workspace_directory = Some(directory.into());
        self.workspace_project = true;
        self
    }

    #[must_use]
    pub const fn with_to_be_cached(mut self, to_be_cached: bool) -> Self {
        self.to_be_cached = to_be_cached;
        self
    }

    #[must_use]
    pub const fn with_to_be_embedded(mut self, to_be_embedded: bool) -> Self {
        self.to_be_embedded = to_be_embedded;
        self
    }

    #[must_use]
    pub const fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Build the tracker.
    ///
    /// Fails with [`BundleCacheError::MissingBuilderField`] when the group, artifact, version or
    /// handler is missing, or when the bound kind's factory lacks what it needs.
    pub fn build(self) -> Result<Tracker> {
        let identity = self.describe();
        for (field, value) in [
            ("group id", &self.group_id),
            ("artifact id", &self.artifact_id),
            ("version", &self.version),
        ] {
            if value.as_deref().is_none_or(str::is_empty) {
                return Err(missing(field, &identity));
            }
        }
        if self.handler.is_none() {
            return Err(missing("type handler", &identity));
        }

        match self.kind {
            TrackerKind::Repository => self.build_repository(),
            TrackerKind::RemoteIndex => self.build_remote_index(),
            TrackerKind::Properties => self.build_properties(),
        }
    }

    fn build_repository(self) -> Result<Tracker> {
        if self.file.is_none() {
            return Err(missing("file", &self.describe()));
        }
        self.assemble()
    }

    fn build_remote_index(mut self) -> Result<Tracker> {
        let Some(url) = self.download_url.clone() else {
            return Err(missing("download URL", &self.describe()));
        };
        if self.cache_file_name.is_none() {
            self.cache_file_name =
                url.rsplit('/').next().filter(|n| !n.is_empty()).map(str::to_string);
        }
        self.assemble()
    }

    fn build_properties(self) -> Result<Tracker> {
        if self.file.is_none() {
            return Err(missing("file", &self.describe()));
        }
        self.assemble()
    }

    fn assemble(self) -> Result<Tracker> {
        let identity = self.describe();
        let file_name = self
            .cache_file_name
            .clone()
            .or_else(|| {
                self.file
                    .as_deref()
                    .and_then(Path::file_name)
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .ok_or_else(|| missing("cache file name", &identity))?;

        let type_ = self.type_.unwrap_or_else(crate::artifact::default_type);
        let subdirectory = self
            .cache_subdirectory
            .or_else(|| self.group_by_type.then(|| type_.clone()));
        let cached_file = match &subdirectory {
            Some(subdirectory) => self.cache_directory.join(subdirectory).join(file_name),
            None => self.cache_directory.join(file_name),
        };

        Ok(Tracker {
            kind: self.kind,
            group_id: self.group_id.unwrap_or_default(),
            artifact_id: self.artifact_id.unwrap_or_default(),
            version: self.version.unwrap_or_default(),
            classifier: self.classifier,
            type_,
            scope: self.scope.unwrap_or_else(|| crate::constants::DEFAULT_SCOPE.to_string()),
            start_level: self.start_level,
            symbolic_name: self.symbolic_name,
            headers: self.headers,
            handler: self.handler.ok_or_else(|| missing("type handler", &identity))?,
            file: self.file,
            cached_file,
            cache_directory: self.cache_directory,
            download_url: self.download_url,
            workspace_directory: self.workspace_directory,
            to_be_cached: self.to_be_cached,
            to_be_embedded: self.to_be_embedded,
            cached: self.cached,
            optional: self.optional,
            workspace_project: self.workspace_project,
            previous_caching_required: self.previous_caching_required,
        })
    }

    fn describe(&self) -> String {
        format!(
            "{}:{}:{}",
            self.group_id.as_deref().unwrap_or("?"),
            self.artifact_id.as_deref().unwrap_or("?"),
            self.version.as_deref().unwrap_or("?")
        )
    }
}

fn missing(field: &str, artifact: &str) -> anyhow::Error {
    BundleCacheError::MissingBuilderField {
        field: field.to_string(),
        artifact: artifact.to_string(),
    }
    .into()
}
