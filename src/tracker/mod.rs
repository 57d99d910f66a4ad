//! Tracked artifacts.
//!
//! A [`Tracker`] is the result of resolving one artifact: who it is, which handler governs it,
//! where it came from, where its cached copy lives and what the resolver decided about it
//! (cache it, embed it). Trackers are created once through a [`TrackerBuilder`] and only change
//! afterwards through [`Tracker::mark_cached`].
//!
//! Three kinds exist, one per artifact source:
//!
//! | Kind | Source | Original file |
//! |---|---|---|
//! | [`TrackerKind::Repository`] | dependency graph / repository system / workspace | resolved file, or the file the workspace pack will create |
//! | [`TrackerKind::RemoteIndex`] | P2-style remote repository | none, downloaded from [`Tracker::download_url`] |
//! | [`TrackerKind::Properties`] | property-file references | resolved file |
//!
//! Trackers are identified by artifact id and version: two trackers for the same artifact and
//! version are equal whatever their other fields say.

mod builder;

pub use builder::TrackerBuilder;

use crate::artifact::ArtifactCoordinates;
use crate::handler::TypeHandler;
use crate::manifest::ManifestHeaders;
use crate::utils::fs::get_modified_time;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::trace;
use walkdir::WalkDir;

/// Source of a tracked artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerKind {
    /// Build-tool repository or workspace
    Repository,
    /// P2-style remote repository
    RemoteIndex,
    /// Property-file reference
    Properties,
}

impl fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Repository => "repository",
            Self::RemoteIndex => "remote-index",
            Self::Properties => "properties",
        })
    }
}

/// State of the cached copy on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// No cached copy
    Missing,
    /// The original changed after the cached copy was written
    Stale,
    /// The cached copy is up to date
    Fresh,
}

/// A resolved artifact and the decisions taken about it.
#[derive(Debug, Clone)]
pub struct Tracker {
    pub(crate) kind: TrackerKind,
    pub(crate) group_id: String,
    pub(crate) artifact_id: String,
    pub(crate) version: String,
    pub(crate) classifier: Option<String>,
    pub(crate) type_: String,
    pub(crate) scope: String,
    pub(crate) start_level: u32,
    pub(crate) symbolic_name: Option<String>,
    pub(crate) headers: ManifestHeaders,
    pub(crate) handler: Arc<dyn TypeHandler>,
    pub(crate) file: Option<PathBuf>,
    pub(crate) cached_file: PathBuf,
    pub(crate) cache_directory: PathBuf,
    pub(crate) download_url: Option<String>,
    pub(crate) workspace_directory: Option<PathBuf>,
    pub(crate) to_be_cached: bool,
    pub(crate) to_be_embedded: bool,
    pub(crate) cached: bool,
    pub(crate) optional: bool,
    pub(crate) workspace_project: bool,
    pub(crate) previous_caching_required: bool,
}

impl Tracker {
    /// Kind of source.
    #[must_use]
    pub const fn kind(&self) -> TrackerKind {
        self.kind
    }

    /// Group id.
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Artifact id.
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Version as resolved (a snapshot keeps its `-SNAPSHOT` suffix here).
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Classifier.
    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// Packaging type.
    #[must_use]
    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// Dependency scope.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// OSGi start level, 0 when unset.
    #[must_use]
    pub const fn start_level(&self) -> u32 {
        self.start_level
    }

    /// Symbolic name from the manifest, without parameters.
    #[must_use]
    pub fn symbolic_name(&self) -> Option<&str> {
        self.symbolic_name.as_deref()
    }

    /// Manifest headers read during resolution.
    #[must_use]
    pub const fn headers(&self) -> &ManifestHeaders {
        &self.headers
    }

    /// Handler governing the artifact's type.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn TypeHandler> {
        &self.handler
    }

    /// Original file location. For workspace projects, the file packing will create.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Location of the cached copy.
    #[must_use]
    pub fn cached_file(&self) -> &Path {
        &self.cached_file
    }

    /// Cache root the cached copy lives under.
    #[must_use]
    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    /// Download URL of a remote index artifact.
    #[must_use]
    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }

    /// Unpacked output directory of a workspace project.
    #[must_use]
    pub fn workspace_directory(&self) -> Option<&Path> {
        self.workspace_directory.as_deref()
    }

    /// Whether the artifact belongs in the cache.
    #[must_use]
    pub const fn is_to_be_cached(&self) -> bool {
        self.to_be_cached
    }

    /// Whether the artifact is embedded into the composite archive.
    #[must_use]
    pub const fn is_to_be_embedded(&self) -> bool {
        self.to_be_embedded
    }

    /// Whether the cached copy existed at the last [`mark_cached`](Self::mark_cached).
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        self.cached
    }

    /// Whether the dependency is optional.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the artifact is built by the current build.
    #[must_use]
    pub const fn is_workspace_project(&self) -> bool {
        self.workspace_project
    }

    /// Whether a previous caching step is expected to have populated the cache.
    #[must_use]
    pub const fn is_previous_caching_required(&self) -> bool {
        self.previous_caching_required
    }

    /// Coordinates of the tracked artifact.
    #[must_use]
    pub fn coordinates(&self) -> ArtifactCoordinates {
        ArtifactCoordinates {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            version: self.version.clone(),
            classifier: self.classifier.clone(),
            type_: self.type_.clone(),
        }
    }

    /// Re-derive the cached flag from the existence of the cached copy, a file or an unpacked
    /// plugin directory.
    pub fn mark_cached(&mut self) -> bool {
        self.cached = self.cached_file.exists();
        trace!("{} cached: {}", self, self.cached);
        self.cached
    }

    /// Probe the cached copy against the original.
    ///
    /// The original is the source file, or for workspace projects the newest entry of the
    /// workspace output directory. Without an original to compare to, an existing cached copy is
    /// fresh.
    #[must_use]
    pub fn cache_status(&self) -> CacheStatus {
        let Ok(cached_at) = get_modified_time(&self.cached_file) else {
            return CacheStatus::Missing;
        };

        let source_time = if self.workspace_project {
            self.workspace_directory.as_deref().and_then(newest_modification)
        } else {
            self.file.as_deref().and_then(|f| get_modified_time(f).ok())
        };

        match source_time {
            Some(source_time) if source_time > cached_at => CacheStatus::Stale,
            _ => CacheStatus::Fresh,
        }
    }

    /// Whether a copy phase has work to do for this tracker.
    #[must_use]
    pub fn needs_caching(&self) -> bool {
        self.to_be_cached && self.cache_status() != CacheStatus::Fresh
    }

    /// File to embed into the composite archive.
    ///
    /// The cached copy when a previous caching step is required, when the artifact is packed
    /// from the workspace or when it is downloaded; the original file otherwise.
    #[must_use]
    pub fn embed_source(&self) -> &Path {
        if self.previous_caching_required || self.workspace_project {
            return &self.cached_file;
        }
        self.file.as_deref().unwrap_or(&self.cached_file)
    }

    /// Builder holding every field of this tracker.
    #[must_use]
    pub fn to_builder(&self) -> TrackerBuilder {
        TrackerBuilder::from_tracker(self)
    }

    fn identity(&self) -> (&str, &str) {
        (&self.artifact_id, &self.version)
    }
}

fn newest_modification(directory: &Path) -> Option<SystemTime> {
    WalkDir::new(directory)
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|entry| entry.metadata().ok()?.modified().ok())
        .max()
}

impl PartialEq for Tracker {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Tracker {}

impl Hash for Tracker {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Tracker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tracker {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl fmt::Display for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.type_)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.version)
    }
}
