//! Artifact resolution and caching.
//!
//! The [`TrackerManager`] turns a [`BuildSession`](crate::session::BuildSession) and the declared
//! artifact sets into a set of [`Tracker`]s, then populates the cache directory from them.
//!
//! # Resolution Process
//!
//! A full pass runs three resolutions in a fixed order, followed by the matching copy phases:
//!
//! 1. **Repository artifacts** ([`TrackerManager::resolve_maven_artifacts`])
//!    - Candidates are the direct dependencies, plus the transitive ones when configured
//!    - Every repository-set entry claims the candidate matching its group, artifact and version
//!      (group and artifact only when the entry has no version). Entries matching nothing are
//!      resolved directly through the repository system; without a version that is fatal
//!    - Candidates and claimed entries go through the filter chain (scope, optional policy,
//!      exclusions, caller filter)
//!    - Accepted artifacts get a type handler. Workspace projects whose handler allows it take the
//!      **workspace path** (manifest from the unpacked output, packed on the fly), everything else
//!      the **repository path** (manifest from the packed archive)
//! 2. **Remote index artifacts** ([`TrackerManager::resolve_remote_index_artifacts`]): per set,
//!    the effective index URL is probed, then one tracker per entry is created
//! 3. **Properties artifacts** ([`TrackerManager::resolve_properties_artifacts`]): resolved
//!    directly through the repository system
//!
//! # Failure Policy
//!
//! | Failure | Effect |
//! |---|---|
//! | Unresolvable required artifact | fatal, [`BundleCacheError::ResolutionError`] |
//! | Unresolvable optional artifact | warning, artifact skipped |
//! | Missing or invalid manifest | warning, artifact skipped |
//! | Unreachable remote index | fatal for the pass, [`BundleCacheError::RepositoryUnreachable`] |
//! | Archiver failure | fatal, [`BundleCacheError::PackagingError`] |
//! | Failed repository copy | warning, counted in [`CacheReport::failed`] |
//!
//! # Tracker Set
//!
//! Trackers are unique by artifact id and version. The first tracker registered for an identity
//! wins; later ones are logged and dropped. Queries return snapshots.
//!
//! # Example
//!
//! ```rust,no_run
//! use bundle_cache::artifact::ArtifactCoordinates;
//! use bundle_cache::repository::LocalRepository;
//! use bundle_cache::resolver::TrackerManager;
//! use bundle_cache::session::BuildSession;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut manager = TrackerManager::builder()
//!     .with_repository_system(Box::new(LocalRepository::new("/home/me/.m2/repository")))
//!     .with_cache_directory("target/bundle-cache")
//!     .filtering()
//!     .with_embed_scopes(vec!["compile".to_string()])
//!     .remote_index()
//!     .operational()
//!     .with_naming_pattern("%n-%v.%e")
//!     .build()?;
//!
//! let session = BuildSession::new(ArtifactCoordinates::new("com.acme", "dist", "1.0"), ".");
//! manager.resolve_all(&session)?;
//! let report = manager.cache_all()?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

mod builder;
mod caching;
pub mod filter;
mod maven;
mod properties;
mod query;
mod remote_index;

#[cfg(test)]
mod tests;

pub use builder::{
    FilteringSetup, MavenSetup, OperationalSetup, RemoteIndexSetup, TrackerManagerBuilder,
};
pub use caching::CacheReport;
pub use filter::ArtifactFilter;

use crate::archiver::ArchiverFactory;
use crate::artifact::{ArtifactCoordinates, PropertiesSet, RemoteIndexSet, RepositorySet};
use crate::constants::{DEFAULT_CACHE_DIRECTORY, DEFAULT_CACHE_SCOPES, DEFAULT_NETWORK_TIMEOUT};
use crate::core::BundleCacheError;
use crate::handler::{HandlerRegistry, TypeHandler};
use crate::naming::{NamingFields, NamingPattern, normalize_version};
use crate::repository::RepositorySystem;
use crate::session::BuildSession;
use crate::tracker::Tracker;
use crate::utils::Transport;
use anyhow::Result;
use filter::FilterChain;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Settings of a resolution pass.
#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    /// Cache root for artifacts whose set does not name its own
    pub cache_directory: PathBuf,
    /// Scopes taking part in resolution; empty accepts every scope
    pub scopes: Vec<String>,
    /// Scopes whose artifacts are cached
    pub cache_scopes: Vec<String>,
    /// Scopes whose artifacts are embedded (and therefore cached)
    pub embed_scopes: Vec<String>,
    /// Consider transitive dependencies, not only direct ones
    pub include_transitive: bool,
    /// Consider optional dependencies
    pub include_optional: bool,
    /// `group:artifact` glob patterns to leave out
    pub exclusions: Vec<String>,
    /// Cache file naming pattern
    pub naming_pattern: NamingPattern,
    /// Place cached files in one subdirectory per type
    pub group_by_type: bool,
    /// Embed from the cache, which a previous caching step populated
    pub previous_caching_required: bool,
    /// Log one line per tracker at info level
    pub verbose: bool,
    /// Never touch the network; remote indexes are read from the cache directory
    pub offline: bool,
    /// URL replacing every remote index set's declared URL
    pub remote_index_override: Option<String>,
    /// Timeout for probes and downloads; zero leaves the transport default in place
    pub network_timeout: Duration,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            cache_directory: PathBuf::from(DEFAULT_CACHE_DIRECTORY),
            scopes: ["compile", "provided", "runtime"].map(String::from).to_vec(),
            cache_scopes: DEFAULT_CACHE_SCOPES.iter().map(|s| (*s).to_string()).collect(),
            embed_scopes: Vec::new(),
            include_transitive: true,
            include_optional: false,
            exclusions: Vec::new(),
            naming_pattern: NamingPattern::default(),
            group_by_type: false,
            previous_caching_required: false,
            verbose: false,
            offline: false,
            remote_index_override: None,
            network_timeout: DEFAULT_NETWORK_TIMEOUT,
        }
    }
}

impl ResolutionConfig {
    /// `(to_be_cached, to_be_embedded)` for an artifact in `scope`.
    #[must_use]
    pub fn classify_scope(&self, scope: &str) -> (bool, bool) {
        let embedded = self.embed_scopes.iter().any(|s| s == scope);
        let cached = embedded || self.cache_scopes.iter().any(|s| s == scope);
        (cached, embedded)
    }
}

/// Owns the tracker set of a build and everything needed to grow it.
pub struct TrackerManager {
    repository: Box<dyn RepositorySystem>,
    archivers: Box<dyn ArchiverFactory>,
    handlers: HandlerRegistry,
    transport: Transport,
    filters: FilterChain,
    config: ResolutionConfig,
    repository_sets: Vec<RepositorySet>,
    remote_index_sets: Vec<RemoteIndexSet>,
    properties_sets: Vec<PropertiesSet>,
    trackers: BTreeMap<(String, String), Tracker>,
}

impl TrackerManager {
    /// Start the staged builder.
    #[must_use]
    pub fn builder() -> TrackerManagerBuilder<MavenSetup> {
        TrackerManagerBuilder::new()
    }

    /// Pass settings.
    #[must_use]
    pub const fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// Run the three resolutions in order: repository, remote index, properties.
    pub fn resolve_all(&mut self, session: &BuildSession) -> Result<()> {
        self.resolve_maven_artifacts(session, None)?;
        self.resolve_remote_index_artifacts()?;
        self.resolve_properties_artifacts()?;
        info!("Tracking {} artifact(s)", self.trackers.len());
        Ok(())
    }

    /// Register a tracker unless one with the same identity exists. Returns whether it was added.
    fn insert_tracker(&mut self, mut tracker: Tracker) -> bool {
        let key = (tracker.artifact_id().to_string(), tracker.version().to_string());
        if let Some(existing) = self.trackers.get(&key) {
            debug!("{} already tracked as {}, ignoring", tracker, existing);
            return false;
        }

        tracker.mark_cached();
        if self.config.verbose {
            info!(
                "{} [{}] -> {} (cache: {}, embed: {})",
                tracker,
                tracker.scope(),
                tracker.cached_file().display(),
                tracker.is_to_be_cached(),
                tracker.is_to_be_embedded()
            );
        } else {
            debug!("Tracking {} at {}", tracker, tracker.cached_file().display());
        }
        self.trackers.insert(key, tracker);
        true
    }

    fn cache_directory_for(&self, set_directory: Option<&Path>) -> PathBuf {
        set_directory.map_or_else(|| self.config.cache_directory.clone(), Path::to_path_buf)
    }

    /// Cache file name for an artifact, through the naming pattern unless a copy name is given.
    fn cache_file_name(
        &self,
        copy_name: Option<&str>,
        artifact_id: &str,
        classifier: Option<&str>,
        symbolic_name: Option<&str>,
        version: &str,
        extension: &str,
    ) -> String {
        if let Some(name) = copy_name.filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let version = normalize_version(version);
        self.config.naming_pattern.apply(&NamingFields {
            name: artifact_id,
            classifier,
            symbolic_name,
            version: &version,
            extension,
        })
    }

    /// Handler for `coordinates`. The project model is only read when neither the registry nor
    /// the `jar` type settles it.
    fn handler_for(&self, coordinates: &ArtifactCoordinates) -> Result<Arc<dyn TypeHandler>> {
        let type_ = coordinates.type_.as_str();
        if let Some(handler) = self.handlers.lookup(type_) {
            return Ok(handler);
        }
        if type_.eq_ignore_ascii_case("jar") {
            return Ok(self.handlers.resolve_handler(type_, None));
        }
        let model = self.repository.build_project_model(coordinates)?;
        Ok(self.handlers.resolve_handler(type_, Some(&model.packaging)))
    }
}

impl std::fmt::Debug for TrackerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerManager")
            .field("repository", &self.repository)
            .field("config", &self.config)
            .field("filters", &self.filters)
            .field("trackers", &self.trackers.len())
            .finish_non_exhaustive()
    }
}

fn resolution_error(coordinates: impl ToString, reason: impl Into<String>) -> anyhow::Error {
    BundleCacheError::ResolutionError {
        coordinates: coordinates.to_string(),
        reason: reason.into(),
    }
    .into()
}
