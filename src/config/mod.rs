//! Project configuration: `bundle-cache.toml`
//!
//! The configuration file describes one resolution pass: the project being assembled, the
//! dependencies the build tool resolved for it, the modules built alongside it and the artifact
//! sets to cache. It is located with `--config`, or by walking up from the current directory.
//!
//! # Example
//!
//! ```toml
//! [project]
//! coordinates = "com.acme:dist:pom:1.0"
//!
//! [resolution]
//! cache-directory = "target/bundles"
//! embed-scopes = ["compile"]
//! naming-pattern = "%s_%v.%e"
//! exclusions = ["org.osgi:*"]
//! local-repository = "~/.m2/repository"
//!
//! [[dependencies]]
//! group-id = "com.acme"
//! artifact-id = "api"
//! version = "1.0"
//! type = "bundle"
//!
//! [[workspace]]
//! coordinates = "com.acme:api:bundle:1.0"
//! path = "../api"
//!
//! [[repository-sets]]
//! cache-directory = "target/bundles/felix"
//! artifacts = ["org.apache.felix:org.apache.felix.scr:jar:2.2.6@1"]
//!
//! [[remote-index-sets]]
//! url = "https://download.eclipse.org/releases/latest"
//! artifacts = [{ artifact-id = "org.eclipse.osgi", version = "3.18.0", start-level = 1 }]
//!
//! [[properties-sets]]
//! file = "extra-bundles.properties"
//! ```
//!
//! # Paths
//!
//! Relative paths are resolved against the project base directory, which is the directory of the
//! configuration file unless `[project] base-directory` says otherwise. `~` and environment
//! variables are expanded.
//!
//! # Keys
//!
//! Keys are kebab-case. Unknown `[resolution]` keys are ignored; defaults are listed on
//! [`ResolutionSettings`].

mod entries;
mod parser;

pub use entries::{
    DependencyEntry, DetailedDependency, PropertiesSetEntry, ReferenceEntry, RemoteIndexSetEntry,
    RepositorySetEntry, WorkspaceEntry, parse_coordinates,
};
pub use parser::parse_config;

use crate::artifact::{ArtifactSet, PropertiesSet, RemoteIndexSet, RepositorySet};
use crate::constants::{CONFIG_FILE_NAME, DEFAULT_BUILD_DIRECTORY};
use crate::core::BundleCacheError;
use crate::repository::LocalRepository;
use crate::resolver::TrackerManager;
use crate::session::BuildSession;
use crate::utils::fs::{find_files, find_upwards};
use crate::utils::{default_local_repository, resolve_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Parsed `bundle-cache.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub project: ProjectSettings,
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
    #[serde(default)]
    pub workspace: Vec<WorkspaceEntry>,
    #[serde(default)]
    pub resolution: ResolutionSettings,
    #[serde(default)]
    pub repository_sets: Vec<RepositorySetEntry>,
    #[serde(default)]
    pub remote_index_sets: Vec<RemoteIndexSetEntry>,
    #[serde(default)]
    pub properties_sets: Vec<PropertiesSetEntry>,

    /// Directory of the configuration file
    #[serde(skip)]
    config_directory: PathBuf,
}

/// `[project]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectSettings {
    /// `group:artifact:type:version` of the project being assembled
    pub coordinates: String,
    /// Project root, the configuration directory by default
    #[serde(default)]
    pub base_directory: Option<String>,
    /// Build output directory, `target` by default
    #[serde(default)]
    pub build_directory: Option<String>,
}

/// `[resolution]`
///
/// | Key | Default |
/// |---|---|
/// | `cache-directory` | `<build-directory>/bundle-cache` |
/// | `scopes` | `compile`, `provided`, `runtime` |
/// | `cache-scopes` | `compile`, `runtime` |
/// | `embed-scopes` | none |
/// | `include-transitive` | `true` |
/// | `include-optional` | `false` |
/// | `naming-pattern` | `%n-%c-%v.%e` |
/// | `local-repository` | `~/.m2/repository` |
/// | `network-timeout` | transport default (seconds, 0 keeps the default) |
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ResolutionSettings {
    pub cache_directory: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub cache_scopes: Option<Vec<String>>,
    pub embed_scopes: Vec<String>,
    pub include_transitive: bool,
    pub include_optional: bool,
    pub exclusions: Vec<String>,
    pub naming_pattern: Option<String>,
    pub group_by_type: bool,
    pub previous_caching_required: bool,
    pub offline: bool,
    pub verbose: bool,
    pub local_repository: Option<String>,
    pub remote_index_override: Option<String>,
    pub network_timeout: u64,
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self {
            cache_directory: None,
            scopes: None,
            cache_scopes: None,
            embed_scopes: Vec::new(),
            include_transitive: true,
            include_optional: false,
            exclusions: Vec::new(),
            naming_pattern: None,
            group_by_type: false,
            previous_caching_required: false,
            offline: false,
            verbose: false,
            local_repository: None,
            remote_index_override: None,
            network_timeout: 0,
        }
    }
}

/// Locate the configuration file.
///
/// An explicit path must exist; otherwise `bundle-cache.toml` is searched from `start` upwards.
/// Fails with [`BundleCacheError::ConfigNotFound`].
pub fn find_config(explicit: Option<&Path>, start: &Path) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(_) => Err(BundleCacheError::ConfigNotFound.into()),
        None => find_upwards(start, CONFIG_FILE_NAME)
            .ok_or_else(|| BundleCacheError::ConfigNotFound.into()),
    }
}

impl Config {
    /// Read and parse the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: Self = parse_config(path)?;
        config.config_directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Locate with [`find_config`], then [`load`](Self::load).
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let current =
            std::env::current_dir().context("Cannot determine the current working directory")?;
        Self::load(&find_config(explicit, &current)?)
    }

    /// Project root against which relative paths are resolved.
    #[must_use]
    pub fn base_directory(&self) -> PathBuf {
        match &self.project.base_directory {
            Some(base) => resolve_path(base, &self.config_directory),
            None => self.config_directory.clone(),
        }
    }

    /// Cache root of artifacts whose set declares none.
    #[must_use]
    pub fn cache_directory(&self) -> PathBuf {
        let base = self.base_directory();
        match &self.resolution.cache_directory {
            Some(directory) => resolve_path(directory, &base),
            None => {
                let build =
                    self.project.build_directory.as_deref().unwrap_or(DEFAULT_BUILD_DIRECTORY);
                resolve_path(build, &base).join("bundle-cache")
            }
        }
    }

    /// Local Maven repository root.
    pub fn local_repository(&self) -> Result<PathBuf> {
        match &self.resolution.local_repository {
            Some(path) => Ok(resolve_path(path, &self.base_directory())),
            None => default_local_repository().ok_or_else(|| {
                BundleCacheError::ConfigurationError {
                    message: "cannot determine the home directory; set resolution.local-repository"
                        .to_string(),
                }
                .into()
            }),
        }
    }

    /// Session of the project: its dependencies and the modules built alongside it.
    pub fn build_session(&self) -> Result<BuildSession> {
        let base = self.base_directory();
        let project = parse_coordinates(&self.project.coordinates)
            .context("Invalid [project] coordinates")?;

        let mut session = BuildSession::new(project, &base);
        for entry in &self.dependencies {
            session.add_dependency(entry.to_resolved(&base)?);
        }
        for entry in &self.workspace {
            session.add_workspace_project(entry.to_project(&base)?);
        }
        debug!(
            "Session of {}: {} dependencies, {} workspace projects",
            session.project(),
            session.dependencies().len(),
            session.workspace().len()
        );
        Ok(session)
    }

    /// Tracker manager over the local repository, configured from `[resolution]` and the sets.
    pub fn tracker_manager(&self) -> Result<TrackerManager> {
        let settings = &self.resolution;
        let base = self.base_directory();

        let mut builder = TrackerManager::builder()
            .with_repository_system(Box::new(LocalRepository::new(self.local_repository()?)))
            .with_cache_directory(self.cache_directory())
            .with_repository_sets(self.repository_sets(&base)?)
            .filtering()
            .with_embed_scopes(settings.embed_scopes.clone())
            .with_transitive(settings.include_transitive)
            .with_optional(settings.include_optional)
            .with_exclusions(settings.exclusions.clone());
        if let Some(scopes) = &settings.scopes {
            builder = builder.with_scopes(scopes.clone());
        }
        if let Some(scopes) = &settings.cache_scopes {
            builder = builder.with_cache_scopes(scopes.clone());
        }

        let mut builder = builder
            .remote_index()
            .with_remote_index_sets(self.remote_index_sets(&base)?)
            .with_remote_index_override(settings.remote_index_override.clone())
            .with_offline(settings.offline)
            .with_network_timeout(Duration::from_secs(settings.network_timeout))
            .operational()
            .with_group_by_type(settings.group_by_type)
            .with_previous_caching_required(settings.previous_caching_required)
            .with_verbose(settings.verbose)
            .with_properties_sets(self.properties_sets(&base)?);
        if let Some(pattern) = &settings.naming_pattern {
            builder = builder.with_naming_pattern(pattern);
        }
        builder.build()
    }

    fn repository_sets(&self, base: &Path) -> Result<Vec<RepositorySet>> {
        self.repository_sets
            .iter()
            .map(|entry| {
                let mut set =
                    RepositorySet::new(cache_directory(entry.cache_directory.as_ref(), base));
                add_references(&mut set, &entry.artifacts)?;
                Ok(set)
            })
            .collect()
    }

    fn remote_index_sets(&self, base: &Path) -> Result<Vec<RemoteIndexSet>> {
        self.remote_index_sets
            .iter()
            .map(|entry| {
                let mut set = RemoteIndexSet::new(
                    entry.url.clone(),
                    cache_directory(entry.cache_directory.as_ref(), base),
                );
                if let Some(group_id) = &entry.default_group_id {
                    set = set.with_default_group_id(group_id);
                }
                add_references(&mut set, &entry.artifacts)?;
                Ok(set)
            })
            .collect()
    }

    fn properties_sets(&self, base: &Path) -> Result<Vec<PropertiesSet>> {
        self.properties_sets
            .iter()
            .map(|entry| {
                let mut set =
                    PropertiesSet::new(cache_directory(entry.cache_directory.as_ref(), base));
                if let Some(pattern) = &entry.file {
                    let resolved = resolve_path(pattern, base);
                    let files = find_files(base, &resolved.to_string_lossy())?;
                    if files.is_empty() {
                        return Err(BundleCacheError::ConfigurationError {
                            message: format!("No properties file matches '{pattern}'"),
                        }
                        .into());
                    }
                    for file in files {
                        set.load_properties_file(&file)?;
                    }
                }
                add_references(&mut set, &entry.artifacts)?;
                Ok(set)
            })
            .collect()
    }
}

fn cache_directory(value: Option<&String>, base: &Path) -> Option<PathBuf> {
    value.map(|v| resolve_path(v, base))
}

fn add_references(set: &mut impl ArtifactSet, entries: &[ReferenceEntry]) -> Result<()> {
    for entry in entries {
        set.add(entry.to_reference())?;
    }
    Ok(())
}
