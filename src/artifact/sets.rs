//! Declared artifact collections.
//!
//! Three kinds of sets exist, one per source of artifacts:
//!
//! - [`RepositorySet`]: artifacts resolved from the build tool's repository; entries are matched
//!   against the project's dependency graph first.
//! - [`RemoteIndexSet`]: P2-style remote repository; every entry gets a download URL.
//! - [`PropertiesSet`]: explicit references, optionally loaded from a `.properties` file.

use crate::artifact::ArtifactReference;
use crate::constants::{DEFAULT_P2_GROUP_ID, P2_PLUGINS_DIRECTORY};
use crate::core::BundleCacheError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Behaviour shared by the three set kinds.
pub trait ArtifactSet {
    /// Declared references, in declaration order.
    fn references(&self) -> &[ArtifactReference];

    /// Cache directory shared by the set's entries, if it overrides the global one.
    fn cache_directory(&self) -> Option<&Path>;

    /// Insert a reference, validating it for this kind of set.
    fn add(&mut self, reference: ArtifactReference) -> Result<()>;

    /// Whether the set declares nothing.
    fn is_empty(&self) -> bool {
        self.references().is_empty()
    }
}

/// Artifacts resolved from the build tool's repository.
#[derive(Debug, Clone, Default)]
pub struct RepositorySet {
    cache_directory: Option<PathBuf>,
    references: Vec<ArtifactReference>,
}

impl RepositorySet {
    /// Empty set, optionally with its own cache directory.
    #[must_use]
    pub fn new(cache_directory: Option<PathBuf>) -> Self {
        Self {
            cache_directory,
            references: Vec::new(),
        }
    }
}

impl ArtifactSet for RepositorySet {
    fn references(&self) -> &[ArtifactReference] {
        &self.references
    }

    fn cache_directory(&self) -> Option<&Path> {
        self.cache_directory.as_deref()
    }

    fn add(&mut self, reference: ArtifactReference) -> Result<()> {
        if reference.artifact_id.is_empty() {
            return Err(BundleCacheError::InvalidArtifactSet {
                coordinates: reference.to_string(),
                reason: "artifact id is missing".to_string(),
            }
            .into());
        }
        self.references.push(reference);
        Ok(())
    }
}

/// Artifacts published in a P2-style remote repository.
///
/// On insertion each entry is completed: the default group id fills a missing group, and the
/// download URL is derived as `<url>/plugins/<artifact>_<version>.jar` unless the entry carries
/// one already.
#[derive(Debug, Clone)]
pub struct RemoteIndexSet {
    url: Option<String>,
    default_group_id: String,
    cache_directory: Option<PathBuf>,
    references: Vec<ArtifactReference>,
}

impl RemoteIndexSet {
    /// Empty set for the repository at `url`.
    #[must_use]
    pub fn new(url: Option<String>, cache_directory: Option<PathBuf>) -> Self {
        Self {
            url,
            default_group_id: DEFAULT_P2_GROUP_ID.to_string(),
            cache_directory,
            references: Vec::new(),
        }
    }

    /// Replace the group id given to entries declared without one.
    #[must_use]
    pub fn with_default_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.default_group_id = group_id.into();
        self
    }

    /// Declared repository base URL.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Group id given to entries declared without one.
    #[must_use]
    pub fn default_group_id(&self) -> &str {
        &self.default_group_id
    }
}

/// Location of a plugin jar relative to a P2 repository root.
#[must_use]
pub fn plugin_path(artifact_id: &str, version: &str) -> String {
    format!("{P2_PLUGINS_DIRECTORY}/{artifact_id}_{version}.jar")
}

/// Join a repository base URL and a relative path with exactly one slash.
#[must_use]
pub fn join_url(base: &str, relative: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), relative.trim_start_matches('/'))
}

impl ArtifactSet for RemoteIndexSet {
    fn references(&self) -> &[ArtifactReference] {
        &self.references
    }

    fn cache_directory(&self) -> Option<&Path> {
        self.cache_directory.as_deref()
    }

    fn add(&mut self, mut reference: ArtifactReference) -> Result<()> {
        let Some(version) = reference.version.clone().filter(|v| !v.is_empty()) else {
            return Err(BundleCacheError::InvalidArtifactSet {
                coordinates: reference.to_string(),
                reason: "remote index entries require a version".to_string(),
            }
            .into());
        };

        if reference.group_id.as_deref().is_none_or(str::is_empty) {
            reference.group_id = Some(self.default_group_id.clone());
        }

        if reference.url.is_none() {
            let Some(base) = &self.url else {
                return Err(BundleCacheError::InvalidArtifactSet {
                    coordinates: reference.to_string(),
                    reason: "no download URL and no repository URL to derive one from"
                        .to_string(),
                }
                .into());
            };
            reference.url = Some(join_url(base, &plugin_path(&reference.artifact_id, &version)));
        }

        debug!(
            "Remote index entry {} downloads from {}",
            reference,
            reference.url.as_deref().unwrap_or_default()
        );
        self.references.push(reference);
        Ok(())
    }
}

/// Explicitly referenced artifacts, typically listed in a `.properties` file.
#[derive(Debug, Clone, Default)]
pub struct PropertiesSet {
    cache_directory: Option<PathBuf>,
    references: Vec<ArtifactReference>,
}

impl PropertiesSet {
    /// Empty set, optionally with its own cache directory.
    #[must_use]
    pub fn new(cache_directory: Option<PathBuf>) -> Self {
        Self {
            cache_directory,
            references: Vec::new(),
        }
    }

    /// Add every reference listed in a `.properties` file.
    ///
    /// Lines are `label = reference` in the compact grammar; blank lines and lines starting
    /// with `#` or `!` are ignored. A line without `=` is taken as a bare reference.
    pub fn load_properties_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read properties file: {}", path.display()))?;
        self.load_properties(&content)
            .with_context(|| format!("Invalid properties file: {}", path.display()))
    }

    /// Add every reference listed in `.properties` content.
    pub fn load_properties(&mut self, content: &str) -> Result<usize> {
        let mut added = 0;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let value = line.split_once('=').map_or(line, |(_, value)| value.trim());
            self.add(ArtifactReference::parse(value))?;
            added += 1;
        }
        Ok(added)
    }
}

impl ArtifactSet for PropertiesSet {
    fn references(&self) -> &[ArtifactReference] {
        &self.references
    }

    fn cache_directory(&self) -> Option<&Path> {
        self.cache_directory.as_deref()
    }

    fn add(&mut self, reference: ArtifactReference) -> Result<()> {
        if reference.artifact_id.is_empty() {
            return Err(BundleCacheError::InvalidArtifactSet {
                coordinates: reference.to_string(),
                reason: "artifact id is missing".to_string(),
            }
            .into());
        }
        self.references.push(reference);
        Ok(())
    }
}
