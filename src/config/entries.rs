//! Entry types of `bundle-cache.toml`.
//!
//! Dependencies, workspace modules and artifact-set entries accept either a compact string or a
//! detailed table:
//!
//! ```toml
//! dependencies = [
//!     "com.acme:api:bundle:1.0",
//!     { group-id = "com.acme", artifact-id = "impl", version = "1.0", scope = "runtime" },
//! ]
//! ```

use crate::artifact::{ArtifactCoordinates, ArtifactReference};
use crate::constants::DEFAULT_SCOPE;
use crate::core::BundleCacheError;
use crate::session::{ResolvedArtifact, WorkspaceProject};
use crate::utils::resolve_path;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parse compact coordinates, `group:artifact:type:version`.
pub fn parse_coordinates(value: &str) -> Result<ArtifactCoordinates> {
    ArtifactReference::parse(value).coordinates().ok_or_else(|| {
        BundleCacheError::ConfigurationError {
            message: format!("invalid coordinates '{value}': expected group:artifact:type:version"),
        }
        .into()
    })
}

/// A dependency of the project, already resolved by the build tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyEntry {
    /// `group:artifact:type:version`, a direct `compile` dependency
    Compact(String),
    /// Coordinates with scope, flags and an optional resolved file
    Detailed(Box<DetailedDependency>),
}

/// Table form of a [`DependencyEntry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DetailedDependency {
    #[serde(flatten)]
    pub coordinates: ArtifactCoordinates,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default)]
    pub optional: bool,
    /// Reached through another dependency
    #[serde(default)]
    pub transitive: bool,
    /// Resolved file; resolved through the local repository when unset
    #[serde(default)]
    pub file: Option<String>,
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

impl DependencyEntry {
    /// Session dependency, with the file resolved against `base`.
    pub fn to_resolved(&self, base: &Path) -> Result<ResolvedArtifact> {
        match self {
            Self::Compact(value) => {
                Ok(ResolvedArtifact::new(parse_coordinates(value)?, DEFAULT_SCOPE))
            }
            Self::Detailed(detail) => {
                let mut artifact =
                    ResolvedArtifact::new(detail.coordinates.clone(), detail.scope.clone());
                artifact.optional = detail.optional;
                artifact.direct = !detail.transitive;
                if let Some(file) = &detail.file {
                    artifact.file = Some(resolve_path(file, base));
                }
                Ok(artifact)
            }
        }
    }
}

/// A module built in the same session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceEntry {
    /// `group:artifact:type:version`
    pub coordinates: String,
    /// Module directory holding its `pom.xml`
    pub path: String,
}

impl WorkspaceEntry {
    pub fn to_project(&self, base: &Path) -> Result<WorkspaceProject> {
        let coordinates = parse_coordinates(&self.coordinates)?;
        Ok(WorkspaceProject::new(coordinates, resolve_path(&self.path, base)))
    }
}

/// An artifact-set entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceEntry {
    /// `[group:]artifact[:type][:version][@startLevel]`
    Compact(String),
    Detailed(Box<ArtifactReference>),
}

impl ReferenceEntry {
    #[must_use]
    pub fn to_reference(&self) -> ArtifactReference {
        match self {
            Self::Compact(value) => ArtifactReference::parse(value),
            Self::Detailed(reference) => reference.as_ref().clone(),
        }
    }
}

/// `[[repository-sets]]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RepositorySetEntry {
    #[serde(default)]
    pub cache_directory: Option<String>,
    #[serde(default)]
    pub artifacts: Vec<ReferenceEntry>,
}

/// `[[remote-index-sets]]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteIndexSetEntry {
    /// Repository base URL; entries without a URL download from `<url>/plugins/`
    #[serde(default)]
    pub url: Option<String>,
    /// Group id of entries declared without one
    #[serde(default)]
    pub default_group_id: Option<String>,
    #[serde(default)]
    pub cache_directory: Option<String>,
    #[serde(default)]
    pub artifacts: Vec<ReferenceEntry>,
}

/// `[[properties-sets]]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PropertiesSetEntry {
    #[serde(default)]
    pub cache_directory: Option<String>,
    /// `.properties` file listing `label = reference` lines; a glob pattern loads every match
    /// in path order
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub artifacts: Vec<ReferenceEntry>,
}
