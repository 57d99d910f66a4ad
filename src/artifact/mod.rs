//! Artifact identity.
//!
//! - [`ArtifactCoordinates`] is the fully-specified identity handed to the repository system.
//! - [`ArtifactReference`] is what users declare: possibly partial, parsed from the compact
//!   `[group:]artifact[:type][:version][@startLevel]` grammar or given field by field.
//! - [`RepositorySet`], [`RemoteIndexSet`] and [`PropertiesSet`] group declared references with
//!   the cache directory they share.

pub mod reference;
pub mod sets;

pub use reference::ArtifactReference;
pub use sets::{ArtifactSet, PropertiesSet, RemoteIndexSet, RepositorySet};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully-specified Maven-style coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArtifactCoordinates {
    /// Group id, e.g. `org.apache.felix`
    pub group_id: String,
    /// Artifact id, e.g. `org.apache.felix.scr`
    pub artifact_id: String,
    /// Version as declared, `-SNAPSHOT` suffix included
    pub version: String,
    /// Optional classifier (`sources`, `tests`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    /// Packaging type, `jar` unless stated otherwise
    #[serde(rename = "type", default = "default_type")]
    pub type_: String,
}

pub(crate) fn default_type() -> String {
    "jar".to_string()
}

impl ArtifactCoordinates {
    /// Coordinates with type `jar` and no classifier.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: None,
            type_: default_type(),
        }
    }

    /// Replace the packaging type.
    #[must_use]
    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = type_.into();
        self
    }

    /// Replace the classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// `group:artifact`, the key used for version-less matching and exclusions.
    #[must_use]
    pub fn group_artifact(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// Whether the version carries the Maven `-SNAPSHOT` suffix.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with("-SNAPSHOT")
    }
}

impl fmt::Display for ArtifactCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.type_)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.version)
    }
}
