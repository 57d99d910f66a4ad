//! User-declared artifact references.
//!
//! References come from artifact sets in the configuration, either as a compact string or as a
//! detailed table. The compact grammar is fixed:
//!
//! ```text
//! [group:]artifact[:type][:version][@startLevel]
//! ```
//!
//! Segments are positional. With three segments the third one is the *type*, never the version,
//! whatever it looks like: `acme:foo:1.0` declares type `1.0` and no version. A string that does
//! not match the grammar leaves every field unset; callers check [`ArtifactReference::is_valid`].

use crate::artifact::{ArtifactCoordinates, default_type};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

static REFERENCE_GRAMMAR: OnceLock<Regex> = OnceLock::new();

fn grammar() -> &'static Regex {
    REFERENCE_GRAMMAR.get_or_init(|| {
        Regex::new(r"^(?:([^:@\s]+):)?([^:@\s]+)(?::([^:@\s]+))?(?::([^:@\s]+))?(?:@(\d+))?$")
            .expect("artifact reference grammar is a valid regex")
    })
}

/// A declared artifact, possibly partial.
///
/// Identity (equality and hashing) is the tuple (group, artifact, type, version, classifier);
/// the start level and the placement overrides do not take part in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArtifactReference {
    /// Group id
    #[serde(default)]
    pub group_id: Option<String>,
    /// Artifact id
    #[serde(default)]
    pub artifact_id: String,
    /// Version, unset when the reference should match any version in the graph
    #[serde(default)]
    pub version: Option<String>,
    /// Classifier
    #[serde(default)]
    pub classifier: Option<String>,
    /// Packaging type, `jar` by default
    #[serde(rename = "type", default = "default_type")]
    pub type_: String,
    /// OSGi start level, 0 when unset
    #[serde(default)]
    pub start_level: u32,
    /// File name to use in the cache instead of the computed one
    #[serde(default)]
    pub copy_name: Option<String>,
    /// Explicit download URL
    #[serde(default)]
    pub url: Option<String>,
    /// Subdirectory of the cache directory to place the file in
    #[serde(default)]
    pub cache_subdirectory: Option<String>,
}

impl Default for ArtifactReference {
    fn default() -> Self {
        Self {
            group_id: None,
            artifact_id: String::new(),
            version: None,
            classifier: None,
            type_: default_type(),
            start_level: 0,
            copy_name: None,
            url: None,
            cache_subdirectory: None,
        }
    }
}

impl ArtifactReference {
    /// Parse the compact notation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bundle_cache::artifact::ArtifactReference;
    ///
    /// let reference = ArtifactReference::parse("group1:artifact1:jar:1.0@2");
    /// assert_eq!(reference.group_id.as_deref(), Some("group1"));
    /// assert_eq!(reference.artifact_id, "artifact1");
    /// assert_eq!(reference.type_, "jar");
    /// assert_eq!(reference.version.as_deref(), Some("1.0"));
    /// assert_eq!(reference.start_level, 2);
    /// assert!(reference.is_valid());
    ///
    /// assert!(!ArtifactReference::parse("not a reference").is_valid());
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut reference = Self::default();
        let Some(captures) = grammar().captures(value.trim()) else {
            return reference;
        };

        let capture = |index: usize| captures.get(index).map(|m| m.as_str().to_string());

        reference.group_id = capture(1);
        reference.artifact_id = capture(2).unwrap_or_default();
        if let Some(type_) = capture(3) {
            reference.type_ = type_;
        }
        reference.version = capture(4);
        reference.start_level =
            captures.get(5).and_then(|m| m.as_str().parse().ok()).unwrap_or_default();
        reference
    }

    /// Build a reference from complete coordinates.
    #[must_use]
    pub fn from_coordinates(coordinates: &ArtifactCoordinates) -> Self {
        Self {
            group_id: Some(coordinates.group_id.clone()),
            artifact_id: coordinates.artifact_id.clone(),
            version: Some(coordinates.version.clone()),
            classifier: coordinates.classifier.clone(),
            type_: coordinates.type_.clone(),
            ..Self::default()
        }
    }

    /// A reference is usable only with a group, an artifact and a version.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        non_empty(self.group_id.as_deref()) && !self.artifact_id.is_empty() && self.has_version()
    }

    /// Whether a non-empty version was declared.
    #[must_use]
    pub fn has_version(&self) -> bool {
        non_empty(self.version.as_deref())
    }

    /// Complete coordinates, when the reference is valid.
    #[must_use]
    pub fn coordinates(&self) -> Option<ArtifactCoordinates> {
        if !self.is_valid() {
            return None;
        }
        Some(ArtifactCoordinates {
            group_id: self.group_id.clone().unwrap_or_default(),
            artifact_id: self.artifact_id.clone(),
            version: self.version.clone().unwrap_or_default(),
            classifier: self.classifier.clone(),
            type_: self.type_.clone(),
        })
    }

    /// Whether `coordinates` is the artifact this reference declares.
    ///
    /// Group and artifact must be equal; the version must be equal too unless the reference
    /// leaves it unset.
    #[must_use]
    pub fn matches(&self, coordinates: &ArtifactCoordinates) -> bool {
        if self.group_id.as_deref() != Some(coordinates.group_id.as_str())
            || self.artifact_id != coordinates.artifact_id
        {
            return false;
        }
        match self.version.as_deref() {
            Some(version) if !version.is_empty() => version == coordinates.version,
            _ => true,
        }
    }

    fn identity(&self) -> (Option<&str>, &str, &str, Option<&str>, Option<&str>) {
        (
            self.group_id.as_deref(),
            self.artifact_id.as_str(),
            self.type_.as_str(),
            self.version.as_deref(),
            self.classifier.as_deref(),
        )
    }
}

fn non_empty(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

impl PartialEq for ArtifactReference {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for ArtifactReference {}

impl Hash for ArtifactReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(group) = &self.group_id {
            write!(f, "{group}:")?;
        }
        write!(f, "{}:{}", self.artifact_id, self.type_)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        if self.start_level > 0 {
            write!(f, "@{}", self.start_level)?;
        }
        Ok(())
    }
}
