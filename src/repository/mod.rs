//! Repository system seam.
//!
//! Locating artifacts is delegated: the resolver only ever asks a [`RepositorySystem`] for the
//! file behind some coordinates and for the project model (packaging) of an artifact.
//! [`LocalRepository`] answers from a Maven-layout directory; tests use an in-memory system from
//! `test_utils`.

mod local;

pub use local::LocalRepository;

use crate::artifact::ArtifactCoordinates;
use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

/// Project model of an artifact, reduced to what the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectModel {
    /// Coordinates the model was built for
    pub coordinates: ArtifactCoordinates,
    /// Declared packaging, `jar` when the model does not say
    pub packaging: String,
}

impl ProjectModel {
    /// Model with `jar` packaging.
    #[must_use]
    pub fn jar(coordinates: ArtifactCoordinates) -> Self {
        Self {
            coordinates,
            packaging: "jar".to_string(),
        }
    }
}

/// External artifact resolution.
pub trait RepositorySystem: fmt::Debug {
    /// File of the artifact, `Ok(None)` when the repository does not have it.
    fn resolve_artifact(&self, coordinates: &ArtifactCoordinates) -> Result<Option<PathBuf>>;

    /// Project model of the artifact.
    fn build_project_model(&self, coordinates: &ArtifactCoordinates) -> Result<ProjectModel>;
}
