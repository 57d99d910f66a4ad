//! Maven-layout local repository.
//!
//! Files live at
//! `<base>/<group as path>/<artifact>/<version>/<artifact>-<version>[-<classifier>].<ext>`.
//! The extension follows the type: a handler's default extension when one is registered for the
//! type, `pom` for `pom`, `jar` otherwise.

use super::{ProjectModel, RepositorySystem};
use crate::artifact::ArtifactCoordinates;
use crate::handler::HandlerRegistry;
use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, trace};

static PACKAGING: OnceLock<Regex> = OnceLock::new();

fn packaging_regex() -> &'static Regex {
    PACKAGING.get_or_init(|| {
        Regex::new(r"<packaging>\s*([^<\s]+)\s*</packaging>").expect("packaging regex is valid")
    })
}

/// [`RepositorySystem`] over a local Maven repository directory.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    base: PathBuf,
    handlers: HandlerRegistry,
}

impl LocalRepository {
    /// Repository rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            handlers: HandlerRegistry::default(),
        }
    }

    /// Repository root.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Extension of files of `type_`.
    #[must_use]
    pub fn extension_for_type(&self, type_: &str) -> String {
        if type_ == "pom" {
            return "pom".to_string();
        }
        self.handlers
            .lookup(type_)
            .and_then(|h| h.default_extension())
            .unwrap_or("jar")
            .to_string()
    }

    /// Directory holding every file of one version.
    #[must_use]
    pub fn version_directory(&self, coordinates: &ArtifactCoordinates) -> PathBuf {
        let mut path = self.base.clone();
        for part in coordinates.group_id.split('.') {
            path.push(part);
        }
        path.join(&coordinates.artifact_id).join(&coordinates.version)
    }

    /// Expected path of the artifact, whether or not it exists.
    #[must_use]
    pub fn artifact_path(&self, coordinates: &ArtifactCoordinates) -> PathBuf {
        let mut name = format!("{}-{}", coordinates.artifact_id, coordinates.version);
        if let Some(classifier) = &coordinates.classifier {
            name.push('-');
            name.push_str(classifier);
        }
        name.push('.');
        name.push_str(&self.extension_for_type(&coordinates.type_));
        self.version_directory(coordinates).join(name)
    }

    fn pom_path(&self, coordinates: &ArtifactCoordinates) -> PathBuf {
        self.version_directory(coordinates)
            .join(format!("{}-{}.pom", coordinates.artifact_id, coordinates.version))
    }
}

impl RepositorySystem for LocalRepository {
    fn resolve_artifact(&self, coordinates: &ArtifactCoordinates) -> Result<Option<PathBuf>> {
        let path = self.artifact_path(coordinates);
        if path.is_file() {
            trace!("Resolved {} to {}", coordinates, path.display());
            Ok(Some(path))
        } else {
            debug!("{} not found at {}", coordinates, path.display());
            Ok(None)
        }
    }

    fn build_project_model(&self, coordinates: &ArtifactCoordinates) -> Result<ProjectModel> {
        let pom = self.pom_path(coordinates);
        if !pom.is_file() {
            return Ok(ProjectModel::jar(coordinates.clone()));
        }

        let content = std::fs::read_to_string(&pom)
            .with_context(|| format!("Failed to read project model: {}", pom.display()))?;
        let packaging = packaging_regex()
            .captures(&content)
            .and_then(|c| c.get(1))
            .map_or_else(|| "jar".to_string(), |m| m.as_str().to_string());

        Ok(ProjectModel {
            coordinates: coordinates.clone(),
            packaging,
        })
    }
}
