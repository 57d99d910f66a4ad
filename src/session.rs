//! Build session: the input of a resolution pass.
//!
//! A session describes the project being built, its already-resolved dependency graph and the
//! other projects of the same build (the workspace). The resolver never walks a dependency graph
//! itself; it classifies what the session hands it.

use crate::artifact::ArtifactCoordinates;
use std::path::{Path, PathBuf};

/// One dependency of the current project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Coordinates, type included
    pub coordinates: ArtifactCoordinates,
    /// Dependency scope (`compile`, `runtime`, `provided`, `test`, ...)
    pub scope: String,
    /// Whether the dependency is optional
    pub optional: bool,
    /// Whether it is a direct dependency of the project (otherwise transitive)
    pub direct: bool,
    /// Resolved file, `None` when not resolved yet
    pub file: Option<PathBuf>,
}

impl ResolvedArtifact {
    /// Direct, non-optional dependency in `scope`.
    pub fn new(coordinates: ArtifactCoordinates, scope: impl Into<String>) -> Self {
        Self {
            coordinates,
            scope: scope.into(),
            optional: false,
            direct: true,
            file: None,
        }
    }

    /// Set the resolved file.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Mark as transitive.
    #[must_use]
    pub fn transitive(mut self) -> Self {
        self.direct = false;
        self
    }

    /// Mark as optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A project of the current build whose output has not been published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceProject {
    /// Coordinates the project produces
    pub coordinates: ArtifactCoordinates,
    /// Project base directory (holding `pom.xml`)
    pub base_directory: PathBuf,
}

impl WorkspaceProject {
    /// Workspace project rooted at `base_directory`.
    pub fn new(coordinates: ArtifactCoordinates, base_directory: impl Into<PathBuf>) -> Self {
        Self {
            coordinates,
            base_directory: base_directory.into(),
        }
    }

    /// File standing for the project's main artifact: its `pom.xml`.
    #[must_use]
    pub fn main_file(&self) -> PathBuf {
        self.base_directory.join("pom.xml")
    }
}

/// Everything a resolution pass reads about the build.
#[derive(Debug, Clone)]
pub struct BuildSession {
    project: ArtifactCoordinates,
    base_directory: PathBuf,
    dependencies: Vec<ResolvedArtifact>,
    workspace: Vec<WorkspaceProject>,
}

impl BuildSession {
    /// Session for `project`, based in `base_directory`.
    pub fn new(project: ArtifactCoordinates, base_directory: impl Into<PathBuf>) -> Self {
        Self {
            project,
            base_directory: base_directory.into(),
            dependencies: Vec::new(),
            workspace: Vec::new(),
        }
    }

    /// Add a dependency.
    #[must_use]
    pub fn with_dependency(mut self, dependency: ResolvedArtifact) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Add a workspace project.
    #[must_use]
    pub fn with_workspace_project(mut self, project: WorkspaceProject) -> Self {
        self.workspace.push(project);
        self
    }

    /// Add a dependency in place.
    pub fn add_dependency(&mut self, dependency: ResolvedArtifact) {
        self.dependencies.push(dependency);
    }

    /// Add a workspace project in place.
    pub fn add_workspace_project(&mut self, project: WorkspaceProject) {
        self.workspace.push(project);
    }

    /// Coordinates of the project being built.
    #[must_use]
    pub fn project(&self) -> &ArtifactCoordinates {
        &self.project
    }

    /// Base directory of the project being built.
    #[must_use]
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// All dependencies, direct and transitive, in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[ResolvedArtifact] {
        &self.dependencies
    }

    /// Workspace projects.
    #[must_use]
    pub fn workspace(&self) -> &[WorkspaceProject] {
        &self.workspace
    }

    /// Workspace project producing `coordinates`, matched on group, artifact and version.
    #[must_use]
    pub fn workspace_project(
        &self,
        coordinates: &ArtifactCoordinates,
    ) -> Option<&WorkspaceProject> {
        self.workspace.iter().find(|p| {
            p.coordinates.group_id == coordinates.group_id
                && p.coordinates.artifact_id == coordinates.artifact_id
                && p.coordinates.version == coordinates.version
        })
    }
}
