//! Test utilities for bundle-cache
//!
//! This module provides helpers shared by the unit tests and the integration suite:
//! - [`InMemoryRepository`]: a [`RepositorySystem`] answering from a map, so tests decide exactly
//!   which artifacts resolve
//! - [`fixtures`]: packed bundles and subsystems, unpacked workspace projects and local Maven
//!   repositories on disk
//! - [`init_test_logging`]: tracing output inside `cargo test`
//!
//! # Example
//!
//! ```rust,no_run
//! use bundle_cache::artifact::ArtifactCoordinates;
//! use bundle_cache::test_utils::{InMemoryRepository, fixtures};
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let jar = fixtures::write_bundle_jar(&temp.path().join("foo-1.0.jar"), "com.acme.foo", "1.0.0")
//!     .unwrap();
//! let repository = InMemoryRepository::new()
//!     .with_artifact(ArtifactCoordinates::new("com.acme", "foo", "1.0"), jar);
//! ```

pub mod fixtures;

use crate::artifact::ArtifactCoordinates;
use crate::repository::{ProjectModel, RepositorySystem};
use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set, that level is used; otherwise
/// `RUST_LOG` is honored, and without it nothing is logged.
///
/// ```rust,no_run
/// use tracing::Level;
///
/// bundle_cache::test_utils::init_test_logging(Some(Level::DEBUG));
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// [`RepositorySystem`] backed by a map from coordinates to files.
///
/// Unknown coordinates resolve to nothing; unknown project models are `jar` packaged.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    artifacts: HashMap<String, PathBuf>,
    packaging: HashMap<String, String>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `coordinates` to `file`.
    #[must_use]
    pub fn with_artifact(
        mut self,
        coordinates: ArtifactCoordinates,
        file: impl Into<PathBuf>,
    ) -> Self {
        self.artifacts.insert(coordinates.to_string(), file.into());
        self
    }

    /// Declare the packaging of the project producing `coordinates`.
    #[must_use]
    pub fn with_packaging(
        mut self,
        coordinates: &ArtifactCoordinates,
        packaging: impl Into<String>,
    ) -> Self {
        self.packaging.insert(coordinates.group_artifact(), packaging.into());
        self
    }
}

impl RepositorySystem for InMemoryRepository {
    fn resolve_artifact(&self, coordinates: &ArtifactCoordinates) -> Result<Option<PathBuf>> {
        Ok(self.artifacts.get(&coordinates.to_string()).cloned())
    }

    fn build_project_model(&self, coordinates: &ArtifactCoordinates) -> Result<ProjectModel> {
        Ok(match self.packaging.get(&coordinates.group_artifact()) {
            Some(packaging) => ProjectModel {
                coordinates: coordinates.clone(),
                packaging: packaging.clone(),
            },
            None => ProjectModel::jar(coordinates.clone()),
        })
    }
}
