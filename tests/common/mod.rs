//! Common test utilities for bundle-cache integration tests
//!
//! A [`TestProject`] owns a temporary directory holding a project root and a local Maven
//! repository, writes `bundle-cache.toml` and runs the binary inside the project.

// Not every test module uses every helper
#![allow(dead_code)]

mod config_builder;

pub use config_builder::ConfigBuilder;

use anyhow::{Context, Result};
use bundle_cache::artifact::ArtifactCoordinates;
use bundle_cache::test_utils::fixtures;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Temporary project with its own local repository
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
    repository_dir: PathBuf,
}

impl TestProject {
    /// Create `project/` and `m2/` under a fresh temporary directory
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let repository_dir = temp_dir.path().join("m2");

        fs::create_dir_all(&project_dir)?;
        fs::create_dir_all(&repository_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            repository_dir,
        })
    }

    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    /// Root of the local Maven repository
    pub fn repository_path(&self) -> &Path {
        &self.repository_dir
    }

    /// Default cache directory of the project
    pub fn cache_path(&self) -> PathBuf {
        self.project_dir.join("target").join("bundle-cache")
    }

    /// Path of `bundle-cache.toml`
    pub fn config_path(&self) -> PathBuf {
        self.project_dir.join("bundle-cache.toml")
    }

    /// Write `bundle-cache.toml` to the project directory
    pub fn write_config(&self, content: &str) -> Result<()> {
        let path = self.config_path();
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Write a file relative to the project directory
    pub fn write_file(&self, path: &str, content: &str) -> Result<PathBuf> {
        let target = self.project_dir.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, content)?;
        Ok(target)
    }

    /// Install a bundle jar into the local repository
    pub fn install_bundle(&self, coordinates: &str, symbolic_name: &str) -> Result<PathBuf> {
        fixtures::install_bundle(&self.repository_dir, &parse(coordinates), symbolic_name)
    }

    /// Declare the packaging of an artifact in the local repository
    pub fn install_pom(&self, coordinates: &str, packaging: &str) -> Result<PathBuf> {
        fixtures::install_pom(&self.repository_dir, &parse(coordinates), packaging)
    }

    /// Unpacked bundle module under `project/<name>`
    pub fn create_workspace_bundle(
        &self,
        name: &str,
        symbolic_name: &str,
        version: &str,
    ) -> Result<PathBuf> {
        fixtures::create_workspace_bundle(&self.project_dir.join(name), symbolic_name, version)
    }

    /// Run the binary in the project directory
    pub fn run_bundle_cache(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new(env!("CARGO_BIN_EXE_bundle-cache"))
            .args(args)
            .current_dir(&self.project_dir)
            .env_remove("BUNDLE_CACHE_CONFIG")
            .env("NO_COLOR", "1")
            .output()
            .context("Failed to run bundle-cache")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// `group:artifact:version` or `group:artifact:type:version`
fn parse(coordinates: &str) -> ArtifactCoordinates {
    let parts: Vec<&str> = coordinates.split(':').collect();
    match parts.as_slice() {
        [group, artifact, version] => ArtifactCoordinates::new(*group, *artifact, *version),
        [group, artifact, type_, version] => {
            ArtifactCoordinates::new(*group, *artifact, *version).with_type(*type_)
        }
        _ => panic!("Invalid test coordinates: {coordinates}"),
    }
}

/// Captured output of a command
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStderr: {}",
            self.code, self.stderr
        );
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
