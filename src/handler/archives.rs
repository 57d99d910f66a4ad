//! Handlers for composite archive types: deployment packages, repository indexes, P2 repositories
//! and container distributions.

use super::{TypeHandler, project_build_directory};
use crate::archiver::ArchiverKind;
use crate::constants::JAR_MANIFEST_PATH;
use std::path::{Path, PathBuf};

/// OSGi deployment packages (`.dp`). Never packed on the fly.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentPackageHandler;

impl TypeHandler for DeploymentPackageHandler {
    fn name(&self) -> &str {
        "deployment-package"
    }

    fn types(&self) -> &[&'static str] {
        &["dp", "deployment-package"]
    }

    fn default_extension(&self) -> Option<&'static str> {
        Some("dp")
    }

    fn default_manifest_path(&self) -> Option<&'static str> {
        Some(JAR_MANIFEST_PATH)
    }

    fn is_pack_on_the_fly_allowed(&self) -> bool {
        false
    }

    fn default_symbolic_name_header(&self) -> Option<&'static str> {
        Some("DeploymentPackage-SymbolicName")
    }

    fn default_version_header(&self) -> Option<&'static str> {
        Some("DeploymentPackage-Version")
    }

    fn workspace_directory(&self, main_file: &Path) -> PathBuf {
        project_build_directory(main_file).join("dp")
    }

    fn archiver_kind(&self) -> Option<ArchiverKind> {
        None
    }
}

/// Zipped OSGi repository index, packed from `target/index`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexZipHandler;

impl TypeHandler for IndexZipHandler {
    fn name(&self) -> &str {
        "index-zip"
    }

    fn types(&self) -> &[&'static str] {
        &["index-zip", "osgi-index"]
    }

    fn default_extension(&self) -> Option<&'static str> {
        Some("zip")
    }

    fn default_manifest_path(&self) -> Option<&'static str> {
        None
    }

    fn is_pack_on_the_fly_allowed(&self) -> bool {
        true
    }

    fn default_symbolic_name_header(&self) -> Option<&'static str> {
        None
    }

    fn default_version_header(&self) -> Option<&'static str> {
        None
    }

    fn workspace_directory(&self, main_file: &Path) -> PathBuf {
        project_build_directory(main_file).join("index")
    }

    fn archiver_kind(&self) -> Option<ArchiverKind> {
        Some(ArchiverKind::IndexZip)
    }
}

/// Zipped P2 repository produced by another module of the build.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryArchiveHandler;

impl TypeHandler for RepositoryArchiveHandler {
    fn name(&self) -> &str {
        "repository-archive"
    }

    fn types(&self) -> &[&'static str] {
        &["eclipse-repository", "p2-repository"]
    }

    fn default_extension(&self) -> Option<&'static str> {
        Some("zip")
    }

    fn default_manifest_path(&self) -> Option<&'static str> {
        None
    }

    fn is_pack_on_the_fly_allowed(&self) -> bool {
        false
    }

    fn default_symbolic_name_header(&self) -> Option<&'static str> {
        None
    }

    fn default_version_header(&self) -> Option<&'static str> {
        None
    }

    fn workspace_directory(&self, main_file: &Path) -> PathBuf {
        project_build_directory(main_file).join("repository")
    }

    fn archiver_kind(&self) -> Option<ArchiverKind> {
        None
    }
}

/// Container distribution (assembled runtime) built by another module.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistributionHandler;

impl TypeHandler for DistributionHandler {
    fn name(&self) -> &str {
        "container-distribution"
    }

    fn types(&self) -> &[&'static str] {
        &["container-distribution", "karaf-assembly"]
    }

    fn default_extension(&self) -> Option<&'static str> {
        Some("zip")
    }

    fn default_manifest_path(&self) -> Option<&'static str> {
        None
    }

    fn is_pack_on_the_fly_allowed(&self) -> bool {
        false
    }

    fn default_symbolic_name_header(&self) -> Option<&'static str> {
        None
    }

    fn default_version_header(&self) -> Option<&'static str> {
        None
    }

    fn workspace_directory(&self, main_file: &Path) -> PathBuf {
        project_build_directory(main_file).join("assembly")
    }

    fn archiver_kind(&self) -> Option<ArchiverKind> {
        None
    }
}
