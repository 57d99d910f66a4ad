//! OSGi bundles and plain jars carrying bundle headers.

use super::{TypeHandler, project_build_directory};
use crate::archiver::ArchiverKind;
use crate::constants::JAR_MANIFEST_PATH;
use std::path::{Path, PathBuf};

const BUNDLE_TYPES: &[&str] = &["bundle"];
const JAR_TYPES: &[&str] = &["jar"];

/// Handler for `bundle` artifacts, or for `jar` artifacts when synthesized by the registry.
#[derive(Debug, Clone)]
pub struct BundleHandler {
    generic: bool,
}

impl BundleHandler {
    /// Handler registered for the `bundle` type.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generic: false,
        }
    }

    /// Handler for plain `jar` packaging, used when no registered handler accepts a type.
    #[must_use]
    pub const fn generic() -> Self {
        Self {
            generic: true,
        }
    }
}

impl Default for BundleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeHandler for BundleHandler {
    fn name(&self) -> &str {
        if self.generic { "jar" } else { "bundle" }
    }

    fn types(&self) -> &[&'static str] {
        if self.generic { JAR_TYPES } else { BUNDLE_TYPES }
    }

    fn default_extension(&self) -> Option<&'static str> {
        Some("jar")
    }

    fn default_manifest_path(&self) -> Option<&'static str> {
        Some(JAR_MANIFEST_PATH)
    }

    fn is_build_classpath_type(&self) -> bool {
        true
    }

    fn is_pack_on_the_fly_allowed(&self) -> bool {
        true
    }

    fn default_symbolic_name_header(&self) -> Option<&'static str> {
        Some("Bundle-SymbolicName")
    }

    fn default_version_header(&self) -> Option<&'static str> {
        Some("Bundle-Version")
    }

    fn workspace_directory(&self, main_file: &Path) -> PathBuf {
        // unpacked output is already the classes directory
        if main_file.is_dir() || main_file.file_name().is_some_and(|n| n == "classes") {
            return main_file.to_path_buf();
        }
        project_build_directory(main_file).join("classes")
    }

    fn archiver_kind(&self) -> Option<ArchiverKind> {
        Some(ArchiverKind::Jar)
    }
}
