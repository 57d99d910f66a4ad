//! OSGi subsystems (Enterprise Subsystem Archives).
//!
//! The three subsystem kinds share layout and headers. They differ in the type strings they
//! accept and in the value an explicit `Subsystem-Type` header must carry.

use super::{TypeHandler, project_build_directory};
use crate::archiver::ArchiverKind;
use crate::constants::SUBSYSTEM_MANIFEST_PATH;
use crate::manifest::ManifestHeaders;
use std::path::{Path, PathBuf};

const APPLICATION_TYPES: &[&str] =
    &["esa", "subsystem-application", "osgi.subsystem.application"];
const COMPOSITE_TYPES: &[&str] = &["subsystem-composite", "osgi.subsystem.composite"];
const FEATURE_TYPES: &[&str] = &["subsystem-feature", "osgi.subsystem.feature"];

/// Kind of subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsystemKind {
    /// `osgi.subsystem.application`, the default when `Subsystem-Type` is absent
    Application,
    /// `osgi.subsystem.composite`
    Composite,
    /// `osgi.subsystem.feature`
    Feature,
}

impl SubsystemKind {
    /// Value of the `Subsystem-Type` header for this kind.
    #[must_use]
    pub const fn header_value(self) -> &'static str {
        match self {
            Self::Application => "osgi.subsystem.application",
            Self::Composite => "osgi.subsystem.composite",
            Self::Feature => "osgi.subsystem.feature",
        }
    }
}

/// Handler for one subsystem kind.
#[derive(Debug, Clone)]
pub struct SubsystemHandler {
    kind: SubsystemKind,
}

impl SubsystemHandler {
    /// Handler for `kind`.
    #[must_use]
    pub const fn new(kind: SubsystemKind) -> Self {
        Self {
            kind,
        }
    }

    /// Subsystem kind handled.
    #[must_use]
    pub const fn kind(&self) -> SubsystemKind {
        self.kind
    }
}

impl TypeHandler for SubsystemHandler {
    fn name(&self) -> &str {
        match self.kind {
            SubsystemKind::Application => "subsystem-application",
            SubsystemKind::Composite => "subsystem-composite",
            SubsystemKind::Feature => "subsystem-feature",
        }
    }

    fn types(&self) -> &[&'static str] {
        match self.kind {
            SubsystemKind::Application => APPLICATION_TYPES,
            SubsystemKind::Composite => COMPOSITE_TYPES,
            SubsystemKind::Feature => FEATURE_TYPES,
        }
    }

    fn default_extension(&self) -> Option<&'static str> {
        Some("esa")
    }

    fn default_manifest_path(&self) -> Option<&'static str> {
        Some(SUBSYSTEM_MANIFEST_PATH)
    }

    fn is_pack_on_the_fly_allowed(&self) -> bool {
        true
    }

    fn default_symbolic_name_header(&self) -> Option<&'static str> {
        Some("Subsystem-SymbolicName")
    }

    fn default_version_header(&self) -> Option<&'static str> {
        Some("Subsystem-Version")
    }

    fn workspace_directory(&self, main_file: &Path) -> PathBuf {
        project_build_directory(main_file).join("esa")
    }

    fn is_artifact_manifest_valid(&self, headers: &ManifestHeaders) -> bool {
        if !headers.has("Subsystem-SymbolicName") || !headers.has("Subsystem-Version") {
            return false;
        }
        match headers.main_value("Subsystem-Type") {
            None | Some("") => self.kind == SubsystemKind::Application,
            Some(declared) => declared == self.kind.header_value(),
        }
    }

    fn archiver_kind(&self) -> Option<ArchiverKind> {
        Some(ArchiverKind::Subsystem)
    }
}
