//! Fallback handler for types no registered handler accepts.

use super::TypeHandler;
use crate::archiver::ArchiverKind;
use crate::manifest::ManifestHeaders;
use std::path::{Path, PathBuf};

/// Handler for types nobody else accepts. Artifacts it handles never validate, so the resolver
/// drops them whenever a manifest check applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHandler;

impl TypeHandler for DefaultHandler {
    fn name(&self) -> &str {
        "default"
    }

    fn types(&self) -> &[&'static str] {
        &[]
    }

    fn default_extension(&self) -> Option<&'static str> {
        None
    }

    fn is_extension_valid(&self, _path: &Path) -> bool {
        false
    }

    fn default_manifest_path(&self) -> Option<&'static str> {
        None
    }

    fn is_manifest_file_required(&self) -> bool {
        true
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
        main_file.parent().map(Path::to_path_buf).unwrap_or_default()
    }

    fn is_artifact_manifest_valid(&self, _headers: &ManifestHeaders) -> bool {
        false
    }

    fn archiver_kind(&self) -> Option<ArchiverKind> {
        None
    }
}
