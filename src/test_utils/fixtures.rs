//! On-disk fixtures: packed archives, unpacked workspace projects and local Maven repositories.

use crate::artifact::ArtifactCoordinates;
use crate::constants::{JAR_MANIFEST_PATH, SUBSYSTEM_MANIFEST_PATH};
use crate::repository::LocalRepository;
use crate::utils::fs::ensure_parent_dir;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Manifest text for a bundle.
#[must_use]
pub fn bundle_manifest(symbolic_name: &str, version: &str) -> String {
    format!(
        "Manifest-Version: 1.0\r\n\
         Bundle-ManifestVersion: 2\r\n\
         Bundle-SymbolicName: {symbolic_name}\r\n\
         Bundle-Version: {version}\r\n\r\n"
    )
}

/// Manifest text for a subsystem of `subsystem_type` (e.g. `osgi.subsystem.feature`).
#[must_use]
pub fn subsystem_manifest(symbolic_name: &str, version: &str, subsystem_type: &str) -> String {
    format!(
        "Subsystem-ManifestVersion: 1\r\n\
         Subsystem-SymbolicName: {symbolic_name}\r\n\
         Subsystem-Version: {version}\r\n\
         Subsystem-Type: {subsystem_type}\r\n\r\n"
    )
}

/// Write a ZIP archive holding `entries` (name, content) at `path`.
pub fn write_archive(path: &Path, entries: &[(&str, &[u8])]) -> Result<PathBuf> {
    ensure_parent_dir(path)?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create archive: {}", path.display()))?;
    let mut writer = ZipWriter::new(file);
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default())?;
        writer.write_all(content)?;
    }
    writer.finish()?;
    Ok(path.to_path_buf())
}

/// Write a bundle jar with a manifest and one class file.
pub fn write_bundle_jar(path: &Path, symbolic_name: &str, version: &str) -> Result<PathBuf> {
    let manifest = bundle_manifest(symbolic_name, version);
    write_archive(
        path,
        &[
            (JAR_MANIFEST_PATH, manifest.as_bytes()),
            ("com/acme/Activator.class", b"\xca\xfe\xba\xbe".as_slice()),
        ],
    )
}

/// Write a jar without any manifest.
pub fn write_plain_jar(path: &Path) -> Result<PathBuf> {
    write_archive(path, &[("com/acme/Util.class", b"\xca\xfe\xba\xbe".as_slice())])
}

/// Write a subsystem archive.
pub fn write_subsystem_archive(
    path: &Path,
    symbolic_name: &str,
    version: &str,
    subsystem_type: &str,
) -> Result<PathBuf> {
    let manifest = subsystem_manifest(symbolic_name, version, subsystem_type);
    write_archive(path, &[(SUBSYSTEM_MANIFEST_PATH, manifest.as_bytes())])
}

/// Unpacked bundle project: `<base>/pom.xml` and `<base>/target/classes` with a manifest and a
/// class file. Returns the `classes` directory.
pub fn create_workspace_bundle(base: &Path, symbolic_name: &str, version: &str) -> Result<PathBuf> {
    write_pom(base, "bundle")?;
    let classes = base.join("target").join("classes");
    write_file(&classes.join(JAR_MANIFEST_PATH), &bundle_manifest(symbolic_name, version))?;
    write_file(&classes.join("com/acme/Activator.class"), "\u{0}")?;
    Ok(classes)
}

/// Unpacked subsystem project: `<base>/pom.xml` and `<base>/target/esa` with a subsystem
/// manifest. Returns the `esa` directory.
pub fn create_workspace_subsystem(
    base: &Path,
    symbolic_name: &str,
    version: &str,
    subsystem_type: &str,
) -> Result<PathBuf> {
    write_pom(base, "esa")?;
    let esa = base.join("target").join("esa");
    write_file(
        &esa.join(SUBSYSTEM_MANIFEST_PATH),
        &subsystem_manifest(symbolic_name, version, subsystem_type),
    )?;
    Ok(esa)
}

/// Install a bundle jar into a Maven-layout repository rooted at `base`. Returns its path.
pub fn install_bundle(
    base: &Path,
    coordinates: &ArtifactCoordinates,
    symbolic_name: &str,
) -> Result<PathBuf> {
    let path = LocalRepository::new(base).artifact_path(coordinates);
    write_bundle_jar(&path, symbolic_name, &coordinates.version.replace("-SNAPSHOT", ".qualifier"))
}

/// Write the `.pom` of `coordinates` into a Maven-layout repository, declaring `packaging`.
pub fn install_pom(
    base: &Path,
    coordinates: &ArtifactCoordinates,
    packaging: &str,
) -> Result<PathBuf> {
    let directory = LocalRepository::new(base).version_directory(coordinates);
    let path = directory.join(format!("{}-{}.pom", coordinates.artifact_id, coordinates.version));
    write_file(
        &path,
        &format!("<project>\n  <packaging>{packaging}</packaging>\n</project>\n"),
    )?;
    Ok(path)
}

fn write_pom(base: &Path, packaging: &str) -> Result<()> {
    write_file(
        &base.join("pom.xml"),
        &format!("<project>\n  <packaging>{packaging}</packaging>\n</project>\n"),
    )
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
