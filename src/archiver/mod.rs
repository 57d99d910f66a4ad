//! On-the-fly packaging of workspace output.
//!
//! Workspace projects that are part of the current build have no packed artifact yet. When their
//! handler allows it, the resolver packs their output directory into an archive in the cache with
//! an [`Archiver`]. Three kinds exist:
//!
//! - [`ArchiverKind::Jar`]: manifest written first as `META-INF/MANIFEST.MF`, then the directory
//! - [`ArchiverKind::Subsystem`]: an uncompressed `mimetype` marker entry first, then
//!   `OSGI-INF/SUBSYSTEM.MF`, then the directory
//! - [`ArchiverKind::IndexZip`]: the directory contents only
//!
//! Archives are written to a temporary file beside the destination and renamed into place.

use crate::constants::{
    JAR_MANIFEST_PATH, SUBSYSTEM_MANIFEST_PATH, SUBSYSTEM_MIME_ENTRY, SUBSYSTEM_MIME_TYPE,
};
use crate::manifest::ManifestHeaders;
use crate::utils::fs::ensure_parent_dir;
use anyhow::{Context, Result, anyhow};
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Archive flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiverKind {
    /// OSGi bundle / plain jar
    Jar,
    /// Enterprise subsystem archive
    Subsystem,
    /// Zipped repository index
    IndexZip,
}

impl ArchiverKind {
    /// Manifest entry written by this kind, if any.
    #[must_use]
    pub const fn manifest_entry(self) -> Option<&'static str> {
        match self {
            Self::Jar => Some(JAR_MANIFEST_PATH),
            Self::Subsystem => Some(SUBSYSTEM_MANIFEST_PATH),
            Self::IndexZip => None,
        }
    }
}

impl fmt::Display for ArchiverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jar => "jar",
            Self::Subsystem => "subsystem",
            Self::IndexZip => "index-zip",
        })
    }
}

/// Packs one archive. Configure it, then call [`create_archive`](Archiver::create_archive) once.
pub trait Archiver {
    /// Headers to render as the archive manifest.
    fn set_manifest(&mut self, headers: ManifestHeaders);

    /// Manifest file to store verbatim as the archive manifest, per-entry sections included.
    fn set_manifest_file(&mut self, path: &Path);

    /// Directory whose contents become the archive's entries.
    fn add_directory_contents(&mut self, directory: &Path);

    /// Archive file to create.
    fn set_destination(&mut self, destination: &Path);

    /// Write the archive, replacing any existing file at the destination.
    fn create_archive(&mut self) -> Result<PathBuf>;
}

/// Creates archivers. The resolver holds one factory for the whole pass.
pub trait ArchiverFactory: fmt::Debug {
    /// A fresh archiver of `kind`.
    fn create(&self, kind: ArchiverKind) -> Box<dyn Archiver>;
}

/// Factory for [`ZipArchiver`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiverFactory;

impl ArchiverFactory for ZipArchiverFactory {
    fn create(&self, kind: ArchiverKind) -> Box<dyn Archiver> {
        Box::new(ZipArchiver::new(kind))
    }
}

#[derive(Debug, Clone)]
enum ManifestSource {
    Headers(ManifestHeaders),
    File(PathBuf),
}

/// [`Archiver`] writing ZIP-based archives with the `zip` crate.
#[derive(Debug, Clone)]
pub struct ZipArchiver {
    kind: ArchiverKind,
    manifest: Option<ManifestSource>,
    directories: Vec<PathBuf>,
    destination: Option<PathBuf>,
}

impl ZipArchiver {
    /// Unconfigured archiver of `kind`.
    #[must_use]
    pub const fn new(kind: ArchiverKind) -> Self {
        Self {
            kind,
            manifest: None,
            directories: Vec::new(),
            destination: None,
        }
    }

    fn write_entries<W: Write + io::Seek>(&self, writer: &mut ZipWriter<W>) -> Result<()> {
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let manifest_entry = self.kind.manifest_entry();

        if self.kind == ArchiverKind::Subsystem {
            let stored =
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            writer.start_file(SUBSYSTEM_MIME_ENTRY, stored)?;
            writer.write_all(SUBSYSTEM_MIME_TYPE.as_bytes())?;
        }

        if let (Some(entry), Some(manifest)) = (manifest_entry, &self.manifest) {
            let content = match manifest {
                ManifestSource::Headers(headers) => render_manifest(headers).into_bytes(),
                ManifestSource::File(path) => std::fs::read(path)
                    .with_context(|| format!("Failed to read manifest: {}", path.display()))?,
            };
            writer.start_file(entry, deflated)?;
            writer.write_all(&content)?;
        }

        for directory in &self.directories {
            for entry in WalkDir::new(directory).min_depth(1).sort_by_file_name() {
                let entry = entry
                    .with_context(|| format!("Failed to read directory: {}", directory.display()))?;
                let relative = entry.path().strip_prefix(directory)?;
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");

                // the manifest set on the archiver wins over a copy in the directory
                if self.manifest.is_some() && manifest_entry == Some(name.as_str()) {
                    continue;
                }
                if self.kind == ArchiverKind::Subsystem && name == SUBSYSTEM_MIME_ENTRY {
                    continue;
                }

                if entry.file_type().is_dir() {
                    writer.add_directory(format!("{name}/"), deflated)?;
                } else if entry.file_type().is_file() {
                    writer.start_file(name.as_str(), deflated)?;
                    let mut source = File::open(entry.path())
                        .with_context(|| format!("Failed to open {}", entry.path().display()))?;
                    io::copy(&mut source, writer)?;
                }
            }
        }
        Ok(())
    }
}

impl Archiver for ZipArchiver {
    fn set_manifest(&mut self, headers: ManifestHeaders) {
        self.manifest = Some(ManifestSource::Headers(headers));
    }

    fn set_manifest_file(&mut self, path: &Path) {
        self.manifest = Some(ManifestSource::File(path.to_path_buf()));
    }

    fn add_directory_contents(&mut self, directory: &Path) {
        self.directories.push(directory.to_path_buf());
    }

    fn set_destination(&mut self, destination: &Path) {
        self.destination = Some(destination.to_path_buf());
    }

    fn create_archive(&mut self) -> Result<PathBuf> {
        let destination = self
            .destination
            .clone()
            .ok_or_else(|| anyhow!("No destination set for {} archive", self.kind))?;

        for directory in &self.directories {
            if !directory.is_dir() {
                return Err(anyhow!("Directory to archive does not exist: {}", directory.display()));
            }
        }

        ensure_parent_dir(&destination)?;
        let parent = destination.parent().unwrap_or_else(|| Path::new("."));
        let temp = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;

        let mut writer = ZipWriter::new(temp.reopen()?);
        self.write_entries(&mut writer)?;
        writer.finish()?;

        temp.persist(&destination)
            .with_context(|| format!("Failed to write archive: {}", destination.display()))?;
        debug!("Created {} archive {}", self.kind, destination.display());
        Ok(destination)
    }
}

/// Render headers in the manifest format, `Manifest-Version` first, lines wrapped at 72 bytes.
fn render_manifest(headers: &ManifestHeaders) -> String {
    let mut out = String::new();
    let version = headers.get("Manifest-Version").unwrap_or("1.0");
    push_header(&mut out, "Manifest-Version", version);
    for (name, value) in headers.iter().filter(|(name, _)| *name != "Manifest-Version") {
        push_header(&mut out, name, value);
    }
    out.push_str("\r\n");
    out
}

fn push_header(out: &mut String, name: &str, value: &str) {
    let line = format!("{name}: {value}");
    let mut rest = line.as_str();
    let mut first = true;
    while !rest.is_empty() {
        let width = if first { 72 } else { 71 };
        let mut split = rest.len().min(width);
        while !rest.is_char_boundary(split) {
            split -= 1;
        }
        if !first {
            out.push(' ');
        }
        out.push_str(&rest[..split]);
        out.push_str("\r\n");
        rest = &rest[split..];
        first = false;
    }
}
