//! Manifest header extraction.
//!
//! OSGi artifacts describe themselves in a JAR-style manifest (`META-INF/MANIFEST.MF` for bundles
//! and deployment packages, `OSGI-INF/SUBSYSTEM.MF` for subsystems). Only the main section is
//! read. The format is `Name: value`; a line starting with a single space continues the previous
//! value.
//!
//! Headers can be read from three places:
//! - text already in memory ([`ManifestHeaders::parse`])
//! - an unpacked workspace directory ([`ManifestHeaders::read_from_directory`])
//! - a packed archive ([`ManifestHeaders::read_from_archive`])

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::trace;

/// Main-section headers of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestHeaders {
    headers: BTreeMap<String, String>,
}

impl ManifestHeaders {
    /// Parse manifest text.
    ///
    /// ```rust
    /// use bundle_cache::manifest::ManifestHeaders;
    ///
    /// let headers = ManifestHeaders::parse(
    ///     "Manifest-Version: 1.0\nBundle-SymbolicName: com.acme.foo;\n singleton:=true\n",
    /// );
    /// assert_eq!(headers.get("Bundle-SymbolicName"), Some("com.acme.foo;singleton:=true"));
    /// ```
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut headers = BTreeMap::new();
        let mut current: Option<(String, String)> = None;

        for raw in content.lines() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);

            if line.is_empty() {
                // end of the main section
                break;
            }

            if let Some(continuation) = line.strip_prefix(' ') {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(continuation);
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.insert(name, value);
            }

            if let Some((name, value)) = line.split_once(':') {
                let value = value.strip_prefix(' ').unwrap_or(value);
                current = Some((name.trim().to_string(), value.to_string()));
            } else {
                trace!("Ignoring malformed manifest line: {line}");
            }
        }

        if let Some((name, value)) = current {
            headers.insert(name, value);
        }

        Self {
            headers,
        }
    }

    /// Read `entry` below `directory`; `Ok(None)` when the file does not exist.
    pub fn read_from_directory(directory: &Path, entry: &str) -> Result<Option<Self>> {
        let path = directory.join(entry);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Ok(Some(Self::parse(&content)))
    }

    /// Read `entry` from a ZIP/JAR archive; `Ok(None)` when the archive has no such entry.
    pub fn read_from_archive(archive: &Path, entry: &str) -> Result<Option<Self>> {
        let file = File::open(archive)
            .with_context(|| format!("Failed to open archive: {}", archive.display()))?;
        let mut zip = zip::ZipArchive::new(file)
            .with_context(|| format!("Not a valid archive: {}", archive.display()))?;

        let mut manifest = match zip.by_name(entry) {
            Ok(manifest) => manifest,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read {entry} from {}", archive.display())
                });
            }
        };

        let mut content = String::new();
        manifest
            .read_to_string(&mut content)
            .with_context(|| format!("Manifest {entry} in {} is not UTF-8", archive.display()))?;
        Ok(Some(Self::parse(&content)))
    }

    /// Read from whatever `location` is: an unpacked directory or a packed archive.
    pub fn read(location: &Path, entry: &str) -> Result<Option<Self>> {
        if location.is_dir() {
            Self::read_from_directory(location, entry)
        } else if location.is_file() {
            Self::read_from_archive(location, entry)
        } else {
            Ok(None)
        }
    }

    /// Header value, matched exactly on the header name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Whether a header is present with a non-blank value.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.trim().is_empty())
    }

    /// Value of a header up to its first `;`, i.e. without OSGi parameters or directives.
    ///
    /// ```rust
    /// use bundle_cache::manifest::ManifestHeaders;
    ///
    /// let headers = ManifestHeaders::parse("Bundle-SymbolicName: com.acme.foo;singleton:=true");
    /// assert_eq!(headers.main_value("Bundle-SymbolicName"), Some("com.acme.foo"));
    /// ```
    #[must_use]
    pub fn main_value(&self, name: &str) -> Option<&str> {
        self.get(name).map(|value| value.split(';').next().unwrap_or(value).trim())
    }

    /// Insert or replace a header.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Iterate headers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether no header was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl FromIterator<(String, String)> for ManifestHeaders {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            headers: iter.into_iter().collect(),
        }
    }
}
