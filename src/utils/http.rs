//! Blocking transport for remote index repositories.
//!
//! Remote index locations are either `http(s)://` URLs or `file://` URLs (offline mode points
//! the index at the local cache directory). [`Transport`] hides the difference: reachability is
//! an HTTP `HEAD` or a file-existence probe, downloads are an HTTP `GET` streamed to disk or a
//! plain copy. A `file://` source may be a directory: P2 repositories publish some plugins
//! unpacked, and those are copied as a tree.
//!
//! Neither probes nor downloads are retried. A failed probe reports `false`; the caller decides
//! whether that is fatal.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::BundleCacheError;
use crate::utils::fs::{copy_dir, copy_file, ensure_parent_dir};

/// Blocking HTTP and file transport.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
}

impl Transport {
    /// Build a transport.
    ///
    /// A zero `timeout` sets no explicit timeout, leaving the HTTP client's own default in place.
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut builder = Client::builder();
        if timeout.is_zero() {
            debug!("No network timeout configured, using the transport default");
        } else {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
        })
    }

    /// Whether `url` answers. Never fails: every error is logged and reported as `false`.
    pub fn is_reachable(&self, url: &str) -> bool {
        if let Some(path) = file_url_path(url) {
            let reachable = path.exists();
            debug!("Probed {} on disk: {}", path.display(), reachable);
            return reachable;
        }

        match self.client.head(url).send() {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!("HTTP {} from {}", response.status(), url);
                false
            }
            Err(e) => {
                warn!("Failed to reach {}: {}", url, e);
                false
            }
        }
    }

    /// Download `url` to `destination`, replacing any existing file. Returns the bytes written.
    pub fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        if let Some(source) = file_url_path(url) {
            if source.is_dir() {
                debug!("Copying directory {} to {}", source.display(), destination.display());
                return copy_dir(&source, destination);
            }
            return copy_file(&source, destination);
        }

        debug!("Downloading {} to {}", url, destination.display());
        let mut response = self.client.get(url).send().map_err(|e| {
            BundleCacheError::NetworkError {
                operation: format!("GET {url}"),
                reason: e.to_string(),
            }
        })?;

        if !response.status().is_success() {
            return Err(BundleCacheError::NetworkError {
                operation: format!("GET {url}"),
                reason: format!("HTTP {}", response.status()),
            }
            .into());
        }

        ensure_parent_dir(destination)?;
        let directory = destination.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = tempfile::NamedTempFile::new_in(directory)
            .with_context(|| format!("Failed to create temp file in: {}", directory.display()))?;
        let written = io::copy(&mut response, temp.as_file_mut())
            .with_context(|| format!("Failed to write download of {url}"))?;
        temp.persist(destination)
            .with_context(|| format!("Failed to move download to: {}", destination.display()))?;

        Ok(written)
    }
}

/// Local path behind a `file://` URL.
#[must_use]
pub fn file_url_path(url: &str) -> Option<PathBuf> {
    url.strip_prefix("file://").map(PathBuf::from)
}

/// `file://` URL for a local path.
#[must_use]
pub fn path_to_file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_url_round_trip() {
        let path = Path::new("/tmp/cache/p2");
        let url = path_to_file_url(path);
        assert_eq!(url, "file:///tmp/cache/p2");
        assert_eq!(file_url_path(&url).unwrap(), path);
        assert!(file_url_path("https://example.com").is_none());
    }

    #[test]
    fn test_file_probe_and_download() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("repo/plugins/a_1.0.jar");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, "jar").unwrap();

        let transport = Transport::new(Duration::ZERO).unwrap();
        assert!(transport.is_reachable(&path_to_file_url(&temp.path().join("repo"))));
        assert!(!transport.is_reachable(&path_to_file_url(&temp.path().join("missing"))));

        let downloaded = temp.path().join("cache/a_1.0.jar");
        let bytes = transport.download(&path_to_file_url(&source), &downloaded).unwrap();
        assert_eq!(bytes, 3);
        assert_eq!(std::fs::read_to_string(downloaded).unwrap(), "jar");
    }

    #[test]
    fn test_file_download_of_unpacked_plugin() {
        let temp = tempdir().unwrap();
        let plugin = temp.path().join("repo/plugins/org.acme.help_1.0");
        std::fs::create_dir_all(plugin.join("META-INF")).unwrap();
        std::fs::write(plugin.join("META-INF/MANIFEST.MF"), "Bundle-SymbolicName: x\n").unwrap();

        let transport = Transport::new(Duration::ZERO).unwrap();
        let destination = temp.path().join("cache/org.acme.help_1.0");
        transport.download(&path_to_file_url(&plugin), &destination).unwrap();
        assert!(destination.join("META-INF/MANIFEST.MF").is_file());
    }

    #[test]
    fn test_unreachable_http_is_false() {
        let transport = Transport::new(Duration::from_millis(200)).unwrap();
        assert!(!transport.is_reachable("http://127.0.0.1:1/index"));
    }
}
