//! TOML parsing with typed errors.

use crate::core::BundleCacheError;
use anyhow::{Context, Result};
use std::path::Path;

/// Read and deserialize the TOML file at `path`.
///
/// A file that cannot be read fails with an I/O context; invalid TOML or a shape mismatch fails
/// with [`BundleCacheError::ConfigParseError`].
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&content).map_err(|e| {
        BundleCacheError::ConfigParseError {
            file: path.display().to_string(),
            reason: e.message().trim().to_string(),
        }
        .into()
    })
}
