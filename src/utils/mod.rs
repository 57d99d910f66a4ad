//! Utilities shared by the resolver, the configuration layer and the CLI.
//!
//! - [`fs`]: directory creation, overwrite-on-conflict copies, glob search, cache cleanup
//! - [`http`]: blocking reachability probes and downloads for remote index repositories

pub mod fs;
pub mod http;

pub use fs::{copy_dir, copy_file, ensure_dir, ensure_parent_dir, find_files, remove_dir_all};
pub use http::Transport;

use std::path::{Path, PathBuf};

/// Expand `~` and environment variables in a configured path, then resolve it against `base`
/// when it is relative.
///
/// ```rust
/// use bundle_cache::utils::resolve_path;
/// use std::path::Path;
///
/// let resolved = resolve_path("target/cache", Path::new("/work/project"));
/// assert_eq!(resolved, Path::new("/work/project/target/cache"));
/// ```
#[must_use]
pub fn resolve_path(value: &str, base: &Path) -> PathBuf {
    let expanded = shellexpand::full(value)
        .map_or_else(|_| PathBuf::from(value), |expanded| PathBuf::from(expanded.as_ref()));
    if expanded.is_absolute() { expanded } else { base.join(expanded) }
}

/// Local Maven repository used when none is configured: `~/.m2/repository`.
#[must_use]
pub fn default_local_repository() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".m2").join("repository"))
}
