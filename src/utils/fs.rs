//! File system helpers for the cache directory.
//!
//! Every mutation creates the parents first, then overwrites whatever is at the destination.
//! Cached files are written through a temporary file in the same directory and renamed into place:
//! an interrupted copy must never leave a truncated artifact that a later pass considers fresh.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bundle_cache::utils::fs::{copy_file, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("target/bundle-cache/bundle"))?;
//! copy_file(
//!     Path::new("/home/me/.m2/repository/com/acme/foo/1.0/foo-1.0.jar"),
//!     Path::new("target/bundle-cache/bundle/foo-1.0.jar"),
//! )?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// Fails when the path exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Ensures the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Copies a single file, creating the destination's parents and overwriting any existing file.
///
/// Returns the number of bytes copied.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64> {
    ensure_parent_dir(dst)?;
    let directory = dst.parent().unwrap_or_else(|| Path::new("."));

    let temp = tempfile::NamedTempFile::new_in(directory)
        .with_context(|| format!("Failed to create temp file in: {}", directory.display()))?;
    let bytes = fs::copy(src, temp.path()).with_context(|| {
        format!("Failed to copy file from {} to {}", src.display(), dst.display())
    })?;
    temp.persist(dst)
        .with_context(|| format!("Failed to move temp file to: {}", dst.display()))?;
    Ok(bytes)
}

/// Recursively copies the contents of `src` into `dst`, overwriting existing files.
///
/// Only regular files and directories are copied; symbolic links are not followed. Returns the
/// number of bytes copied.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<u64> {
    ensure_dir(dst)?;
    let mut bytes = 0;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry =
            entry.with_context(|| format!("Failed to read directory: {}", src.display()))?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else if entry.file_type().is_file() {
            bytes += copy_file(entry.path(), &target)?;
        }
    }
    Ok(bytes)
}

/// Files below `dir` matching the glob `pattern` (relative to `dir`), sorted by path.
///
/// A pattern without wildcards finds at most the one file it names.
pub fn find_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = dir.join(pattern);
    let full = full.to_string_lossy();
    let mut files = Vec::new();
    for entry in glob::glob(&full).with_context(|| format!("Invalid file pattern: {pattern}"))? {
        let path = entry.with_context(|| format!("Failed to search for {full}"))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Recursively removes a directory; a missing directory is not an error.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Removes a file; a missing file is not an error.
pub fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove file: {}", path.display())),
    }
}

/// Gets the modification time of a file.
pub fn get_modified_time(path: &Path) -> Result<std::time::SystemTime> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to get metadata for: {}", path.display()))?;

    metadata
        .modified()
        .with_context(|| format!("Failed to get modification time for: {}", path.display()))
}

/// Walks up from `start` to the first directory containing `file_name`.
pub fn find_upwards(start: &Path, file_name: &str) -> Option<PathBuf> {
    let mut current = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

    loop {
        let candidate = current.join(file_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
