//! Directory scanning.
//!
//! Walks the scan root and yields every file whose extension is one of the
//! configured image extensions. Paths are reported relative to the root.
//!
//! ## Exclusions
//!
//! - Directories starting with `.` are never descended into. This covers the
//!   version-control metadata directory `.git`.
//! - Files starting with `.` are skipped regardless of extension.
//! - The root itself is exempt, so scanning `.` works.
//!
//! [`iter_images`] is lazy and starts a fresh traversal on every call.
//! [`scan`] collects it into lexicographic order of the `/`-separated path,
//! which is the order the sitemap uses. Paths stay raw [`PathBuf`]s so names
//! that are not valid UTF-8 can still be opened later.

use crate::config::SitemapConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read directory tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Path is outside the scan root: {0}")]
    StripPrefix(PathBuf),
}

/// Lazily enumerate image files under `root`, relative to `root`.
///
/// Traversal order is whatever the filesystem returns; use [`scan`] for a
/// sorted list. Unreadable directories (including the root) surface as
/// [`ScanError::Walk`] items.
pub fn iter_images<'a>(
    root: &'a Path,
    config: &'a SitemapConfig,
) -> impl Iterator<Item = Result<PathBuf, ScanError>> + 'a {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
        .filter_map(move |entry| match entry {
            Err(e) => Some(Err(ScanError::Walk(e))),
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() && config.matches_extension(path) {
                    Some(relative_to(root, path))
                } else {
                    None
                }
            }
        })
}

/// Collect every image under `root` as a relative path, sorted by its
/// `/`-separated form (raw bytes break ties between lossy look-alikes).
pub fn scan(root: &Path, config: &SitemapConfig) -> Result<Vec<PathBuf>, ScanError> {
    let mut paths = iter_images(root, config).collect::<Result<Vec<_>, _>>()?;
    paths.sort_by_cached_key(|p| {
        (
            to_slash_path(p),
            p.as_os_str().as_encoded_bytes().to_vec(),
        )
    });
    log::debug!("Found {} image(s) under {}", paths.len(), root.display());
    Ok(paths)
}

/// Render a relative path with `/` separators regardless of platform.
pub fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_hidden(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.')
}

fn relative_to(root: &Path, path: &Path) -> Result<PathBuf, ScanError> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|_| ScanError::StripPrefix(path.to_path_buf()))
}
