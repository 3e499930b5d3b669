//! Last-modified timestamp resolution.
//!
//! Each `<lastmod>` value comes from the first [`TimestampSource`] that has an
//! answer for the file:
//!
//! ```text
//! git mode:         GitTimestamps  →  FilesystemTimestamps
//! filesystem mode:  FilesystemTimestamps
//! ```
//!
//! A source answers `Ok(Some(ts))` when it knows the timestamp and `Ok(None)`
//! when it has nothing to say. Errors from any source but the last are logged
//! at debug level and resolution moves on; only the last source's error is
//! returned to the caller.

use crate::config::TimestampMode;
use chrono::{DateTime, Utc};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimestampError {
    #[error("Cannot read modification time of {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No timestamp source had an answer for {0}")]
    Unresolved(PathBuf),
}

/// Something that can tell when a file was last changed.
///
/// `rel_path` is relative to `root`; implementations resolve it themselves.
pub trait TimestampSource {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    fn last_modified(
        &self,
        root: &Path,
        rel_path: &Path,
    ) -> Result<Option<String>, TimestampError>;
}

/// Committer date of the most recent commit touching the file.
///
/// Runs `git log -1 --format=%cI -- <path>` in the scan root. `%cI` is strict
/// ISO-8601 with the committer's offset, so the value is used verbatim. Any
/// failure (git missing, not a repository, untracked file) yields `Ok(None)`.
#[derive(Debug, Clone)]
pub struct GitTimestamps {
    program: OsString,
}

impl Default for GitTimestamps {
    fn default() -> Self {
        Self {
            program: OsString::from("git"),
        }
    }
}

impl GitTimestamps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable instead of `git` from `PATH`.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TimestampSource for GitTimestamps {
    fn name(&self) -> &'static str {
        "git"
    }

    fn last_modified(
        &self,
        root: &Path,
        rel_path: &Path,
    ) -> Result<Option<String>, TimestampError> {
        let output = Command::new(&self.program)
            .args(["log", "-1", "--format=%cI", "--"])
            .arg(rel_path)
            .current_dir(root)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();

        let output = match output {
            Ok(o) if o.status.success() => o,
            Ok(o) => {
                log::trace!("git log exited with {} for {}", o.status, rel_path.display());
                return Ok(None);
            }
            Err(e) => {
                log::trace!("could not run git for {}: {e}", rel_path.display());
                return Ok(None);
            }
        };

        let ts = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!ts.is_empty()).then_some(ts))
    }
}

/// File modification time in UTC, truncated to whole seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemTimestamps;

impl TimestampSource for FilesystemTimestamps {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    fn last_modified(
        &self,
        root: &Path,
        rel_path: &Path,
    ) -> Result<Option<String>, TimestampError> {
        let path = root.join(rel_path);
        let mtime = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|source| TimestampError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(Some(format_mtime(mtime)))
    }
}

/// Format a system time as `YYYY-MM-DDTHH:MM:SSZ` (UTC, no fractional seconds).
pub fn format_mtime(time: SystemTime) -> String {
    let dt: DateTime<Utc> = time.into();
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Ordered chain of timestamp sources.
pub struct TimestampResolver {
    sources: Vec<Box<dyn TimestampSource>>,
}

impl TimestampResolver {
    pub fn new(sources: Vec<Box<dyn TimestampSource>>) -> Self {
        Self { sources }
    }

    /// The standard chain for a configured mode.
    pub fn for_mode(mode: TimestampMode) -> Self {
        match mode {
            TimestampMode::Git => Self::new(vec![
                Box::new(GitTimestamps::new()),
                Box::new(FilesystemTimestamps),
            ]),
            TimestampMode::Filesystem => Self::new(vec![Box::new(FilesystemTimestamps)]),
        }
    }

    /// Resolve the timestamp for one file.
    pub fn resolve(&self, root: &Path, rel_path: &Path) -> Result<String, TimestampError> {
        let last = self.sources.len().saturating_sub(1);
        for (i, source) in self.sources.iter().enumerate() {
            match source.last_modified(root, rel_path) {
                Ok(Some(ts)) => {
                    log::trace!("{}: {} from {}", rel_path.display(), ts, source.name());
                    return Ok(ts);
                }
                Ok(None) => {
                    log::debug!(
                        "{}: no timestamp from {}, falling back",
                        rel_path.display(),
                        source.name()
                    );
                }
                Err(e) if i == last => return Err(e),
                Err(e) => {
                    log::debug!("{}: {} failed: {e}", rel_path.display(), source.name());
                }
            }
        }
        Err(TimestampError::Unresolved(rel_path.to_path_buf()))
    }
}
