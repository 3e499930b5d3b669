//! Shared test utilities for the image-sitemap test suite.
//!
//! Provides throwaway directory trees (optionally git repositories), a
//! scriptable [`TimestampSource`], and a parser for rendered sitemaps.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = make_tree(&["a.png", "sub/b.JPG", "notes.txt"]);
//! let builder = SitemapBuilder::new(tmp.path(), default_config())
//!     .with_resolver(fake_resolver(FakeTimestamps::fixed("2024-01-01T00:00:00Z")));
//! assert_eq!(count_urls(&builder.build().unwrap()), 2);
//! ```

use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use crate::config::SitemapConfig;
use crate::timestamp::{
    FilesystemTimestamps, TimestampError, TimestampResolver, TimestampSource, format_mtime,
};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a temp directory containing the given files (parents created as
/// needed). Each file holds a few placeholder bytes; scanning only looks at
/// names.
pub fn make_tree(files: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for rel in files {
        let path = tmp.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "fake image").unwrap();
    }
    tmp
}

/// The stock config, normalized.
pub fn default_config() -> SitemapConfig {
    SitemapConfig::default().finish().unwrap()
}

/// `/`-separated display form of scanned paths.
pub fn slash_paths(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| crate::scan::to_slash_path(p)).collect()
}

/// Formatted mtime of a file under `root`, as the filesystem source reports it.
pub fn mtime_of(root: &Path, rel: &str) -> String {
    format_mtime(fs::metadata(root.join(rel)).unwrap().modified().unwrap())
}

// =========================================================================
// Fake timestamp source
// =========================================================================

/// Scriptable stand-in for the git source.
#[derive(Default)]
pub struct FakeTimestamps {
    answers: HashMap<String, String>,
    fallback: Option<String>,
    fail: bool,
}

impl FakeTimestamps {
    /// Knows nothing; every lookup is `Ok(None)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Same answer for every file.
    pub fn fixed(ts: &str) -> Self {
        Self {
            fallback: Some(ts.to_string()),
            ..Self::default()
        }
    }

    /// Every lookup errors.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, rel: &str, ts: &str) -> Self {
        self.answers.insert(rel.to_string(), ts.to_string());
        self
    }
}

impl TimestampSource for FakeTimestamps {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn last_modified(
        &self,
        _root: &Path,
        rel_path: &Path,
    ) -> Result<Option<String>, TimestampError> {
        if self.fail {
            return Err(TimestampError::Unresolved(rel_path.to_path_buf()));
        }
        let key = crate::scan::to_slash_path(rel_path);
        Ok(self
            .answers
            .get(&key)
            .cloned()
            .or_else(|| self.fallback.clone()))
    }
}

/// `fake` first, then the real filesystem source, mirroring git mode.
pub fn fake_resolver(fake: FakeTimestamps) -> TimestampResolver {
    TimestampResolver::new(vec![Box::new(fake), Box::new(FilesystemTimestamps)])
}

// =========================================================================
// Git fixtures
// =========================================================================

/// Whether a `git` executable is on `PATH`.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

/// Run git in `dir` with a fixed identity, panicking on failure.
pub fn git(dir: &Path, args: &[&str], envs: &[(&str, &str)]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Sitemap Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .envs(envs.iter().copied())
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Create the files under a fresh repository and commit them all at
/// `committed_at` (author and committer date).
pub fn make_repo(files: &[&str], committed_at: &str) -> TempDir {
    let tmp = make_tree(files);
    git(tmp.path(), &["init", "-q"], &[]);
    git(tmp.path(), &["add", "-A"], &[]);
    git(
        tmp.path(),
        &["commit", "-q", "-m", "add images"],
        &[
            ("GIT_AUTHOR_DATE", committed_at),
            ("GIT_COMMITTER_DATE", committed_at),
        ],
    );
    tmp
}

// =========================================================================
// XML parsing
// =========================================================================

/// One `<url>` element of a parsed sitemap.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub loc: String,
    pub lastmod: String,
    pub image_loc: String,
    pub caption: String,
}

/// Parse a rendered sitemap with quick-xml, panicking if it is not
/// well-formed or its root is not `<urlset>`. Returns every `<url>`, unescaped.
pub fn parse_sitemap(xml: &str) -> Vec<ParsedUrl> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root = String::new();
    let mut urls = Vec::new();
    let mut current = ParsedUrl::default();
    let mut tag = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if root.is_empty() {
                    root = tag.clone();
                }
                if tag == "url" {
                    current = ParsedUrl::default();
                }
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().unwrap().to_string();
                match tag.as_str() {
                    "loc" => current.loc = text,
                    "lastmod" => current.lastmod = text,
                    "image:loc" => current.image_loc = text,
                    "image:caption" => current.caption = text,
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"url" {
                    urls.push(std::mem::take(&mut current));
                }
                tag.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("malformed sitemap at {}: {e}\n{xml}", reader.buffer_position()),
            _ => {}
        }
    }
    assert_eq!(root, "urlset", "unexpected root element");
    urls
}

/// Number of `<url>` entries in a rendered document.
pub fn count_urls(xml: &str) -> usize {
    parse_sitemap(xml).len()
}
