//! Sitemap configuration.
//!
//! Everything the generator needs to know about the site lives in a single
//! [`SitemapConfig`]. Values come from three layers, later layers winning:
//!
//! ```text
//! stock defaults  →  sitemap.toml (optional)  →  command-line flags
//! ```
//!
//! ## Config File
//!
//! Place `sitemap.toml` in the scan root (or point `--config` at one):
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! base_url = "https://example.com"   # Public site URL, no trailing slash needed
//! output = "sitemap.xml"             # Relative paths resolve against the scan root
//! extensions = ["png", "jpg", "jpeg", "webp", "gif", "svg"]
//! timestamps = "git"                 # "git" (history, then mtime) or "filesystem"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// File name looked up in the scan root when no `--config` is given.
pub const CONFIG_FILE: &str = "sitemap.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Where last-modified timestamps come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampMode {
    /// Latest commit touching the file, falling back to mtime.
    #[default]
    Git,
    /// File modification time only.
    Filesystem,
}

impl FromStr for TimestampMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "git" => Ok(Self::Git),
            "filesystem" | "fs" | "mtime" => Ok(Self::Filesystem),
            other => Err(format!(
                "unknown timestamp mode '{other}' (expected 'git' or 'filesystem')"
            )),
        }
    }
}

impl fmt::Display for TimestampMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git => f.write_str("git"),
            Self::Filesystem => f.write_str("filesystem"),
        }
    }
}

/// Sitemap configuration loaded from `sitemap.toml`.
///
/// All fields have defaults; a config file only needs the values it wants to
/// change. Call [`SitemapConfig::finish`] after building one by hand so the
/// values are normalized and validated the same way a loaded file is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    /// Public URL of the site root. Image URLs are `base_url/<relative path>`.
    pub base_url: String,
    /// Where the sitemap is written. Relative paths resolve against the scan root.
    pub output: PathBuf,
    /// Recognized image extensions, matched case-insensitively.
    pub extensions: Vec<String>,
    /// Source for `<lastmod>` values.
    pub timestamps: TimestampMode,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            base_url: "https://example.com".to_string(),
            output: PathBuf::from("sitemap.xml"),
            extensions: ["png", "jpg", "jpeg", "webp", "gif", "svg"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            timestamps: TimestampMode::default(),
        }
    }
}

/// Command-line values layered on top of the file config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub output: Option<PathBuf>,
    pub timestamps: Option<TimestampMode>,
}

impl SitemapConfig {
    /// Parse a config from TOML text, then normalize and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SitemapConfig = toml::from_str(content)?;
        config.finish()
    }

    /// Normalize values and validate the result.
    ///
    /// - trailing `/` is stripped from `base_url`
    /// - extensions are lowercased and lose any leading `.`
    pub fn finish(mut self) -> Result<Self, ConfigError> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        self.extensions = self
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self.extensions.sort();
        self.extensions.dedup();
        self.validate()?;
        Ok(self)
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https:// (got '{}')",
                self.base_url
            )));
        }
        if self.extensions.is_empty() || self.extensions.iter().any(|e| e.is_empty()) {
            return Err(ConfigError::Validation(
                "extensions must be a non-empty list of non-empty extensions".into(),
            ));
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::Validation("output must not be empty".into()));
        }
        if self.matches_extension(&self.output) {
            return Err(ConfigError::Validation(format!(
                "output '{}' has an image extension and would be scanned as an image",
                self.output.display()
            )));
        }
        Ok(())
    }

    /// Apply command-line overrides, re-normalizing and re-validating.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(timestamps) = overrides.timestamps {
            self.timestamps = timestamps;
        }
        self.finish()
    }

    /// Whether a path's extension is one of the recognized image extensions.
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|known| *known == ext))
    }

    /// The sitemap's destination for a given scan root.
    pub fn output_path(&self, root: &Path) -> PathBuf {
        if self.output.is_absolute() {
            self.output.clone()
        } else {
            root.join(&self.output)
        }
    }
}

/// Load `sitemap.toml` from the scan root, or the defaults if there is none.
pub fn load_config(root: &Path) -> Result<SitemapConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return SitemapConfig::default().finish();
    }
    load_config_file(&config_path)
}

/// Load an explicitly named config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<SitemapConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    SitemapConfig::from_toml_str(&content)
}

/// A documented `sitemap.toml` containing every option at its default.
pub fn stock_config_toml() -> &'static str {
    r#"# image-sitemap configuration
#
# Place this file in the directory you scan (or pass --config).
# All options are optional; the values below are the defaults.
# Unknown keys will cause an error.

# Public URL of the site root. Each image is published at
# <base_url>/<path relative to the scan root>.
base_url = "https://example.com"

# Where the sitemap is written. Relative paths resolve against the scan root.
output = "sitemap.xml"

# Files with these extensions (case-insensitive) are listed.
extensions = ["png", "jpg", "jpeg", "webp", "gif", "svg"]

# Source of <lastmod> values:
#   "git"        - committer date of the latest commit touching the file,
#                  falling back to the file's modification time
#   "filesystem" - the file's modification time only
timestamps = "git"
"#
}
