//! Sitemap assembly and rendering.
//!
//! [`SitemapBuilder`] ties the pipeline together:
//!
//! ```text
//! scan(root)  →  [rel path]  →  ImageEntry { loc, lastmod, caption }  →  XML  →  output file
//! ```
//!
//! Every image becomes its own `<url>` whose `<loc>` is the image URL, with a
//! nested `<image:image>` block from the Google image sitemap extension:
//!
//! ```xml
//! <url>
//!   <loc>https://example.com/photos/sunset%20beach.jpg</loc>
//!   <lastmod>2024-03-02T18:04:11+01:00</lastmod>
//!   <image:image>
//!     <image:loc>https://example.com/photos/sunset%20beach.jpg</image:loc>
//!     <image:caption>sunset beach.jpg</image:caption>
//!   </image:image>
//! </url>
//! ```
//!
//! All element text goes through `quick_xml::escape`, so file names containing
//! `&` or `<` still produce a well-formed document.
//!
//! Paths are carried as raw [`PathBuf`]s end to end. A file name that is not
//! valid UTF-8 is still stat-ed and queried under its real name; only the
//! display path and caption are lossy, and its URL is percent-encoded from the
//! raw bytes.

use crate::config::SitemapConfig;
use crate::scan::{self, ScanError};
use crate::timestamp::{TimestampError, TimestampResolver};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};
use quick_xml::escape::escape;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";

/// Everything except unreserved characters and the path separator.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Timestamp error: {0}")]
    Timestamp(#[from] TimestampError),
}

/// One image listed in the sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Path relative to the scan root, as found on disk.
    pub path: PathBuf,
    /// `/`-separated display form of `path`.
    pub rel_path: String,
    /// Public, percent-encoded URL of the image.
    pub loc: String,
    /// ISO-8601 last-modified timestamp.
    pub lastmod: String,
    /// Base file name, used as the image caption.
    pub caption: String,
}

/// Result of writing a sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateResult {
    /// Where the document was written.
    pub output: PathBuf,
    /// Number of `<url>` entries written.
    pub count: usize,
}

/// Builds the sitemap for one scan root.
pub struct SitemapBuilder {
    root: PathBuf,
    config: SitemapConfig,
    resolver: TimestampResolver,
}

impl SitemapBuilder {
    /// Builder using the timestamp chain selected by `config.timestamps`.
    pub fn new(root: impl Into<PathBuf>, config: SitemapConfig) -> Self {
        let resolver = TimestampResolver::for_mode(config.timestamps);
        Self {
            root: root.into(),
            config,
            resolver,
        }
    }

    /// Replace the timestamp chain.
    pub fn with_resolver(mut self, resolver: TimestampResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Scan the root and resolve every image into an entry, sorted by path.
    pub fn entries(&self) -> Result<Vec<ImageEntry>, SitemapError> {
        let paths = scan::scan(&self.root, &self.config)?;
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let lastmod = self.resolver.resolve(&self.root, &path)?;
            entries.push(ImageEntry {
                rel_path: scan::to_slash_path(&path),
                loc: image_url(&self.config.base_url, &path),
                caption: caption_for(&path),
                lastmod,
                path,
            });
        }
        Ok(entries)
    }

    /// Build the complete sitemap document.
    pub fn build(&self) -> Result<String, SitemapError> {
        Ok(render(&self.entries()?))
    }

    /// Build the sitemap and write it to the configured output, replacing
    /// any existing file.
    pub fn write(&self) -> Result<GenerateResult, SitemapError> {
        let entries = self.entries()?;
        let output = self.config.output_path(&self.root);
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output, render(&entries))?;
        log::info!("Wrote {} entries to {}", entries.len(), output.display());
        Ok(GenerateResult {
            output,
            count: entries.len(),
        })
    }
}

/// Public URL for an image: `base_url/<percent-encoded rel_path>`.
///
/// Components are joined with `/` whatever the platform separator, and each
/// is encoded from its raw bytes so non-UTF-8 names keep a distinct URL.
pub fn image_url(base_url: &str, rel_path: &Path) -> String {
    let mut bytes = Vec::new();
    for (i, component) in rel_path.components().enumerate() {
        if i > 0 {
            bytes.push(b'/');
        }
        bytes.extend_from_slice(component.as_os_str().as_encoded_bytes());
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        percent_encode(&bytes, PATH_ENCODE_SET)
    )
}

fn caption_for(rel_path: &Path) -> String {
    rel_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Render entries into a complete sitemap document.
///
/// Entries are written in the order given.
pub fn render(entries: &[ImageEntry]) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<urlset xmlns=\"{SITEMAP_NS}\"");
    let _ = writeln!(xml, "        xmlns:image=\"{IMAGE_NS}\">");
    for entry in entries {
        let loc = escape(entry.loc.as_str());
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{loc}</loc>");
        let _ = writeln!(xml, "    <lastmod>{}</lastmod>", escape(entry.lastmod.as_str()));
        xml.push_str("    <image:image>\n");
        let _ = writeln!(xml, "      <image:loc>{loc}</image:loc>");
        let _ = writeln!(
            xml,
            "      <image:caption>{}</image:caption>",
            escape(entry.caption.as_str())
        );
        xml.push_str("    </image:image>\n");
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}
