//! # Image Sitemap
//!
//! Generates an XML sitemap, with the image extension, for every image in a
//! static site's directory tree. Search engines use it to discover images
//! and to decide when to re-crawl them.
//!
//! # Pipeline
//!
//! One linear pass, no state carried between runs:
//!
//! ```text
//! 1. Scan       root/        →  sorted relative paths   (extension filter, hidden dirs skipped)
//! 2. Timestamp  each path    →  ISO-8601 lastmod        (git history, else file mtime)
//! 3. Render     entries      →  sitemap.xml             (fully regenerated every run)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `sitemap.toml` loading, validation, CLI overrides |
//! | [`scan`] | Walks the root and yields image paths |
//! | [`timestamp`] | `TimestampSource` trait, git and filesystem sources, fallback chain |
//! | [`sitemap`] | `SitemapBuilder`, URL encoding, XML rendering and writing |
//! | [`output`] | CLI output formatting |
//!
//! # Determinism
//!
//! Entries are ordered by relative path, and both timestamp sources are pure
//! functions of the tree and its history, so an unchanged tree yields a
//! byte-identical sitemap.

pub mod config;
pub mod output;
pub mod scan;
pub mod sitemap;
pub mod timestamp;

pub use config::SitemapConfig;
pub use sitemap::{GenerateResult, ImageEntry, SitemapBuilder};
pub use timestamp::{TimestampResolver, TimestampSource};

#[cfg(test)]
pub(crate) mod test_helpers;
