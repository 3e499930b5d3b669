//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.
//!
//! ## Generate
//!
//! ```text
//! Generated sitemap.xml with 12 image(s).
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 a.png
//!     URL: https://example.com/a.png
//!     Lastmod: 2024-03-02T18:04:11+01:00
//! 002 sub/b.JPG
//!     URL: https://example.com/sub/b.JPG
//!     Lastmod: 2024-02-11T08:00:00Z
//!
//! Found 2 image(s)
//! ```

use crate::sitemap::{GenerateResult, ImageEntry};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

pub fn format_generate_output(result: &GenerateResult) -> Vec<String> {
    vec![format!(
        "Generated {} with {} image(s).",
        result.output.display(),
        result.count
    )]
}

pub fn print_generate_output(result: &GenerateResult) {
    for line in format_generate_output(result) {
        println!("{}", line);
    }
}

pub fn format_check_output(entries: &[ImageEntry]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.rel_path));
        lines.push(format!("    URL: {}", entry.loc));
        lines.push(format!("    Lastmod: {}", entry.lastmod));
    }
    if !entries.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!("Found {} image(s)", entries.len()));
    lines
}

pub fn print_check_output(entries: &[ImageEntry]) {
    for line in format_check_output(entries) {
        println!("{}", line);
    }
}
