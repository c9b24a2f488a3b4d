//! Loaders for the resource files the crawler starts from.
//!
//! Missing or unreadable resources are not fatal: the loader logs a warning
//! and returns an empty collection, and the crawl simply finds nothing.

pub mod lexicon;
pub mod seeds;
pub mod stocks;

use std::path::Path;

/// Whole file contents, or `None` (with a warning) when it cannot be read.
fn read_resource(path: &Path, what: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read {what} file");
            None
        }
    }
}
