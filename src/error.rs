// src/error.rs
// =============================================================================
// Error types shared by explode, assemble and check-links.
//
// Only the failures that abort a whole operation live here. Problems that
// concern a single section, file or link (a missing section file, a broken
// URL) are logged as warnings and reported, never returned as Err.
//
// The binary wraps these in anyhow::Error, so every variant's message has
// to make sense on its own and name the offending path.
// =============================================================================

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source document passed on the command line does not exist
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The directory handed to assemble has no index.md
    #[error("index not found: {}", .0.display())]
    IndexNotFound(PathBuf),

    /// index.md exists but has no level-1 heading to use as the title
    #[error("index has no main title (level-1 heading): {}", .0.display())]
    MissingMainTitle(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
