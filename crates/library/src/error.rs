//! Error types for the library crate.

use std::path::PathBuf;

use thiserror::Error;

/// Library error type covering every failure mode of the library manager.
///
/// Per-request conditions (`ContainmentViolation`, `NotReadable`,
/// `MalformedInput`) never reach HTTP clients as distinct signals; they are
/// collapsed into "not found" by [`crate::LibraryManager::resolve_for_serving`].
#[derive(Debug, Error)]
pub enum LibraryError {
    // Per-request conditions
    /// Requested path canonicalizes outside the library root.
    #[error("path escapes the library root")]
    ContainmentViolation,

    /// A file or directory could not be stat'd or listed.
    #[error("not readable: {path}: {source}")]
    NotReadable {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Requested path is empty of real segments or syntactically invalid.
    #[error("malformed path: {0}")]
    MalformedInput(String),

    // Startup conditions
    /// The library root is missing or cannot be canonicalized.
    #[error("library root unavailable: {path}: {source}")]
    RootUnavailable {
        /// Configured root path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The library root exists but is not a directory.
    #[error("library root is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    /// Other I/O failure (sample library seeding).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, LibraryError>;
