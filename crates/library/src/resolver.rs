//! Contained path resolution.
//!
//! Every client-supplied path goes through [`PathResolver::resolve`] before
//! the filesystem is touched for serving. Paths are canonicalized (resolving
//! `.`, `..` and symlinks) and then compared component-wise against the
//! canonical library root, so `root-other` is never mistaken for a child of
//! `root`.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{LibraryError, Result};

/// The canonical library root, established once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRoot {
    path: PathBuf,
}

impl LibraryRoot {
    /// Canonicalize and check the configured root.
    ///
    /// A missing, non-directory or unlistable root is a startup
    /// misconfiguration and is returned as an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let canonical = fs::canonicalize(path).map_err(|source| LibraryError::RootUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        let metadata = fs::metadata(&canonical).map_err(|source| LibraryError::RootUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(LibraryError::RootNotDirectory(canonical));
        }

        fs::read_dir(&canonical).map_err(|source| LibraryError::RootUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self { path: canonical })
    }

    /// The canonical root path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an already-canonical path is the root or a descendant of it.
    pub fn contains(&self, canonical: &Path) -> bool {
        canonical.starts_with(&self.path)
    }
}

/// A path accepted by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Canonical absolute path, always inside the root.
    pub path: PathBuf,
    /// Whether anything exists at `path`.
    pub exists: bool,
}

/// A path refused by the resolver.
///
/// Carries no reason: callers cannot tell an
/// escape attempt from a malformed or unreadable path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected;

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("path rejected")
    }
}

impl std::error::Error for Rejected {}

/// Resolves client paths into root-contained absolute paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: LibraryRoot,
}

impl PathResolver {
    pub fn new(root: LibraryRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &LibraryRoot {
        &self.root
    }

    /// Resolve `requested` against the library root.
    ///
    /// Empty input and input made only of separators or `.` segments
    /// resolve to the root itself. The reason for a rejection is logged at
    /// debug level and never returned.
    pub fn resolve(&self, requested: &str) -> std::result::Result<Resolution, Rejected> {
        self.try_resolve(requested).map_err(|reason| {
            debug!(reason = %reason, "rejected library path");
            Rejected
        })
    }

    fn try_resolve(&self, requested: &str) -> Result<Resolution> {
        let segments = split_segments(requested)?;

        let joined = segments
            .iter()
            .fold(self.root.path().to_path_buf(), |acc, seg| acc.join(seg));

        let resolution = match fs::canonicalize(&joined) {
            Ok(path) => Resolution { path, exists: true },
            Err(e) if e.kind() == ErrorKind::NotFound => self.resolve_missing(&segments)?,
            Err(source) => {
                return Err(LibraryError::NotReadable {
                    path: joined,
                    source,
                })
            }
        };

        if !self.root.contains(&resolution.path) {
            return Err(LibraryError::ContainmentViolation);
        }

        Ok(resolution)
    }

    /// Canonicalize the longest existing prefix, then append the rest.
    fn resolve_missing(&self, segments: &[&str]) -> Result<Resolution> {
        let mut current = self.root.path().to_path_buf();
        let mut tail: Option<PathBuf> = None;

        for seg in segments {
            if let Some(tail) = tail.as_mut() {
                if *seg == ".." {
                    return Err(LibraryError::MalformedInput(
                        "parent reference below a missing segment".to_string(),
                    ));
                }
                tail.push(seg);
                continue;
            }

            let candidate = current.join(seg);
            match fs::canonicalize(&candidate) {
                Ok(path) => current = path,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    // A dangling symlink exists but points nowhere we can check.
                    if fs::symlink_metadata(&candidate).is_ok() {
                        return Err(LibraryError::NotReadable {
                            path: candidate,
                            source: e,
                        });
                    }
                    tail = Some(PathBuf::from(seg));
                }
                Err(source) => {
                    return Err(LibraryError::NotReadable {
                        path: candidate,
                        source,
                    })
                }
            }
        }

        match tail {
            Some(tail) => Ok(Resolution {
                path: current.join(tail),
                exists: false,
            }),
            None => Ok(Resolution {
                path: current,
                exists: true,
            }),
        }
    }
}

/// Split a client path into segments, dropping empty and `.` segments.
///
/// Backslashes count as separators and leading separators are ignored, so
/// absolute-looking input is still treated as relative to the root.
fn split_segments(requested: &str) -> Result<Vec<&str>> {
    if requested.contains('\0') {
        return Err(LibraryError::MalformedInput("contains NUL byte".to_string()));
    }

    let mut segments = Vec::new();
    for seg in requested.split(['/', '\\']) {
        if seg.is_empty() || seg == "." {
            continue;
        }
        if seg != ".." && !is_plain_name(seg) {
            return Err(LibraryError::MalformedInput(format!(
                "segment is not a plain name: {seg:?}"
            )));
        }
        segments.push(seg);
    }

    if !segments.is_empty() && segments.iter().all(|s| *s == "..") {
        return Err(LibraryError::MalformedInput(
            "only parent references".to_string(),
        ));
    }

    Ok(segments)
}

/// A single normal component on this platform (rejects drive prefixes).
fn is_plain_name(seg: &str) -> bool {
    let mut components = Path::new(seg).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
