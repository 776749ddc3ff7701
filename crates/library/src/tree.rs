//! Recursive library listing.
//!
//! [`TreeBuilder`] walks the library root and produces an ordered, nested
//! sequence of [`Entry`] values. Unreadable subtrees and entries are left out
//! rather than failing the whole listing, and every child location is
//! re-checked for containment before it is listed or descended into.
//!
//! Symlinks are followed only when their canonical target is inside the root
//! and is not already an ancestor of the current directory. A symlinked
//! folder whose target was already expanded during the same scan is listed
//! with no children, so links fanning into one directory cost one walk.
//! Independently of that, descent stops after a configurable number of
//! folder levels.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classify::{Category, FileTypeClassifier, FOLDER_ICON};
use crate::resolver::PathResolver;
use crate::size::format_size;

/// Default number of folder levels expanded below the listing start.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// A single node of the library listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    Folder(FolderEntry),
    File(FileEntry),
}

/// A folder and its ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    /// Base name.
    pub name: String,
    /// Slash-separated path from the library root.
    pub path: String,
    pub icon: String,
    /// Folders first, then files, by case-insensitive name.
    pub children: Vec<Entry>,
}

/// A regular file with classification and size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Base name.
    pub name: String,
    /// Slash-separated path from the library root.
    pub path: String,
    pub icon: String,
    pub category: Category,
    /// Size in bytes.
    pub size: u64,
    /// Size formatted with binary units, e.g. `1.5 KB`.
    pub size_human: String,
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Self::Folder(f) => &f.name,
            Self::File(f) => &f.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Folder(f) => &f.path,
            Self::File(f) => &f.path,
        }
    }

    pub fn icon(&self) -> &str {
        match self {
            Self::Folder(f) => &f.icon,
            Self::File(f) => &f.icon,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    /// Children of a folder; empty for files.
    pub fn children(&self) -> &[Entry] {
        match self {
            Self::Folder(f) => &f.children,
            Self::File(_) => &[],
        }
    }

    /// Sibling order: folders before files, then case-insensitive name.
    ///
    /// Names equal ignoring case fall back to a byte comparison so the order
    /// is total.
    pub fn listing_order(&self, other: &Self) -> Ordering {
        other
            .is_folder()
            .cmp(&self.is_folder())
            .then_with(|| self.name().to_lowercase().cmp(&other.name().to_lowercase()))
            .then_with(|| self.name().cmp(other.name()))
    }
}

/// Outcome of reading one directory.
#[derive(Debug)]
enum DirScan {
    Listed(Vec<fs::DirEntry>),
    Missing,
    Unreadable(std::io::Error),
}

/// Entries come back sorted by name so symlink expansion is deterministic.
fn scan_dir(dir: &Path) -> DirScan {
    match fs::read_dir(dir) {
        Ok(entries) => {
            let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
            entries.sort_by_key(|e| {
                let name = e.file_name();
                (name.to_string_lossy().to_lowercase(), name)
            });
            DirScan::Listed(entries)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => DirScan::Missing,
        Err(e) => DirScan::Unreadable(e),
    }
}

/// Traversal state for a single [`TreeBuilder::build`] call.
#[derive(Debug, Default)]
struct ScanState {
    /// Canonical folders on the path from the start to the current folder.
    ancestors: Vec<PathBuf>,
    /// Canonical folders expanded so far.
    expanded: HashSet<PathBuf>,
}

/// Builds ordered library listings.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    resolver: PathResolver,
    classifier: FileTypeClassifier,
    max_depth: usize,
}

impl TreeBuilder {
    pub fn new(resolver: PathResolver, classifier: FileTypeClassifier) -> Self {
        Self {
            resolver,
            classifier,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set how many folder levels below the start are expanded.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// List `relative` (empty for the root) recursively.
    ///
    /// A rejected, missing or unreadable start directory yields an empty
    /// listing, as does a start path naming something other than a folder.
    pub fn build(&self, relative: &str) -> Vec<Entry> {
        let Ok(resolution) = self.resolver.resolve(relative) else {
            return Vec::new();
        };
        if !resolution.exists || !resolution.path.is_dir() {
            debug!("listing start is not an existing folder");
            return Vec::new();
        }

        let rel = self.public_path(&resolution.path);
        let mut state = ScanState::default();
        state.ancestors.push(resolution.path.clone());
        state.expanded.insert(resolution.path.clone());
        self.walk(&resolution.path, &rel, &mut state, 0)
    }

    /// Slash-separated path of a canonical location relative to the root.
    fn public_path(&self, canonical: &Path) -> String {
        canonical
            .strip_prefix(self.resolver.root().path())
            .map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default()
    }

    fn walk(
        &self,
        dir: &Path,
        rel: &str,
        state: &mut ScanState,
        depth: usize,
    ) -> Vec<Entry> {
        let dir_entries = match scan_dir(dir) {
            DirScan::Listed(entries) => entries,
            DirScan::Missing => {
                debug!(path = %dir.display(), "directory vanished during scan");
                return Vec::new();
            }
            DirScan::Unreadable(e) => {
                warn!(path = %dir.display(), error = %e, "skipping unreadable directory");
                return Vec::new();
            }
        };

        let mut items = Vec::with_capacity(dir_entries.len());

        for dir_entry in dir_entries {
            let Ok(name) = dir_entry.file_name().into_string() else {
                debug!(path = %dir_entry.path().display(), "skipping non-UTF-8 name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let child_rel = if rel.is_empty() {
                name.clone()
            } else {
                format!("{rel}/{name}")
            };

            let Some((canonical, metadata)) = self.inspect(&dir_entry) else {
                continue;
            };

            if metadata.is_dir() {
                if state.ancestors.contains(&canonical) {
                    debug!(path = %child_rel, "skipping symlink cycle");
                    continue;
                }

                let is_link = dir_entry.file_type().is_ok_and(|t| t.is_symlink());

                let children = if is_link && state.expanded.contains(&canonical) {
                    debug!(path = %child_rel, "symlinked folder already listed");
                    Vec::new()
                } else if depth + 1 > self.max_depth {
                    warn!(path = %child_rel, max_depth = self.max_depth, "listing depth limit reached");
                    Vec::new()
                } else {
                    state.expanded.insert(canonical.clone());
                    state.ancestors.push(canonical.clone());
                    let children = self.walk(&canonical, &child_rel, state, depth + 1);
                    state.ancestors.pop();
                    children
                };

                items.push(Entry::Folder(FolderEntry {
                    name,
                    path: child_rel,
                    icon: FOLDER_ICON.to_string(),
                    children,
                }));
            } else if metadata.is_file() {
                let info = self.classifier.classify(&name);
                let size = metadata.len();
                items.push(Entry::File(FileEntry {
                    name,
                    path: child_rel,
                    icon: info.icon.to_string(),
                    category: info.category,
                    size,
                    size_human: format_size(size),
                }));
            }
        }

        items.sort_by(Entry::listing_order);
        items
    }

    /// Canonical location and target metadata of a directory entry, or
    /// `None` if it cannot be read or lies outside the root.
    fn inspect(&self, dir_entry: &fs::DirEntry) -> Option<(PathBuf, fs::Metadata)> {
        let path = dir_entry.path();

        let canonical = match fs::canonicalize(&path) {
            Ok(p) => p,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unresolvable entry");
                return None;
            }
        };

        if !self.resolver.root().contains(&canonical) {
            debug!(path = %path.display(), "skipping entry that resolves outside the library");
            return None;
        }

        match fs::metadata(&canonical) {
            Ok(metadata) => Some((canonical, metadata)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping entry that cannot be stat'd");
                None
            }
        }
    }
}
