//! Library manager façade consumed by the serving layer.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::classify::FileTypeClassifier;
use crate::error::Result;
use crate::resolver::{LibraryRoot, PathResolver};
use crate::tree::{Entry, TreeBuilder, DEFAULT_MAX_DEPTH};

/// Subject folders created by [`LibraryManager::seed_sample_library`].
pub const SAMPLE_SUBJECTS: &[&str] = &["Mathematics", "Science", "History", "Languages", "Technology"];

/// Number of sample files written per subject folder.
pub const SAMPLE_FILES_PER_SUBJECT: usize = 2;

/// Construction options for [`LibraryManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryOptions {
    /// Folder levels expanded by [`LibraryManager::list_library`].
    pub max_depth: usize,
    /// Create the root directory (and parents) if it does not exist.
    pub create_missing: bool,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            create_missing: false,
        }
    }
}

/// A regular file ready to be streamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedFile {
    /// Canonical path inside the library root.
    pub path: PathBuf,
    /// Declared MIME type from the classifier.
    pub mime: String,
    /// Size in bytes at resolution time.
    pub size: u64,
}

/// Result of resolving a client path for serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeOutcome {
    /// A readable regular file inside the library.
    File(ServedFile),
    /// Rejected, missing or unreadable. Callers must not distinguish these.
    NotFound,
    /// Exists inside the library but is not a regular file.
    Invalid,
}

/// Read-only access to the library tree.
///
/// Holds only immutable configuration, so one instance can be shared across
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct LibraryManager {
    resolver: PathResolver,
    builder: TreeBuilder,
    classifier: FileTypeClassifier,
}

impl LibraryManager {
    /// Open the library at `root`.
    ///
    /// Fails if the root is missing (and `create_missing` is off), is not a
    /// directory, or cannot be listed.
    pub fn open<P: AsRef<Path>>(root: P, options: LibraryOptions) -> Result<Self> {
        let root = root.as_ref();

        if options.create_missing && !root.exists() {
            info!("Creating library root at {:?}", root);
            fs::create_dir_all(root)?;
        }

        let root = LibraryRoot::open(root)?;
        let classifier = FileTypeClassifier::default();
        let resolver = PathResolver::new(root);
        let builder = TreeBuilder::new(resolver.clone(), classifier).max_depth(options.max_depth);

        Ok(Self {
            resolver,
            builder,
            classifier,
        })
    }

    /// The canonical library root.
    pub fn root(&self) -> &Path {
        self.resolver.root().path()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// The full tree rooted at the library root.
    pub fn list_library(&self) -> Vec<Entry> {
        self.builder.build("")
    }

    /// Resolve a client path to something the serving layer can stream.
    pub fn resolve_for_serving(&self, requested: &str) -> ServeOutcome {
        let Ok(resolution) = self.resolver.resolve(requested) else {
            return ServeOutcome::NotFound;
        };
        if !resolution.exists {
            return ServeOutcome::NotFound;
        }

        let metadata = match fs::metadata(&resolution.path) {
            Ok(m) => m,
            Err(e) => {
                debug!(error = %e, "cannot stat resolved library path");
                return ServeOutcome::NotFound;
            }
        };

        if !metadata.is_file() {
            return ServeOutcome::Invalid;
        }

        let name = resolution
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        ServeOutcome::File(ServedFile {
            mime: self.classifier.classify(&name).mime,
            size: metadata.len(),
            path: resolution.path,
        })
    }

    /// Create the sample subject folders with placeholder text files.
    ///
    /// Existing files are left as they are. Returns the number of files
    /// written.
    pub fn seed_sample_library(&self) -> Result<usize> {
        let mut written = 0;

        for subject in SAMPLE_SUBJECTS {
            let dir = self.root().join(subject);
            fs::create_dir_all(&dir)?;

            for n in 1..=SAMPLE_FILES_PER_SUBJECT {
                let file = dir.join(format!("Sample_{n}.txt"));
                if file.exists() {
                    continue;
                }
                fs::write(
                    &file,
                    format!("Sample educational material for {subject}\nFile {n}"),
                )?;
                written += 1;
            }
        }

        info!("Sample library written to {:?} ({} files)", self.root(), written);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LibraryError;
    use tempfile::TempDir;

    fn open(root: &Path) -> LibraryManager {
        LibraryManager::open(root, LibraryOptions::default()).unwrap()
    }

    #[test]
    fn test_open_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = LibraryManager::open(temp_dir.path().join("nope"), LibraryOptions::default());
        assert!(matches!(result, Err(LibraryError::RootUnavailable { .. })));
    }

    #[test]
    fn test_open_creates_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("nested/library");
        let options = LibraryOptions {
            create_missing: true,
            ..LibraryOptions::default()
        };

        let manager = LibraryManager::open(&root, options).unwrap();
        assert!(root.is_dir());
        assert!(manager.list_library().is_empty());
    }

    #[test]
    fn test_resolve_for_serving_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("slides.pptx"), "deck").unwrap();

        let manager = open(temp_dir.path());
        match manager.resolve_for_serving("slides.pptx") {
            ServeOutcome::File(file) => {
                assert_eq!(file.path, manager.root().join("slides.pptx"));
                assert_eq!(file.size, 4);
                assert!(file.mime.contains("presentationml"));
            }
            other => panic!("expected file, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_for_serving_directory_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("Math")).unwrap();

        let manager = open(temp_dir.path());
        assert_eq!(manager.resolve_for_serving("Math"), ServeOutcome::Invalid);
        assert_eq!(manager.resolve_for_serving(""), ServeOutcome::Invalid);
    }

    #[test]
    fn test_resolve_for_serving_missing_and_escape_look_the_same() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("library");
        fs::create_dir(&root).unwrap();
        fs::write(temp_dir.path().join("secret.txt"), "secret").unwrap();

        let manager = open(&root);
        assert_eq!(manager.resolve_for_serving("missing.txt"), ServeOutcome::NotFound);
        assert_eq!(manager.resolve_for_serving("../secret.txt"), ServeOutcome::NotFound);
        assert_eq!(manager.resolve_for_serving(".."), ServeOutcome::NotFound);
    }

    #[test]
    fn test_unknown_extension_served_with_fallback_mime() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("blob.unknownext"), [0u8, 1, 2]).unwrap();

        let manager = open(temp_dir.path());
        match manager.resolve_for_serving("blob.unknownext") {
            ServeOutcome::File(file) => assert_eq!(file.mime, "application/octet-stream"),
            other => panic!("expected file, got {other:?}"),
        }
    }

    #[test]
    fn test_seed_sample_library() {
        let temp_dir = TempDir::new().unwrap();
        let manager = open(temp_dir.path());

        let written = manager.seed_sample_library().unwrap();
        assert_eq!(written, SAMPLE_SUBJECTS.len() * SAMPLE_FILES_PER_SUBJECT);

        let content = fs::read_to_string(manager.root().join("History/Sample_2.txt")).unwrap();
        assert_eq!(content, "Sample educational material for History\nFile 2");

        let entries = manager.list_library();
        let names: Vec<&str> = entries.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["History", "Languages", "Mathematics", "Science", "Technology"]
        );
        assert_eq!(entries[0].children().len(), SAMPLE_FILES_PER_SUBJECT);
    }

    #[test]
    fn test_seed_keeps_existing_files() {
        let temp_dir = TempDir::new().unwrap();
        let manager = open(temp_dir.path());
        fs::create_dir(manager.root().join("Science")).unwrap();
        fs::write(manager.root().join("Science/Sample_1.txt"), "mine").unwrap();

        let written = manager.seed_sample_library().unwrap();
        assert_eq!(written, SAMPLE_SUBJECTS.len() * SAMPLE_FILES_PER_SUBJECT - 1);
        assert_eq!(
            fs::read_to_string(manager.root().join("Science/Sample_1.txt")).unwrap(),
            "mine"
        );

        assert_eq!(manager.seed_sample_library().unwrap(), 0);
    }
}
