//! # Edulib Library Manager
//!
//! This crate exposes a directory of educational material as a typed tree
//! and resolves client-supplied paths without letting them leave the
//! library root.
//!
//! ## Overview
//!
//! - **Path Resolution**: canonicalize client paths and reject anything that
//!   lands outside the root
//! - **Classification**: icon, category and MIME type by file extension
//! - **Tree Building**: ordered recursive listing with human-readable sizes
//! - **Library Manager**: the two operations the HTTP layer calls
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              LibraryManager              │  list / resolve for serving
//! ├────────────────────┬─────────────────────┤
//! │    TreeBuilder     │ FileTypeClassifier  │  recursive walk, lookup table
//! ├────────────────────┴─────────────────────┤
//! │       PathResolver  (LibraryRoot)        │  canonicalize + containment
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use library::{LibraryManager, LibraryOptions, ServeOutcome};
//!
//! let manager = LibraryManager::open("/srv/library", LibraryOptions::default())?;
//!
//! for entry in manager.list_library() {
//!     println!("{} {}", entry.icon(), entry.name());
//! }
//!
//! match manager.resolve_for_serving("Math/algebra.txt") {
//!     ServeOutcome::File(file) => println!("{} ({})", file.path.display(), file.mime),
//!     ServeOutcome::NotFound => println!("not found"),
//!     ServeOutcome::Invalid => println!("not a file"),
//! }
//! # Ok::<(), library::LibraryError>(())
//! ```
//!
//! ## Modules
//!
//! - [`resolver`]: library root and contained path resolution
//! - [`classify`]: extension lookup table
//! - [`tree`]: listing entries and the recursive builder
//! - [`manager`]: façade used by the server
//! - [`size`]: byte count formatting
//! - [`error`]: error types

pub mod classify;
pub mod error;
pub mod manager;
pub mod resolver;
pub mod size;
pub mod tree;

pub use classify::{Category, ClassificationRule, FileTypeClassifier, FileTypeInfo, RULES};
pub use error::{LibraryError, Result};
pub use manager::{LibraryManager, LibraryOptions, ServeOutcome, ServedFile};
pub use resolver::{LibraryRoot, PathResolver, Rejected, Resolution};
pub use size::format_size;
pub use tree::{Entry, FileEntry, FolderEntry, TreeBuilder, DEFAULT_MAX_DEPTH};
