//! File type classification by extension.
//!
//! The table below is the only place that knows about file types; adding a
//! type is a one-line edit to [`RULES`].

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Icon used for folders in listings.
pub const FOLDER_ICON: &str = "📁";

/// Icon used for files whose extension is not in the table.
pub const DEFAULT_ICON: &str = "📦";

/// MIME type used when neither the table nor the probe knows the file.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Library category shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Documents,
    Videos,
    Images,
    Presentations,
    Data,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Documents => "Documents",
            Self::Videos => "Videos",
            Self::Images => "Images",
            Self::Presentations => "Presentations",
            Self::Data => "Data",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single row of the classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Lowercase extension without the leading dot.
    pub extension: &'static str,
    pub icon: &'static str,
    pub category: Category,
    /// Declared MIME type served for this extension.
    pub mime: &'static str,
}

const fn rule(
    extension: &'static str,
    icon: &'static str,
    category: Category,
    mime: &'static str,
) -> ClassificationRule {
    ClassificationRule {
        extension,
        icon,
        category,
        mime,
    }
}

/// Known extensions.
pub const RULES: &[ClassificationRule] = &[
    rule("pdf", "📄", Category::Documents, "application/pdf"),
    rule("doc", "📝", Category::Documents, "application/msword"),
    rule(
        "docx",
        "📝",
        Category::Documents,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    rule("txt", "📄", Category::Documents, "text/plain"),
    rule("mp4", "🎬", Category::Videos, "video/mp4"),
    rule("webm", "🎬", Category::Videos, "video/webm"),
    rule("mkv", "🎬", Category::Videos, "video/x-matroska"),
    rule("avi", "🎬", Category::Videos, "video/x-msvideo"),
    rule("jpg", "🖼️", Category::Images, "image/jpeg"),
    rule("jpeg", "🖼️", Category::Images, "image/jpeg"),
    rule("png", "🖼️", Category::Images, "image/png"),
    rule("gif", "🖼️", Category::Images, "image/gif"),
    rule("svg", "🖼️", Category::Images, "image/svg+xml"),
    rule(
        "pptx",
        "🎓",
        Category::Presentations,
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    rule("ppt", "🎓", Category::Presentations, "application/vnd.ms-powerpoint"),
    rule("csv", "📊", Category::Data, "text/csv"),
    rule(
        "xlsx",
        "📊",
        Category::Data,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    rule("xls", "📊", Category::Data, "application/vnd.ms-excel"),
];

/// Classification result for a single file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTypeInfo {
    pub icon: &'static str,
    pub category: Category,
    pub mime: String,
}

/// Extension lookup over a fixed rule table.
#[derive(Debug, Clone, Copy)]
pub struct FileTypeClassifier {
    rules: &'static [ClassificationRule],
}

impl Default for FileTypeClassifier {
    fn default() -> Self {
        Self::new(RULES)
    }
}

impl FileTypeClassifier {
    /// Create a classifier over the given table.
    pub fn new(rules: &'static [ClassificationRule]) -> Self {
        Self { rules }
    }

    /// Look up the rule for a lowercase extension.
    pub fn rule_for(&self, extension: &str) -> Option<&'static ClassificationRule> {
        self.rules.iter().find(|r| r.extension == extension)
    }

    /// Classify a file by name. Always returns a value.
    pub fn classify(&self, filename: &str) -> FileTypeInfo {
        let extension = extension_of(filename);

        if let Some(rule) = self.rule_for(&extension) {
            return FileTypeInfo {
                icon: rule.icon,
                category: rule.category,
                mime: rule.mime.to_string(),
            };
        }

        FileTypeInfo {
            icon: DEFAULT_ICON,
            category: Category::Other,
            mime: mime_guess::from_path(filename)
                .first_raw()
                .unwrap_or(OCTET_STREAM)
                .to_string(),
        }
    }
}

/// Lowercase text after the last dot, or empty. Dotfiles have no extension.
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
