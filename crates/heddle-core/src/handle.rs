//! Stable identifiers for documents and program elements.
//!
//! Changes, statuses and participant notifications refer to the workspace
//! through these identifiers rather than through live references, so they
//! remain meaningful after the workspace has moved on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Workspace-relative path of a document, using `/` separators.
///
/// # Example
///
/// ```
/// use heddle_core::DocumentPath;
///
/// let path = DocumentPath::new("p/q/A.java");
/// assert_eq!(path.parent(), "p/q");
/// assert_eq!(path.file_name(), "A.java");
/// assert_eq!(path.file_stem(), "A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentPath(String);

impl DocumentPath {
    /// Creates a path from any string-like value.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0
            .rsplit_once('/')
            .map_or(self.0.as_str(), |(_, name)| name)
    }

    /// Everything before the final segment, or an empty string at the root.
    #[must_use]
    pub fn parent(&self) -> &str {
        self.0.rsplit_once('/').map_or("", |(parent, _)| parent)
    }

    /// File name without its extension.
    #[must_use]
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        name.rsplit_once('.').map_or(name, |(stem, _)| stem)
    }

    /// Joins a file name onto a directory path.
    #[must_use]
    pub fn join(directory: &str, file_name: &str) -> Self {
        if directory.is_empty() {
            Self::new(file_name)
        } else {
            Self(format!("{directory}/{file_name}"))
        }
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentPath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DocumentPath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for DocumentPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque, serialisable reference to a program element such as a type,
/// method or field.
///
/// Handles are compared by value. A refactoring chooses the handle format;
/// the reference refactorings use dotted qualified names such as `p.A.f`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(String);

impl ElementHandle {
    /// Creates a handle.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Returns the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementHandle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ElementHandle {
    fn from(value: String) -> Self {
        Self(value)
    }
}
