//! Immutable status entries and the context they point at.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Severity;

/// Stable reference to the location a diagnostic is about.
///
/// Holds identifiers only, never live references into the workspace model,
/// so a status can outlive the elements it describes.
///
/// # Example
///
/// ```
/// use heddle_status::ContextRef;
///
/// let context = ContextRef::element("p.A").in_document("p/A.java");
/// assert_eq!(context.element_handle(), Some("p.A"));
/// assert_eq!(context.document(), Some("p/A.java"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    document: Option<String>,
}

impl ContextRef {
    /// Creates a context pointing at an element handle.
    #[must_use]
    pub fn element(handle: impl Into<String>) -> Self {
        Self {
            element: Some(handle.into()),
            document: None,
        }
    }

    /// Creates a context pointing at a document path.
    #[must_use]
    pub fn document_only(path: impl Into<String>) -> Self {
        Self {
            element: None,
            document: Some(path.into()),
        }
    }

    /// Attaches a document path to this context.
    #[must_use]
    pub fn in_document(mut self, path: impl Into<String>) -> Self {
        self.document = Some(path.into());
        self
    }

    /// Returns the element handle, if any.
    #[must_use]
    pub fn element_handle(&self) -> Option<&str> {
        self.element.as_deref()
    }

    /// Returns the document path, if any.
    #[must_use]
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}

impl fmt::Display for ContextRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.element, &self.document) {
            (Some(element), Some(document)) => write!(f, "{element} ({document})"),
            (Some(element), None) => f.write_str(element),
            (None, Some(document)) => f.write_str(document),
            (None, None) => f.write_str("<no context>"),
        }
    }
}

/// A single diagnostic. Entries are immutable once created.
///
/// # Example
///
/// ```
/// use heddle_status::{Severity, StatusEntry};
///
/// let entry = StatusEntry::new(Severity::Error, "Type 'B' already exists")
///     .with_code(4);
/// assert_eq!(entry.severity(), Severity::Error);
/// assert_eq!(entry.code(), Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    severity: Severity,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<ContextRef>,
}

impl StatusEntry {
    /// Creates an entry without code or context.
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            context: None,
        }
    }

    /// Attaches a numeric problem code.
    #[must_use]
    pub const fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches a context reference.
    #[must_use]
    pub fn with_context(mut self, context: ContextRef) -> Self {
        self.context = Some(context);
        self
    }

    /// Severity of this entry.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Optional problem code.
    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        self.code
    }

    /// Optional context reference.
    #[must_use]
    pub const fn context(&self) -> Option<&ContextRef> {
        self.context.as_ref()
    }
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(context) = &self.context {
            write!(f, " [{context}]")?;
        }
        Ok(())
    }
}
