//! The mergeable status value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ContextRef, Severity, StatusEntry};

/// Ordered log of [`StatusEntry`] values with a derived aggregate severity.
///
/// The aggregate is recomputed on every query, so it can never go stale.
/// Statuses are merged, never replaced, as the pipeline advances.
///
/// # Example
///
/// ```
/// use heddle_status::{Severity, Status};
///
/// let mut initial = Status::ok();
/// initial.add_warning("first");
/// let mut fin = Status::warning("second");
/// fin.add_error("collision");
///
/// initial.merge(fin);
/// assert_eq!(initial.len(), 3);
/// assert_eq!(initial.severity(), Severity::Error);
/// assert_eq!(
///     initial.entry_matching(Severity::Warning).map(|e| e.message()),
///     Some("first"),
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status {
    entries: Vec<StatusEntry>,
}

impl Status {
    /// Creates an empty status with severity [`Severity::Ok`].
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a status holding one entry at the given severity.
    #[must_use]
    pub fn with_entry(severity: Severity, message: impl Into<String>) -> Self {
        let mut status = Self::ok();
        status.add(severity, message, None, None);
        status
    }

    /// Creates a status holding one warning.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_entry(Severity::Warning, message)
    }

    /// Creates a status holding one error.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_entry(Severity::Error, message)
    }

    /// Creates a status holding one fatal error.
    #[must_use]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::with_entry(Severity::Fatal, message)
    }

    /// Appends an entry. The aggregate severity never decreases.
    pub fn add(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        code: Option<i32>,
        context: Option<ContextRef>,
    ) {
        let mut entry = StatusEntry::new(severity, message);
        if let Some(code) = code {
            entry = entry.with_code(code);
        }
        if let Some(context) = context {
            entry = entry.with_context(context);
        }
        self.entries.push(entry);
    }

    /// Appends a prebuilt entry.
    pub fn push(&mut self, entry: StatusEntry) {
        self.entries.push(entry);
    }

    /// Appends a warning.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.add(Severity::Warning, message, None, None);
    }

    /// Appends an error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.add(Severity::Error, message, None, None);
    }

    /// Appends a fatal error.
    pub fn add_fatal(&mut self, message: impl Into<String>) {
        self.add(Severity::Fatal, message, None, None);
    }

    /// Appends every entry of `other` after this status's own entries.
    ///
    /// The resulting severity is `max(self.severity(), other.severity())`.
    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Returns a new status holding `self`'s entries followed by `other`'s.
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        self.merge(other);
        self
    }

    /// Aggregate severity: the maximum over all entries, `Ok` when empty.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.entries
            .iter()
            .map(StatusEntry::severity)
            .max()
            .unwrap_or_default()
    }

    /// Returns `true` when nothing blocks the refactoring (severity at most
    /// [`Severity::Warning`]).
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.severity().permits_application()
    }

    /// Returns `true` when the severity is at least [`Severity::Warning`].
    #[must_use]
    pub fn has_warning(&self) -> bool {
        self.severity() >= Severity::Warning
    }

    /// Returns `true` when the severity is at least [`Severity::Error`].
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.severity() >= Severity::Error
    }

    /// Returns `true` when the severity is [`Severity::Fatal`].
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// First entry recorded at exactly `severity`.
    #[must_use]
    pub fn entry_matching(&self, severity: Severity) -> Option<&StatusEntry> {
        self.entries.iter().find(|entry| entry.severity() == severity)
    }

    /// Message of the first entry recorded at exactly `severity`.
    #[must_use]
    pub fn message_matching(&self, severity: Severity) -> Option<&str> {
        self.entry_matching(severity).map(StatusEntry::message)
    }

    /// First entry at the aggregate severity, `None` for an empty status.
    #[must_use]
    pub fn highest_severity_entry(&self) -> Option<&StatusEntry> {
        self.entry_matching(self.severity())
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no entries were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<StatusEntry> for Status {
    fn from(entry: StatusEntry) -> Self {
        Self {
            entries: vec![entry],
        }
    }
}

impl FromIterator<StatusEntry> for Status {
    fn from_iter<I: IntoIterator<Item = StatusEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<StatusEntry> for Status {
    fn extend<I: IntoIterator<Item = StatusEntry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.highest_severity_entry() {
            Some(entry) => write!(f, "{}: {}", entry.severity(), entry.message()),
            None => f.write_str(Severity::Ok.as_str()),
        }
    }
}
