//! The four-level severity lattice.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a single diagnostic, totally ordered `Ok < Warning < Error < Fatal`.
///
/// # Example
///
/// ```
/// use heddle_status::Severity;
///
/// assert!(Severity::Warning < Severity::Error);
/// assert_eq!(Severity::Ok.max(Severity::Fatal), Severity::Fatal);
/// assert!(Severity::Warning.permits_application());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// No issue.
    #[default]
    Ok,
    /// The refactoring proceeds but the caller should be informed.
    Warning,
    /// The refactoring must not be applied.
    Error,
    /// The pipeline halts; no further checks run and no change is created.
    Fatal,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Self; 4] = [Self::Ok, Self::Warning, Self::Error, Self::Fatal];

    /// Returns the canonical upper-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }

    /// Returns `true` when a status at this severity still allows a change to
    /// be applied.
    #[must_use]
    pub const fn permits_application(self) -> bool {
        matches!(self, Self::Ok | Self::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
