use heddle_status::Severity;

use crate::logging::LogFormat;

/// Default log filter expression: dependencies log warnings only, while the
/// engine's own targets log at `info`.
pub const DEFAULT_LOG_FILTER: &str = "warn,heddle_core=info,heddle_refactorings=info";

/// Default number of undo entries retained before the oldest is dropped.
pub const DEFAULT_UNDO_LIMIT: usize = 50;

/// Environment variable overriding the log filter.
pub const LOG_FILTER_ENV: &str = "HEDDLE_LOG_FILTER";

/// Environment variable overriding the log format.
pub const LOG_FORMAT_ENV: &str = "HEDDLE_LOG_FORMAT";

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Lowest severity that stops a refactoring from being applied.
#[must_use]
pub const fn default_failure_severity() -> Severity {
    Severity::Error
}

/// Default undo stack bound.
#[must_use]
pub const fn default_undo_limit() -> usize {
    DEFAULT_UNDO_LIMIT
}

/// Changes are validated against the store before they are performed.
#[must_use]
pub const fn default_validate_changes() -> bool {
    true
}
