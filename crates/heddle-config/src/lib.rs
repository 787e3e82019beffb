//! Shared configuration for the heddle refactoring engine.
//!
//! [`EngineConfig`] carries the knobs the execution protocol consults: the
//! severity at which a refactoring is refused, the undo stack bound, whether
//! changes are validated against the store before they run, and whether
//! refactorings are reconstructed from their descriptors before execution.
//! Logging settings feed the telemetry subscriber in `heddle-core`.
//!
//! Configuration files may be TOML or JSON; the format is chosen from the
//! file extension. Environment variables override the logging keys.

mod defaults;
mod logging;

use std::fs;
use std::path::{Path, PathBuf};

use heddle_status::Severity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_UNDO_LIMIT, LOG_FILTER_ENV, LOG_FORMAT_ENV,
    default_failure_severity, default_log_filter, default_log_filter_string, default_log_format,
    default_undo_limit, default_validate_changes,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not name a supported format.
    #[error("unsupported configuration format for {path}; expected .toml or .json")]
    UnsupportedFormat {
        /// Offending path.
        path: PathBuf,
    },

    /// TOML content failed to parse.
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON content failed to parse.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A value parsed but violates a constraint.
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key.
        key: &'static str,
        /// Description of the violation.
        message: String,
    },
}

/// Engine configuration.
///
/// # Defaults
///
/// - `log_filter`: `warn,heddle_core=info,heddle_refactorings=info`
/// - `log_format`: `json`
/// - `failure_severity`: `error`
/// - `undo_limit`: 50
/// - `descriptor_round_trip`: `false`
/// - `validate_changes`: `true`
///
/// # Example
///
/// ```
/// use heddle_config::EngineConfig;
/// use heddle_status::Severity;
///
/// let config = EngineConfig::from_toml_str("undo_limit = 5\n").expect("valid config");
/// assert_eq!(config.undo_limit(), 5);
/// assert_eq!(config.failure_severity(), Severity::Error);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    log_filter: String,
    log_format: LogFormat,
    failure_severity: Severity,
    undo_limit: usize,
    descriptor_round_trip: bool,
    validate_changes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            failure_severity: default_failure_severity(),
            undo_limit: default_undo_limit(),
            descriptor_round_trip: false,
            validate_changes: default_validate_changes(),
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] when parsing fails and
    /// [`ConfigError::InvalidValue`] when a value is out of range.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] when parsing fails and
    /// [`ConfigError::InvalidValue`] when a value is out of range.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()
    }

    /// Loads a configuration file, choosing the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read,
    /// [`ConfigError::UnsupportedFormat`] for unknown extensions, or a parse
    /// error for malformed content.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let extension = path.extension().and_then(|ext| ext.to_str());
        let parse: fn(&str) -> Result<Self, ConfigError> = match extension {
            Some("toml") => Self::from_toml_str,
            Some("json") => Self::from_json_str,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&content)
    }

    /// Applies `HEDDLE_LOG_FILTER` and `HEDDLE_LOG_FORMAT` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the format override does not
    /// name a known [`LogFormat`].
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies logging overrides from an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the format override does not
    /// name a known [`LogFormat`].
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup(LOG_FILTER_ENV) {
            self.log_filter = filter;
        }
        if let Some(raw) = lookup(LOG_FORMAT_ENV) {
            self.log_format = raw.parse().map_err(|err: LogFormatParseError| {
                ConfigError::InvalidValue {
                    key: "log_format",
                    message: format!("'{raw}': {err}"),
                }
            })?;
        }
        Ok(self)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.undo_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "undo_limit",
                message: String::from("must be at least 1"),
            });
        }
        check_failure_severity(self.failure_severity)?;
        Ok(self)
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Lowest severity that stops a refactoring from being applied; either
    /// WARNING or ERROR.
    #[must_use]
    pub const fn failure_severity(&self) -> Severity {
        self.failure_severity
    }

    /// Maximum number of undo entries retained.
    #[must_use]
    pub const fn undo_limit(&self) -> usize {
        self.undo_limit
    }

    /// Whether refactorings are reconstructed from their descriptors and
    /// compared before execution.
    #[must_use]
    pub const fn descriptor_round_trip(&self) -> bool {
        self.descriptor_round_trip
    }

    /// Whether changes are validated against the store before they run.
    #[must_use]
    pub const fn validate_changes(&self) -> bool {
        self.validate_changes
    }

    /// Sets the failure severity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] unless `severity` is
    /// [`Severity::Warning`] or [`Severity::Error`].
    pub fn with_failure_severity(mut self, severity: Severity) -> Result<Self, ConfigError> {
        check_failure_severity(severity)?;
        self.failure_severity = severity;
        Ok(self)
    }

    /// Sets the undo stack bound.
    #[must_use]
    pub const fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = limit;
        self
    }

    /// Enables or disables the descriptor round trip.
    #[must_use]
    pub const fn with_descriptor_round_trip(mut self, enabled: bool) -> Self {
        self.descriptor_round_trip = enabled;
        self
    }

    /// Enables or disables change validation.
    #[must_use]
    pub const fn with_validate_changes(mut self, enabled: bool) -> Self {
        self.validate_changes = enabled;
        self
    }

    /// Sets the log format.
    #[must_use]
    pub const fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Sets the log filter.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}

/// ERROR always blocks a refactoring, so the failure severity may only be
/// tightened to WARNING.
fn check_failure_severity(severity: Severity) -> Result<(), ConfigError> {
    match severity {
        Severity::Warning | Severity::Error => Ok(()),
        Severity::Ok | Severity::Fatal => Err(ConfigError::InvalidValue {
            key: "failure_severity",
            message: format!(
                "must be warning or error, got {}",
                severity.as_str().to_ascii_lowercase()
            ),
        }),
    }
}
