//! Output formats for the engine's log events.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How log events are rendered.
///
/// Names parse case-insensitively, so `HEDDLE_LOG_FORMAT=COMPACT` selects
/// [`LogFormat::Compact`].
///
/// ```
/// use heddle_config::LogFormat;
///
/// let format: LogFormat = "Compact".parse().expect("known format");
/// assert_eq!(format, LogFormat::Compact);
/// assert!(!format.is_structured());
/// assert_eq!(LogFormat::Json.to_string(), "json");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event with the event fields flattened, for log
    /// collectors.
    #[default]
    Json,
    /// Single-line text for people watching a terminal.
    Compact,
}

impl LogFormat {
    /// Whether events are emitted as machine-readable records. Structured
    /// output never carries terminal colour codes.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Error returned when a name does not denote a [`LogFormat`].
pub type LogFormatParseError = strum::ParseError;
