//! Structured logging for hosts and test harnesses embedding the engine.
//!
//! The engine emits `tracing` events under the `heddle_core::*` and
//! `heddle_refactorings::*` targets. [`initialise`] installs a global
//! subscriber writing to standard error, once per process. Test harnesses
//! call [`initialise_with`] and pass a writer the test runner captures.
//! [`subscriber`] builds the same subscriber without installing it, for
//! scoped use with [`tracing::subscriber::with_default`].

use std::io::{self, IsTerminal};

use heddle_config::{EngineConfig, LogFormat};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, MakeWriter};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Subscriber shape shared by every output format.
pub type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Proof that the global subscriber is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors raised while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression did not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Offending expression.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another global subscriber was installed first.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[source] SetGlobalDefaultError),
}

/// Installs a subscriber writing to standard error.
///
/// Only the first successful call installs anything; later calls return a
/// fresh [`TelemetryHandle`].
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or another
/// subscriber is already installed.
///
/// # Examples
///
/// ```rust
/// use heddle_config::EngineConfig;
/// use heddle_core::telemetry;
///
/// # fn main() -> Result<(), heddle_core::telemetry::TelemetryError> {
/// let config = EngineConfig::default();
/// let first = telemetry::initialise(&config)?;
/// let second = telemetry::initialise(&config)?;
/// drop(first);
/// drop(second);
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &EngineConfig) -> Result<TelemetryHandle, TelemetryError> {
    install_once(|| build(config, io::stderr, io::stderr().is_terminal()))
}

/// Installs a subscriber writing to `writer`, such as
/// [`fmt::TestWriter`] in test harnesses.
///
/// Shares the once-per-process guard with [`initialise`].
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or another
/// subscriber is already installed.
pub fn initialise_with<W>(config: &EngineConfig, writer: W) -> Result<TelemetryHandle, TelemetryError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    install_once(|| build(config, writer, false))
}

/// Builds the subscriber described by `config` without installing it.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the filter does not parse.
pub fn subscriber<W>(config: &EngineConfig, writer: W) -> Result<BoxedSubscriber, TelemetryError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    build(config, writer, false)
}

fn install_once(
    make: impl FnOnce() -> Result<BoxedSubscriber, TelemetryError>,
) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| {
            tracing::subscriber::set_global_default(make()?).map_err(TelemetryError::Subscriber)
        })
        .map(|_| TelemetryHandle)
}

fn build<W>(config: &EngineConfig, writer: W, terminal: bool) -> Result<BoxedSubscriber, TelemetryError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter {
        filter: config.log_filter().to_owned(),
        message: error.to_string(),
    })?;
    let format = config.log_format();
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(writer)
        .with_ansi(terminal && !format.is_structured())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    Ok(match format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    })
}
