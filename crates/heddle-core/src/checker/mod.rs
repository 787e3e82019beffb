//! Two-phase precondition checking.
//!
//! The checker drives a refactoring through its initial and final condition
//! checks and keeps the combined status. A FATAL initial status is terminal:
//! the final check is never run for that configuration. Final checks may be
//! repeated as input changes. Each repeat replaces the previous final status
//! while the initial status is kept.
//!
//! ```text
//! NotStarted --initial--> ActivationChecked --final--> InputChecked
//!      |                                                 |   ^
//!      +--initial FATAL--> Aborted                       |   +--final again
//!                                                        +--conclude--> ReadyToExecute | Aborted
//! ```

use std::fmt;

use heddle_status::{Severity, Status};
use thiserror::Error;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::refactoring::Refactoring;
use crate::store::BackingStore;

const CHECK_TARGET: &str = "heddle_core::checker";

/// Which phase of checking is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckPhase {
    /// Activation checks.
    Initial,
    /// Input checks.
    Final,
}

impl fmt::Display for CheckPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "initial",
            Self::Final => "final",
        })
    }
}

/// Which checks [`ConditionChecker::check`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckStyle {
    /// Initial checks only.
    Initial,
    /// Final checks only.
    Final,
    /// Initial then final, stopping after a FATAL initial status.
    All,
}

/// Lifecycle of a checked refactoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckState {
    /// Nothing has been checked.
    NotStarted,
    /// Initial checks passed below FATAL.
    ActivationChecked,
    /// Final checks ran at least once.
    InputChecked,
    /// The refactoring must not run.
    Aborted,
    /// Checks concluded below the failure severity.
    ReadyToExecute,
}

/// Errors raised while checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckError {
    /// The cancellation token fired before a phase started.
    #[error("condition checking was cancelled before the {phase} phase")]
    Cancelled {
        /// Phase that did not run.
        phase: CheckPhase,
    },

    /// Final checks were requested before initial checks.
    #[error("final conditions cannot be checked before initial conditions")]
    InitialNotChecked,
}

/// Drives the two checking phases and tracks their combined status.
#[derive(Debug, Clone)]
pub struct ConditionChecker {
    state: CheckState,
    failure_severity: Severity,
    initial: Status,
    fin: Option<Status>,
}

impl ConditionChecker {
    /// Creates a checker that blocks execution at `failure_severity` or
    /// above.
    ///
    /// ERROR always blocks: any severity other than WARNING is treated as
    /// ERROR.
    #[must_use]
    pub const fn new(failure_severity: Severity) -> Self {
        Self {
            state: CheckState::NotStarted,
            failure_severity: match failure_severity {
                Severity::Warning => Severity::Warning,
                Severity::Ok | Severity::Error | Severity::Fatal => Severity::Error,
            },
            initial: Status::ok(),
            fin: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> CheckState {
        self.state
    }

    /// Severity at or above which execution is refused.
    #[must_use]
    pub const fn failure_severity(&self) -> Severity {
        self.failure_severity
    }

    /// Initial status followed by the latest final status.
    #[must_use]
    pub fn status(&self) -> Status {
        let mut status = self.initial.clone();
        if let Some(fin) = &self.fin {
            status.merge(fin.clone());
        }
        status
    }

    /// Forgets every result and returns to [`CheckState::NotStarted`].
    pub fn reset(&mut self) {
        self.state = CheckState::NotStarted;
        self.initial = Status::ok();
        self.fin = None;
    }

    /// Runs the initial checks, discarding any earlier results.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Cancelled`] when the token has fired.
    pub fn check_initial_conditions(
        &mut self,
        refactoring: &mut dyn Refactoring,
        store: &dyn BackingStore,
        token: &CancellationToken,
    ) -> Result<Status, CheckError> {
        if token.is_cancelled() {
            return Err(CheckError::Cancelled {
                phase: CheckPhase::Initial,
            });
        }
        self.initial = refactoring.check_initial_conditions(store, token);
        self.fin = None;
        self.state = if self.initial.has_fatal() {
            CheckState::Aborted
        } else {
            CheckState::ActivationChecked
        };
        debug!(
            target: CHECK_TARGET,
            refactoring = %refactoring.name(),
            severity = %self.initial.severity(),
            "initial conditions checked"
        );
        Ok(self.initial.clone())
    }

    /// Runs the final checks and returns the combined status.
    ///
    /// After a FATAL initial status, the refactoring is not consulted and
    /// the terminal status is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::InitialNotChecked`] before the initial checks
    /// and [`CheckError::Cancelled`] when the token has fired.
    pub fn check_final_conditions(
        &mut self,
        refactoring: &mut dyn Refactoring,
        store: &dyn BackingStore,
        token: &CancellationToken,
    ) -> Result<Status, CheckError> {
        if self.state == CheckState::NotStarted {
            return Err(CheckError::InitialNotChecked);
        }
        if self.initial.has_fatal() {
            return Ok(self.status());
        }
        if token.is_cancelled() {
            return Err(CheckError::Cancelled {
                phase: CheckPhase::Final,
            });
        }
        let fin = refactoring.check_final_conditions(store, token);
        debug!(
            target: CHECK_TARGET,
            refactoring = %refactoring.name(),
            severity = %fin.severity(),
            "final conditions checked"
        );
        self.fin = Some(fin);
        self.state = CheckState::InputChecked;
        Ok(self.status())
    }

    /// Runs the checks selected by `style` and returns the combined status.
    ///
    /// # Errors
    ///
    /// Propagates the errors of the individual phases.
    pub fn check(
        &mut self,
        style: CheckStyle,
        refactoring: &mut dyn Refactoring,
        store: &dyn BackingStore,
        token: &CancellationToken,
    ) -> Result<Status, CheckError> {
        match style {
            CheckStyle::Initial => self.check_initial_conditions(refactoring, store, token),
            CheckStyle::Final => self.check_final_conditions(refactoring, store, token),
            CheckStyle::All => {
                let initial = self.check_initial_conditions(refactoring, store, token)?;
                if initial.has_fatal() {
                    return Ok(initial);
                }
                self.check_final_conditions(refactoring, store, token)
            }
        }
    }

    /// Decides whether the checked refactoring may run.
    ///
    /// Only meaningful after the final checks; in any other state the
    /// current state is returned unchanged.
    pub fn conclude(&mut self) -> CheckState {
        if self.state == CheckState::InputChecked {
            self.state = if self.status().severity() >= self.failure_severity {
                CheckState::Aborted
            } else {
                CheckState::ReadyToExecute
            };
        }
        self.state
    }
}
