//! The refactoring execution pipeline.
//!
//! [`ChangeExecutor::perform`] runs one refactoring end to end:
//!
//! 1. Reset the participant registry.
//! 2. Run initial and final checks. Stop when the combined severity
//!    reaches the failure severity.
//! 3. Build the change tree, recording participant notifications.
//! 4. Validate the change tree against the store. A validation status at
//!    the failure severity stops the run like a failed check does.
//! 5. Apply the tree inside one atomic store scope.
//! 6. Hand the resulting delta to the post-apply hook.
//! 7. Record, return or discard the inverse, as the [`UndoPolicy`] says.
//!
//! No step after a failure runs, and a failure before step 5 leaves the
//! store untouched. A failure during step 5 restores the store. A run that
//! fails after step 3 clears the notifications it recorded.

use std::fmt;

use heddle_config::EngineConfig;
use heddle_status::{Severity, Status};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::change::{Change, ChangeError};
use crate::checker::{CheckError, CheckPhase, CheckState, CheckStyle, ConditionChecker};
use crate::participants::ParticipantRegistry;
use crate::refactoring::Refactoring;
use crate::store::{BackingStore, WorkspaceDelta};
use crate::undo::{UndoManager, UndoRecord};

const EXECUTOR_TARGET: &str = "heddle_core::executor";

/// What happens to the inverse change after a successful apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UndoPolicy {
    /// Push the inverse onto the undo manager, or record the operation as
    /// irreversible when there is none.
    #[default]
    Store,
    /// Hand the inverse back to the caller in [`Performed`].
    Return,
    /// Drop the inverse.
    Discard,
}

/// Errors that stop a refactoring.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Condition checking produced a blocking status. Nothing was changed.
    #[error("refactoring conditions failed: {status}")]
    ConditionsFailed {
        /// Combined check status.
        status: Status,
    },

    /// The refactoring could not build its change tree.
    #[error("change creation failed: {status}")]
    ChangeCreationFailed {
        /// Check status followed by the creation failure.
        status: Status,
    },

    /// The change tree no longer matches the store.
    #[error("change is no longer valid: {status}")]
    InvalidChange {
        /// Check status followed by the validation result.
        status: Status,
    },

    /// The cancellation token fired.
    #[error("refactoring '{name}' was cancelled before {stage}")]
    Cancelled {
        /// Refactoring name.
        name: String,
        /// Step that did not run.
        stage: &'static str,
    },

    /// Condition checking could not run.
    #[error("condition checking failed: {0}")]
    Check(#[source] CheckError),

    /// Applying the change failed; the store was restored.
    #[error("failed to apply '{name}': {source}")]
    Apply {
        /// Refactoring name.
        name: String,
        /// Underlying failure.
        #[source]
        source: ChangeError,
    },
}

impl ExecutionError {
    /// Status explaining the failure, for errors that carry one.
    #[must_use]
    pub const fn status(&self) -> Option<&Status> {
        match self {
            Self::ConditionsFailed { status }
            | Self::ChangeCreationFailed { status }
            | Self::InvalidChange { status } => Some(status),
            Self::Cancelled { .. } | Self::Check(_) | Self::Apply { .. } => None,
        }
    }

    /// Converts a status-bearing failure into its status.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged for failures without a status.
    pub fn into_status(self) -> Result<Status, Self> {
        match self {
            Self::ConditionsFailed { status }
            | Self::ChangeCreationFailed { status }
            | Self::InvalidChange { status } => Ok(status),
            other => Err(other),
        }
    }
}

/// Mutable state a refactoring executes against.
pub struct ExecutionContext<'a> {
    store: &'a mut dyn BackingStore,
    undo: &'a mut UndoManager,
    participants: &'a mut ParticipantRegistry,
}

impl<'a> ExecutionContext<'a> {
    /// Bundles the store, undo manager and participant registry.
    #[must_use]
    pub const fn new(
        store: &'a mut dyn BackingStore,
        undo: &'a mut UndoManager,
        participants: &'a mut ParticipantRegistry,
    ) -> Self {
        Self {
            store,
            undo,
            participants,
        }
    }
}

/// Result of a successful execution.
#[derive(Debug)]
pub struct Performed {
    status: Status,
    delta: WorkspaceDelta,
    inverse: Option<Box<dyn Change>>,
    undo_record: Option<UndoRecord>,
}

impl Performed {
    /// Combined status, always below the failure severity.
    #[must_use]
    pub const fn status(&self) -> &Status {
        &self.status
    }

    /// Net effect on the store.
    #[must_use]
    pub const fn delta(&self) -> &WorkspaceDelta {
        &self.delta
    }

    /// Inverse change, present only under [`UndoPolicy::Return`].
    #[must_use]
    pub fn inverse(&self) -> Option<&dyn Change> {
        self.inverse.as_deref()
    }

    /// How the undo manager recorded the run, under [`UndoPolicy::Store`].
    #[must_use]
    pub const fn undo_record(&self) -> Option<&UndoRecord> {
        self.undo_record.as_ref()
    }

    /// Takes the inverse change.
    #[must_use]
    pub fn into_inverse(self) -> Option<Box<dyn Change>> {
        self.inverse
    }

    /// Takes the status.
    #[must_use]
    pub fn into_status(self) -> Status {
        self.status
    }
}

/// Callback invoked with the delta of every successful apply.
pub type PostApplyHook = Box<dyn FnMut(&WorkspaceDelta)>;

/// Runs refactorings through the checking, creation and apply pipeline.
///
/// # Example
///
/// ```
/// use heddle_config::EngineConfig;
/// use heddle_core::ChangeExecutor;
/// use heddle_status::Severity;
///
/// let executor = ChangeExecutor::new(&EngineConfig::default());
/// assert_eq!(executor.failure_severity(), Severity::Error);
/// ```
pub struct ChangeExecutor {
    failure_severity: Severity,
    validate_changes: bool,
    post_apply: Option<PostApplyHook>,
}

impl ChangeExecutor {
    /// Creates an executor from the engine configuration.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            failure_severity: ConditionChecker::new(config.failure_severity())
                .failure_severity(),
            validate_changes: config.validate_changes(),
            post_apply: None,
        }
    }

    /// Installs a hook that observes every applied delta.
    #[must_use]
    pub fn with_post_apply(mut self, hook: PostApplyHook) -> Self {
        self.post_apply = Some(hook);
        self
    }

    /// Replaces the post-apply hook.
    pub fn set_post_apply(&mut self, hook: Option<PostApplyHook>) {
        self.post_apply = hook;
    }

    /// Severity at or above which execution is refused.
    #[must_use]
    pub const fn failure_severity(&self) -> Severity {
        self.failure_severity
    }

    /// Executes `refactoring` against the context.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] describing the first step that failed.
    pub fn perform(
        &mut self,
        refactoring: &mut dyn Refactoring,
        context: ExecutionContext<'_>,
        policy: UndoPolicy,
        token: &CancellationToken,
    ) -> Result<Performed, ExecutionError> {
        let ExecutionContext {
            store,
            undo,
            participants,
        } = context;
        let name = refactoring.name();
        participants.reset();
        debug!(target: EXECUTOR_TARGET, refactoring = %name, "checking conditions");

        let mut checker = ConditionChecker::new(self.failure_severity);
        let mut status = checker
            .check(CheckStyle::All, refactoring, &*store, token)
            .map_err(|error| check_failure(&name, error))?;
        if checker.conclude() != CheckState::ReadyToExecute {
            info!(
                target: EXECUTOR_TARGET,
                refactoring = %name,
                severity = %status.severity(),
                "refactoring refused by its conditions"
            );
            return Err(ExecutionError::ConditionsFailed { status });
        }

        ensure_not_cancelled(token, &name, "change creation")?;
        let change = match refactoring.create_change(&*store, participants, token) {
            Ok(change) => change,
            Err(failure) => {
                participants.reset();
                status.merge(failure);
                return Err(ExecutionError::ChangeCreationFailed { status });
            }
        };

        if self.validate_changes {
            let validity = change.is_valid(&*store);
            let invalid = validity.severity() >= checker.failure_severity();
            status.merge(validity);
            if invalid {
                warn!(
                    target: EXECUTOR_TARGET,
                    refactoring = %name,
                    severity = %status.severity(),
                    "change rejected by validation"
                );
                participants.reset();
                return Err(ExecutionError::InvalidChange { status });
            }
        }

        if let Err(error) = ensure_not_cancelled(token, &name, "applying the change") {
            participants.reset();
            return Err(error);
        }
        let provides_undo = refactoring.provides_undo();
        let mut pending = Some(change);
        let mut produced = None;
        let applied = store.run_atomic(&mut |scope| {
            if let Some(change) = pending.take() {
                produced = change.perform(scope)?;
            }
            Ok(())
        });
        let delta = applied.map_err(|source| {
            warn!(
                target: EXECUTOR_TARGET,
                refactoring = %name,
                error = %source,
                "apply failed; store restored"
            );
            participants.reset();
            ExecutionError::Apply {
                name: name.clone(),
                source,
            }
        })?;

        if let Some(hook) = self.post_apply.as_mut() {
            hook(&delta);
        }

        let inverse = produced.filter(|_| provides_undo);
        let (inverse, undo_record) = match policy {
            UndoPolicy::Store => {
                match inverse {
                    Some(change) => undo.push(name.clone(), change),
                    None => undo.record_irreversible(name.clone()),
                }
                (None, undo.last_record().cloned())
            }
            UndoPolicy::Return => (inverse, None),
            UndoPolicy::Discard => (None, None),
        };

        info!(
            target: EXECUTOR_TARGET,
            refactoring = %name,
            severity = %status.severity(),
            affected = delta.len(),
            notifications = participants.len(),
            "refactoring performed"
        );
        Ok(Performed {
            status,
            delta,
            inverse,
            undo_record,
        })
    }
}

impl Default for ChangeExecutor {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl fmt::Debug for ChangeExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeExecutor")
            .field("failure_severity", &self.failure_severity)
            .field("validate_changes", &self.validate_changes)
            .field("post_apply", &self.post_apply.is_some())
            .finish()
    }
}

fn ensure_not_cancelled(
    token: &CancellationToken,
    name: &str,
    stage: &'static str,
) -> Result<(), ExecutionError> {
    if token.is_cancelled() {
        return Err(ExecutionError::Cancelled {
            name: name.to_owned(),
            stage,
        });
    }
    Ok(())
}

fn check_failure(name: &str, error: CheckError) -> ExecutionError {
    match error {
        CheckError::Cancelled { phase } => ExecutionError::Cancelled {
            name: name.to_owned(),
            stage: match phase {
                CheckPhase::Initial => "initial condition checking",
                CheckPhase::Final => "final condition checking",
            },
        },
        CheckError::InitialNotChecked => ExecutionError::Check(error),
    }
}
