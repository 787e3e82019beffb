//! Session harness tying the execution pieces together.
//!
//! A [`Session`] owns the backing store along with everything that outlives
//! a single refactoring: the undo manager, the participant registry, the
//! refactoring history and the contribution registry used to rebuild
//! refactorings from descriptors.

mod assertions;

use std::fmt;

use heddle_config::EngineConfig;
use heddle_status::{Severity, Status};
use thiserror::Error;
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::change::Change;
use crate::descriptor::{
    ContributionRegistry, RefactoringHistory, RoundTripError, verify_equivalence,
};
use crate::executor::{ChangeExecutor, ExecutionContext, ExecutionError, Performed, UndoPolicy};
use crate::participants::ParticipantRegistry;
use crate::refactoring::Refactoring;
use crate::store::BackingStore;
use crate::undo::{UndoError, UndoManager};

pub use assertions::{DocumentMismatch, LineMismatch, compare_lines};

const SESSION_TARGET: &str = "heddle_core::session";

/// Errors surfaced by [`Session`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Execution failed for a reason other than a blocking status.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Undo or redo failed.
    #[error(transparent)]
    Undo(#[from] UndoError),

    /// The refactoring did not survive a descriptor round trip.
    #[error("descriptor round trip failed: {0}")]
    RoundTrip(#[from] RoundTripError),
}

/// A store plus the state that outlives individual refactorings.
pub struct Session<S> {
    store: S,
    undo: UndoManager,
    participants: ParticipantRegistry,
    history: RefactoringHistory,
    contributions: ContributionRegistry,
    executor: ChangeExecutor,
    config: EngineConfig,
    token: CancellationToken,
}

impl<S> Session<S>
where
    S: BackingStore + Clone,
{
    /// Creates a session over `store` with an empty history and no
    /// contributions.
    #[must_use]
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            store,
            undo: UndoManager::new(config.undo_limit()),
            participants: ParticipantRegistry::new(),
            history: RefactoringHistory::new(),
            contributions: ContributionRegistry::new(),
            executor: ChangeExecutor::new(&config),
            config,
            token: CancellationToken::new(),
        }
    }

    /// Replaces the contribution registry.
    #[must_use]
    pub fn with_contributions(mut self, contributions: ContributionRegistry) -> Self {
        self.contributions = contributions;
        self
    }

    /// Performs `refactoring`, recording its inverse for undo.
    ///
    /// The undo history is flushed first, so after a successful run exactly
    /// one entry can be undone. Returns `None` when the refactoring applied
    /// with an OK status and `Some(status)` when it applied with warnings or
    /// was refused by its conditions.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] for cancellation, apply failures and failed
    /// descriptor round trips.
    pub fn perform_refactoring(
        &mut self,
        refactoring: &mut dyn Refactoring,
    ) -> Result<Option<Status>, SessionError> {
        self.undo.flush();
        self.verify_round_trip(refactoring)?;
        match self.execute(refactoring, UndoPolicy::Store) {
            Ok(performed) => {
                let status = performed.into_status();
                Ok((status.severity() != Severity::Ok).then_some(status))
            }
            Err(error) => error
                .into_status()
                .map(Some)
                .map_err(SessionError::Execution),
        }
    }

    /// Performs `refactoring` and either records its inverse or hands it
    /// back.
    ///
    /// With `store_undo` the inverse goes onto the undo stack and `None` is
    /// returned. Otherwise the inverse is returned to the caller, or `None`
    /// when the refactoring provides no undo.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Execution`] for every failure, including
    /// blocking statuses.
    pub fn perform_change(
        &mut self,
        refactoring: &mut dyn Refactoring,
        store_undo: bool,
    ) -> Result<Option<Box<dyn Change>>, SessionError> {
        let policy = if store_undo {
            UndoPolicy::Store
        } else {
            UndoPolicy::Return
        };
        let performed = self.execute(refactoring, policy)?;
        Ok(performed.into_inverse())
    }

    /// Reverts the most recent refactoring.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Undo`] when nothing can be undone or the
    /// inverse no longer applies.
    pub fn undo(&mut self) -> Result<Status, SessionError> {
        let status = self.undo.perform_undo(&mut self.store)?;
        info!(target: SESSION_TARGET, severity = %status.severity(), "undo performed");
        Ok(status)
    }

    /// Re-applies the most recently undone refactoring.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Undo`] when nothing can be redone or the
    /// change no longer applies.
    pub fn redo(&mut self) -> Result<Status, SessionError> {
        let status = self.undo.perform_redo(&mut self.store)?;
        info!(target: SESSION_TARGET, severity = %status.severity(), "redo performed");
        Ok(status)
    }

    /// Empties both undo stacks.
    pub fn flush_undo(&mut self) {
        self.undo.flush();
    }

    fn verify_round_trip(&self, refactoring: &mut dyn Refactoring) -> Result<(), SessionError> {
        if !self.config.descriptor_round_trip() {
            return Ok(());
        }
        debug!(
            target: SESSION_TARGET,
            refactoring = %refactoring.name(),
            "verifying descriptor round trip"
        );
        verify_equivalence(refactoring, &self.contributions, &self.store, &self.config)?;
        Ok(())
    }

    fn execute(
        &mut self,
        refactoring: &mut dyn Refactoring,
        policy: UndoPolicy,
    ) -> Result<Performed, ExecutionError> {
        let descriptor = refactoring.create_descriptor();
        let performed = self.executor.perform(
            refactoring,
            ExecutionContext::new(&mut self.store, &mut self.undo, &mut self.participants),
            policy,
            &self.token,
        )?;
        let sequence = self.history.record(descriptor);
        debug!(target: SESSION_TARGET, sequence, "refactoring recorded in history");
        Ok(performed)
    }
}

impl<S> Session<S> {
    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the backing store, for test setup.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The undo manager.
    #[must_use]
    pub const fn undo_manager(&self) -> &UndoManager {
        &self.undo
    }

    /// Mutable access to the undo manager, for registering listeners.
    pub const fn undo_manager_mut(&mut self) -> &mut UndoManager {
        &mut self.undo
    }

    /// Notifications recorded by the latest execution.
    #[must_use]
    pub const fn participants(&self) -> &ParticipantRegistry {
        &self.participants
    }

    /// Descriptors of every successfully performed refactoring.
    #[must_use]
    pub const fn history(&self) -> &RefactoringHistory {
        &self.history
    }

    /// Registered refactoring contributions.
    #[must_use]
    pub const fn contributions(&self) -> &ContributionRegistry {
        &self.contributions
    }

    /// Mutable access to the contributions, for registration.
    pub const fn contributions_mut(&mut self) -> &mut ContributionRegistry {
        &mut self.contributions
    }

    /// Mutable access to the executor, for installing a post-apply hook.
    pub const fn executor_mut(&mut self) -> &mut ChangeExecutor {
        &mut self.executor
    }

    /// Engine configuration the session was created with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Token observed by every execution in this session.
    #[must_use]
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Replaces a fired cancellation token with a fresh one.
    pub fn reset_cancellation(&mut self) {
        self.token = CancellationToken::new();
    }

    /// Compares a stored document against `expected`, line by line.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentMismatch`] when the document is missing or the
    /// first differing line otherwise.
    pub fn assert_document_eq(&self, path: &str, expected: &str) -> Result<(), DocumentMismatch>
    where
        S: BackingStore,
    {
        assertions::assert_document_eq(&self.store, path, expected)
    }
}

impl<S> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("undo", &self.undo)
            .field("history", &self.history.len())
            .field("contributions", &self.contributions)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
