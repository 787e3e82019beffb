//! Undo and redo history for performed refactorings.
//!
//! The manager keeps two stacks of inverse changes. Pushing a new entry
//! clears the redo stack, and performing an undo moves the produced redo
//! change onto the redo stack. The undo stack is bounded: once it exceeds
//! the configured limit the oldest entry is dropped.
//!
//! A refactoring whose change tree has no inverse is recorded as
//! irreversible. That discards every older undo entry, because undoing past
//! it would no longer restore a consistent state.

use std::collections::VecDeque;
use std::fmt;

use heddle_status::Status;
use thiserror::Error;
use tracing::{debug, info};

use crate::change::{Change, ChangeError};
use crate::store::BackingStore;

const UNDO_TARGET: &str = "heddle_core::undo";

/// Errors raised by undo and redo.
#[derive(Debug, Error)]
pub enum UndoError {
    /// The undo stack is empty.
    #[error("there is nothing to undo")]
    NothingToUndo,

    /// The redo stack is empty.
    #[error("there is nothing to redo")]
    NothingToRedo,

    /// The most recent operation cannot be undone.
    #[error("'{label}' cannot be undone")]
    NotUndoable {
        /// Label of the irreversible operation.
        label: String,
    },

    /// The store has drifted since the entry was recorded.
    #[error("'{label}' no longer matches the workspace: {status}")]
    StaleChange {
        /// Label of the entry.
        label: String,
        /// Validation status of the stored change.
        status: Status,
    },

    /// Applying the stored change failed; both stacks were flushed.
    #[error("failed to apply '{label}': {source}")]
    Apply {
        /// Label of the entry.
        label: String,
        /// Underlying failure.
        #[source]
        source: ChangeError,
    },
}

/// Which stack an operation draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndoDirection {
    /// Reverting a performed operation.
    Undo,
    /// Re-applying a reverted operation.
    Redo,
}

impl fmt::Display for UndoDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
        })
    }
}

/// How the most recent operation was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoRecord {
    /// An inverse was pushed onto the undo stack.
    Recorded {
        /// Entry label.
        label: String,
    },
    /// The operation had no inverse; older entries were discarded.
    Unavailable {
        /// Label of the irreversible operation.
        label: String,
    },
}

/// Observer of undo manager activity.
pub trait UndoListener {
    /// Called before a stored change runs.
    fn about_to_perform(&mut self, _label: &str, _direction: UndoDirection) {}

    /// Called after a stored change ran.
    fn performed(&mut self, _label: &str, _direction: UndoDirection, _succeeded: bool) {}

    /// Called whenever either stack changes size.
    fn stacks_changed(&mut self, _undo_depth: usize, _redo_depth: usize) {}
}

#[derive(Debug)]
struct UndoEntry {
    label: String,
    change: Box<dyn Change>,
}

/// Bounded undo and redo stacks of inverse changes.
///
/// # Example
///
/// ```
/// use heddle_core::{NullChange, UndoManager};
///
/// let mut undo = UndoManager::new(2);
/// undo.push("first", Box::new(NullChange::new("first")));
/// undo.push("second", Box::new(NullChange::new("second")));
/// undo.push("third", Box::new(NullChange::new("third")));
///
/// assert_eq!(undo.undo_depth(), 2);
/// assert_eq!(undo.peek_undo_name(), Some("third"));
/// ```
pub struct UndoManager {
    undo: VecDeque<UndoEntry>,
    redo: Vec<UndoEntry>,
    limit: usize,
    blocked_by: Option<String>,
    last_record: Option<UndoRecord>,
    listeners: Vec<Box<dyn UndoListener>>,
}

impl UndoManager {
    /// Creates an empty manager holding at most `limit` undo entries.
    ///
    /// A limit of zero is treated as one.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
            blocked_by: None,
            last_record: None,
            listeners: Vec::new(),
        }
    }

    /// Registers a listener.
    pub fn add_listener(&mut self, listener: Box<dyn UndoListener>) {
        self.listeners.push(listener);
    }

    /// Records the inverse of a performed operation.
    ///
    /// Clears the redo stack and drops the oldest entry when the bound is
    /// exceeded.
    pub fn push(&mut self, label: impl Into<String>, change: Box<dyn Change>) {
        let label = label.into();
        debug!(target: UNDO_TARGET, label = %label, "recording undo entry");
        self.last_record = Some(UndoRecord::Recorded {
            label: label.clone(),
        });
        self.undo.push_back(UndoEntry { label, change });
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        self.redo.clear();
        self.blocked_by = None;
        self.notify_stacks();
    }

    /// Records an operation that produced no inverse.
    ///
    /// Every older entry is discarded and [`perform_undo`](Self::perform_undo)
    /// reports [`UndoError::NotUndoable`] until the next push or flush.
    pub fn record_irreversible(&mut self, label: impl Into<String>) {
        let label = label.into();
        info!(
            target: UNDO_TARGET,
            label = %label,
            discarded = self.undo.len(),
            "operation cannot be undone; discarding undo history"
        );
        self.undo.clear();
        self.redo.clear();
        self.last_record = Some(UndoRecord::Unavailable {
            label: label.clone(),
        });
        self.blocked_by = Some(label);
        self.notify_stacks();
    }

    /// Clears both stacks.
    pub fn flush(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.blocked_by = None;
        self.last_record = None;
        self.notify_stacks();
    }

    /// Returns `true` when an undo entry is available.
    #[must_use]
    pub fn anything_to_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Returns `true` when a redo entry is available.
    #[must_use]
    pub fn anything_to_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Label of the entry [`perform_undo`](Self::perform_undo) would run.
    #[must_use]
    pub fn peek_undo_name(&self) -> Option<&str> {
        self.undo.back().map(|entry| entry.label.as_str())
    }

    /// Label of the entry [`perform_redo`](Self::perform_redo) would run.
    #[must_use]
    pub fn peek_redo_name(&self) -> Option<&str> {
        self.redo.last().map(|entry| entry.label.as_str())
    }

    /// Number of undo entries.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo entries.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Upper bound on the undo stack.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// How the most recent operation was recorded, if anything has been
    /// recorded since the last flush.
    #[must_use]
    pub const fn last_record(&self) -> Option<&UndoRecord> {
        self.last_record.as_ref()
    }

    /// Reverts the most recent operation.
    ///
    /// On success the produced redo change is pushed onto the redo stack and
    /// the validation status of the stored change is returned; it carries any
    /// warnings raised while validating.
    ///
    /// # Errors
    ///
    /// Returns [`UndoError::NothingToUndo`] or [`UndoError::NotUndoable`]
    /// when no entry is available, [`UndoError::StaleChange`] when the store
    /// has drifted (the entry stays on the stack), and [`UndoError::Apply`]
    /// when the change fails (both stacks are flushed).
    pub fn perform_undo(&mut self, store: &mut dyn BackingStore) -> Result<Status, UndoError> {
        let Some(entry) = self.undo.pop_back() else {
            return Err(self
                .blocked_by
                .clone()
                .map_or(UndoError::NothingToUndo, |label| UndoError::NotUndoable {
                    label,
                }));
        };
        match self.run_entry(entry, store, UndoDirection::Undo) {
            Ok((label, status, Some(redo))) => {
                self.redo.push(UndoEntry {
                    label,
                    change: redo,
                });
                self.notify_stacks();
                Ok(status)
            }
            Ok((_, status, None)) => {
                self.redo.clear();
                self.notify_stacks();
                Ok(status)
            }
            Err(EntryFailure::Stale(entry, status)) => {
                let label = entry.label.clone();
                self.undo.push_back(entry);
                Err(UndoError::StaleChange { label, status })
            }
            Err(EntryFailure::Apply(label, source)) => {
                self.flush();
                Err(UndoError::Apply { label, source })
            }
        }
    }

    /// Re-applies the most recently undone operation.
    ///
    /// # Errors
    ///
    /// Mirrors [`perform_undo`](Self::perform_undo), reporting
    /// [`UndoError::NothingToRedo`] when the redo stack is empty.
    pub fn perform_redo(&mut self, store: &mut dyn BackingStore) -> Result<Status, UndoError> {
        let Some(entry) = self.redo.pop() else {
            return Err(UndoError::NothingToRedo);
        };
        match self.run_entry(entry, store, UndoDirection::Redo) {
            Ok((label, status, Some(undo))) => {
                self.undo.push_back(UndoEntry {
                    label: label.clone(),
                    change: undo,
                });
                while self.undo.len() > self.limit {
                    self.undo.pop_front();
                }
                self.last_record = Some(UndoRecord::Recorded { label });
                self.notify_stacks();
                Ok(status)
            }
            Ok((label, status, None)) => {
                self.record_irreversible(label);
                Ok(status)
            }
            Err(EntryFailure::Stale(entry, status)) => {
                let label = entry.label.clone();
                self.redo.push(entry);
                Err(UndoError::StaleChange { label, status })
            }
            Err(EntryFailure::Apply(label, source)) => {
                self.flush();
                Err(UndoError::Apply { label, source })
            }
        }
    }

    fn run_entry(
        &mut self,
        entry: UndoEntry,
        store: &mut dyn BackingStore,
        direction: UndoDirection,
    ) -> Result<(String, Status, Option<Box<dyn Change>>), EntryFailure> {
        let status = entry.change.is_valid(store);
        if status.has_error() {
            debug!(
                target: UNDO_TARGET,
                label = %entry.label,
                direction = %direction,
                "stored change is stale"
            );
            return Err(EntryFailure::Stale(entry, status));
        }

        let UndoEntry { label, change } = entry;
        for listener in &mut self.listeners {
            listener.about_to_perform(&label, direction);
        }

        let mut pending = Some(change);
        let mut produced = None;
        let outcome = store.run_atomic(&mut |scope| {
            if let Some(change) = pending.take() {
                produced = change.perform(scope)?;
            }
            Ok(())
        });

        let succeeded = outcome.is_ok();
        for listener in &mut self.listeners {
            listener.performed(&label, direction, succeeded);
        }
        match outcome {
            Ok(delta) => {
                info!(
                    target: UNDO_TARGET,
                    label = %label,
                    direction = %direction,
                    affected = delta.len(),
                    "stored change applied"
                );
                Ok((label, status, produced))
            }
            Err(source) => Err(EntryFailure::Apply(label, source)),
        }
    }

    fn notify_stacks(&mut self) {
        let (undo_depth, redo_depth) = (self.undo.len(), self.redo.len());
        for listener in &mut self.listeners {
            listener.stacks_changed(undo_depth, redo_depth);
        }
    }
}

enum EntryFailure {
    Stale(UndoEntry, Status),
    Apply(String, ChangeError),
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(heddle_config::DEFAULT_UNDO_LIMIT)
    }
}

impl fmt::Debug for UndoManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoManager")
            .field("undo", &self.undo)
            .field("redo", &self.redo)
            .field("limit", &self.limit)
            .field("blocked_by", &self.blocked_by)
            .field("last_record", &self.last_record)
            .finish_non_exhaustive()
    }
}
