//! Notifications about elements affected by a refactoring.
//!
//! While building its change tree, a refactoring records one
//! [`Notification`] per element it renames, moves, copies or deletes. A
//! type rename, for example, records the type and its compilation unit,
//! while a field rename records the field plus each renamed accessor.
//! Observers and tests read the collected notifications back after
//! execution.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::handle::ElementHandle;

/// The argument attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticipantArgument {
    /// The element receives a new name.
    Rename {
        /// New simple name.
        new_name: String,
        /// Whether references are updated along with the declaration.
        update_references: bool,
    },
    /// The element moves to a new container.
    Move {
        /// Destination container.
        destination: String,
        /// Whether references are updated along with the declaration.
        update_references: bool,
    },
    /// The element is duplicated into a new container.
    Copy {
        /// Destination container.
        destination: String,
    },
    /// The element is removed.
    Delete,
    /// The element is created.
    Create,
}

impl ParticipantArgument {
    /// Rename argument with reference updating enabled.
    #[must_use]
    pub fn rename(new_name: impl Into<String>) -> Self {
        Self::Rename {
            new_name: new_name.into(),
            update_references: true,
        }
    }

    /// Move argument with reference updating enabled.
    #[must_use]
    pub fn move_to(destination: impl Into<String>) -> Self {
        Self::Move {
            destination: destination.into(),
            update_references: true,
        }
    }
}

impl fmt::Display for ParticipantArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename {
                new_name,
                update_references,
            } => write!(f, "rename to '{new_name}' (references: {update_references})"),
            Self::Move {
                destination,
                update_references,
            } => write!(f, "move to '{destination}' (references: {update_references})"),
            Self::Copy { destination } => write!(f, "copy to '{destination}'"),
            Self::Delete => f.write_str("delete"),
            Self::Create => f.write_str("create"),
        }
    }
}

/// One element notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    handle: ElementHandle,
    argument: ParticipantArgument,
}

impl Notification {
    /// Affected element.
    #[must_use]
    pub const fn handle(&self) -> &ElementHandle {
        &self.handle
    }

    /// What happens to the element.
    #[must_use]
    pub const fn argument(&self) -> &ParticipantArgument {
        &self.argument
    }
}

/// Errors raised while recording notifications.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParticipantError {
    /// The element was already notified during this execution.
    #[error("element '{handle}' was already notified during this execution")]
    Duplicate {
        /// Offending handle.
        handle: ElementHandle,
    },
}

/// Differences between expected and recorded notifications.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationMismatch {
    /// The expectation lists differ in length.
    #[error("expected {handles} handles but {arguments} arguments")]
    UnbalancedExpectation {
        /// Number of expected handles.
        handles: usize,
        /// Number of expected arguments.
        arguments: usize,
    },

    /// A different number of notifications was recorded.
    #[error("expected {expected} notifications, recorded {actual}")]
    Count {
        /// Expected count.
        expected: usize,
        /// Recorded count.
        actual: usize,
    },

    /// A notification names a different element.
    #[error("notification {index}: expected element '{expected}', recorded '{actual}'")]
    Handle {
        /// Position in the notification list.
        index: usize,
        /// Expected handle.
        expected: ElementHandle,
        /// Recorded handle.
        actual: ElementHandle,
    },

    /// A notification carries a different argument.
    #[error("notification {index} for '{handle}': expected {expected}, recorded {actual}")]
    Argument {
        /// Position in the notification list.
        index: usize,
        /// Element concerned.
        handle: ElementHandle,
        /// Expected argument.
        expected: ParticipantArgument,
        /// Recorded argument.
        actual: ParticipantArgument,
    },
}

/// Per-execution log of element notifications.
///
/// # Example
///
/// ```
/// use heddle_core::{ElementHandle, ParticipantArgument, ParticipantRegistry};
///
/// let mut registry = ParticipantRegistry::new();
/// registry
///     .record(ElementHandle::new("p.A"), ParticipantArgument::rename("B"))
///     .expect("first notification");
/// registry
///     .record(ElementHandle::new("p/A.java"), ParticipantArgument::rename("B.java"))
///     .expect("second notification");
/// assert_eq!(registry.len(), 2);
/// assert!(registry
///     .record(ElementHandle::new("p.A"), ParticipantArgument::Delete)
///     .is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantRegistry {
    notifications: Vec<Notification>,
}

impl ParticipantRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every notification; called before each execution.
    pub fn reset(&mut self) {
        self.notifications.clear();
    }

    /// Records that `handle` is affected as described by `argument`.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipantError::Duplicate`] when the element was already
    /// notified since the last reset.
    pub fn record(
        &mut self,
        handle: ElementHandle,
        argument: ParticipantArgument,
    ) -> Result<(), ParticipantError> {
        if self
            .notifications
            .iter()
            .any(|notification| notification.handle == handle)
        {
            return Err(ParticipantError::Duplicate { handle });
        }
        self.notifications.push(Notification { handle, argument });
        Ok(())
    }

    /// Notifications in recording order.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Notified handles in recording order.
    #[must_use]
    pub fn handles(&self) -> Vec<&ElementHandle> {
        self.notifications.iter().map(Notification::handle).collect()
    }

    /// Arguments in recording order.
    #[must_use]
    pub fn arguments(&self) -> Vec<&ParticipantArgument> {
        self.notifications
            .iter()
            .map(Notification::argument)
            .collect()
    }

    /// Number of notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    /// Returns `true` when nothing was notified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Compares the recorded notifications against an expectation, in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`NotificationMismatch`] found.
    pub fn assert_notifications(
        &self,
        expected_handles: &[ElementHandle],
        expected_arguments: &[ParticipantArgument],
    ) -> Result<(), NotificationMismatch> {
        if expected_handles.len() != expected_arguments.len() {
            return Err(NotificationMismatch::UnbalancedExpectation {
                handles: expected_handles.len(),
                arguments: expected_arguments.len(),
            });
        }
        if expected_handles.len() != self.notifications.len() {
            return Err(NotificationMismatch::Count {
                expected: expected_handles.len(),
                actual: self.notifications.len(),
            });
        }
        let expectations = expected_handles.iter().zip(expected_arguments);
        for (index, (notification, (handle, argument))) in
            self.notifications.iter().zip(expectations).enumerate()
        {
            if &notification.handle != handle {
                return Err(NotificationMismatch::Handle {
                    index,
                    expected: handle.clone(),
                    actual: notification.handle.clone(),
                });
            }
            if &notification.argument != argument {
                return Err(NotificationMismatch::Argument {
                    index,
                    handle: handle.clone(),
                    expected: argument.clone(),
                    actual: notification.argument.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
