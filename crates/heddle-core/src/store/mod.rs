//! The backing store abstraction that changes are applied to.
//!
//! A store owns named text documents. Changes mutate it only through
//! [`StoreEdit`] values. [`BackingStore::run_atomic`] groups the mutations
//! of a whole change tree into one scope that either commits in full or
//! restores the prior contents. Each committed scope produces one
//! [`WorkspaceDelta`], and listeners observe it exactly once.

mod delta;
mod memory;

use thiserror::Error;

use crate::change::ChangeError;
use crate::handle::DocumentPath;

pub use delta::{DeltaEntry, DeltaKind, DeltaListener, WorkspaceDelta};
pub use memory::InMemoryWorkspace;

/// Errors raised by a store while applying an edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The edit targets a document that does not exist.
    #[error("document '{path}' does not exist")]
    Missing {
        /// Path that was looked up.
        path: DocumentPath,
    },

    /// The edit would create a document that already exists.
    #[error("document '{path}' already exists")]
    AlreadyExists {
        /// Path that is taken.
        path: DocumentPath,
    },
}

/// A primitive mutation of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEdit {
    /// Replaces the full content of an existing document.
    Replace {
        /// Document being rewritten.
        path: DocumentPath,
        /// New content.
        content: String,
    },
    /// Creates a document that must not exist yet.
    Create {
        /// Document being created.
        path: DocumentPath,
        /// Initial content.
        content: String,
    },
    /// Removes an existing document.
    Delete {
        /// Document being removed.
        path: DocumentPath,
    },
    /// Moves a document to a path that must not exist yet.
    Rename {
        /// Current path.
        from: DocumentPath,
        /// New path.
        to: DocumentPath,
    },
}

/// Operation run inside an atomic scope.
pub type AtomicOperation<'a> = dyn FnMut(&mut dyn BackingStore) -> Result<(), ChangeError> + 'a;

/// Mutable collection of named documents.
pub trait BackingStore {
    /// Returns the content of a document, or `None` when it does not exist.
    fn read(&self, path: &DocumentPath) -> Option<&str>;

    /// Returns `true` when the document exists.
    fn exists(&self, path: &DocumentPath) -> bool {
        self.read(path).is_some()
    }

    /// Paths of every document, in sorted order.
    fn document_paths(&self) -> Vec<DocumentPath>;

    /// Applies a single edit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the edit's precondition does not hold.
    fn apply(&mut self, edit: StoreEdit) -> Result<(), StoreError>;

    /// Runs `operation` as one atomic scope.
    ///
    /// Every edit applied by the operation commits together, and listeners
    /// are notified once with the resulting delta, even when it is empty.
    /// When the operation fails, the store's content is restored to its
    /// state on entry and no listener is notified. Nested scopes join the
    /// outermost one, return an empty delta and notify nobody.
    ///
    /// # Errors
    ///
    /// Returns the operation's error after restoring the store.
    fn run_atomic(
        &mut self,
        operation: &mut AtomicOperation<'_>,
    ) -> Result<WorkspaceDelta, ChangeError>;
}
