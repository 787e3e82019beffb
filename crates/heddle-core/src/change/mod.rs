//! Change trees and their inverses.
//!
//! A [`Change`] is a reversible unit of modification. Performing a change
//! consumes it and yields its inverse, which is itself a change that restores
//! the prior state when performed against the resulting store. A change
//! without an inverse returns `None` and makes the whole operation
//! irreversible.
//!
//! Before a change runs, [`Change::is_valid`] compares the store against the
//! content stamps captured when the change was built. A validation status at
//! ERROR or above means the change must not be performed.

mod composite;
mod document;
mod text;

use std::fmt;

use heddle_status::Status;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::handle::DocumentPath;
use crate::store::{BackingStore, StoreError};

pub use composite::CompositeChange;
pub use document::{CreateDocumentChange, DeleteDocumentChange, RenameDocumentChange};
pub use text::{Position, TextChange, TextEdit, TextRange};

/// Errors raised while performing a change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeError {
    /// The store rejected an edit.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A text edit addresses a position outside the document.
    #[error("invalid edit position in '{path}': {message}")]
    InvalidPosition {
        /// Document being edited.
        path: DocumentPath,
        /// Description of the offending position.
        message: String,
    },

    /// Two text edits overlap.
    #[error("overlapping edits in '{path}'")]
    OverlappingEdits {
        /// Document being edited.
        path: DocumentPath,
    },

    /// A change failed for a reason of its own.
    #[error("change '{name}' failed: {message}")]
    Failed {
        /// Name of the failing change.
        name: String,
        /// Failure description.
        message: String,
    },
}

/// Reversible unit of modification.
///
/// # Example
///
/// ```
/// use heddle_core::{BackingStore, Change, DocumentPath, InMemoryWorkspace, Position, TextChange, TextEdit};
///
/// let mut store = InMemoryWorkspace::new();
/// store.insert("a.txt", "hello world");
/// let path = DocumentPath::new("a.txt");
///
/// let change = TextChange::for_document(
///     &store,
///     "Rename greeting",
///     path.clone(),
///     vec![TextEdit::from_positions(Position::new(0, 0), Position::new(0, 5), "howdy")],
/// );
/// assert!(change.is_valid(&store).is_ok());
///
/// let inverse = Box::new(change).perform(&mut store).expect("applies").expect("reversible");
/// assert_eq!(store.read(&path), Some("howdy world"));
///
/// let _redo = inverse.perform(&mut store).expect("undo applies");
/// assert_eq!(store.read(&path), Some("hello world"));
/// ```
pub trait Change: fmt::Debug {
    /// Human-readable label, used for undo entries.
    fn name(&self) -> String;

    /// Checks that the change can still be performed against `store`.
    ///
    /// A result at ERROR or above means the change must not run. Drift
    /// since the change was created is reported as FATAL.
    fn is_valid(&self, store: &dyn BackingStore) -> Status;

    /// Applies the change and returns its inverse.
    ///
    /// Consuming `self` guarantees a change is performed at most once.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeError`] when an edit cannot be applied. Callers are
    /// expected to run changes inside [`BackingStore::run_atomic`] so that a
    /// failure leaves no partial state behind.
    fn perform(
        self: Box<Self>,
        store: &mut dyn BackingStore,
    ) -> Result<Option<Box<dyn Change>>, ChangeError>;

    /// Direct children of a composite change.
    fn children(&self) -> &[Box<dyn Change>] {
        &[]
    }

    /// Documents this change touches.
    fn affected_documents(&self) -> Vec<DocumentPath>;
}

/// Digest of a document's content at the time a change was created.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentStamp([u8; 32]);

impl ContentStamp {
    /// Stamps `content`.
    #[must_use]
    pub fn of(content: &str) -> Self {
        Self(Sha256::digest(content.as_bytes()).into())
    }

    /// Returns `true` when `content` hashes to this stamp.
    #[must_use]
    pub fn matches(&self, content: &str) -> bool {
        *self == Self::of(content)
    }
}

impl fmt::Debug for ContentStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentStamp(")?;
        for byte in self.0.iter().take(6) {
            write!(f, "{byte:02x}")?;
        }
        f.write_str("..)")
    }
}

/// Shared validation: the document must exist and, when stamped, still hold
/// the stamped content.
fn validate_stamp(
    store: &dyn BackingStore,
    path: &DocumentPath,
    stamp: Option<&ContentStamp>,
) -> Status {
    let Some(content) = store.read(path) else {
        return Status::fatal(format!("Document '{path}' no longer exists"));
    };
    match stamp {
        Some(stamp) if !stamp.matches(content) => Status::fatal(format!(
            "Document '{path}' has been modified since the change was created"
        )),
        _ => Status::ok(),
    }
}

/// Change that does nothing and is its own inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullChange {
    name: String,
}

impl NullChange {
    /// Creates a no-op change with a label.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Change for NullChange {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_valid(&self, _store: &dyn BackingStore) -> Status {
        Status::ok()
    }

    fn perform(
        self: Box<Self>,
        _store: &mut dyn BackingStore,
    ) -> Result<Option<Box<dyn Change>>, ChangeError> {
        Ok(Some(self))
    }

    fn affected_documents(&self) -> Vec<DocumentPath> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests;
