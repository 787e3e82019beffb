//! In-memory store used by sessions, tests and round-trip verification.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use super::{AtomicOperation, BackingStore, DeltaListener, StoreEdit, StoreError, WorkspaceDelta};
use crate::change::ChangeError;
use crate::handle::DocumentPath;

const STORE_TARGET: &str = "heddle_core::store";

/// Documents held in a sorted map.
///
/// Cloning copies the documents but not the listeners, which makes clones
/// suitable as scratch stores.
///
/// # Example
///
/// ```
/// use heddle_core::{BackingStore, DocumentPath, InMemoryWorkspace, StoreEdit};
///
/// let mut store = InMemoryWorkspace::new();
/// store.insert("p/A.java", "class A {}");
/// store
///     .apply(StoreEdit::Rename {
///         from: DocumentPath::new("p/A.java"),
///         to: DocumentPath::new("p/B.java"),
///     })
///     .expect("rename succeeds");
/// assert_eq!(store.read(&DocumentPath::new("p/B.java")), Some("class A {}"));
/// ```
#[derive(Default)]
pub struct InMemoryWorkspace {
    documents: BTreeMap<DocumentPath, String>,
    listeners: Vec<Box<dyn DeltaListener>>,
    scope_depth: usize,
}

impl InMemoryWorkspace {
    /// Creates an empty workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a workspace from `(path, content)` pairs.
    #[must_use]
    pub fn with_documents<I, P, C>(documents: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<DocumentPath>,
        C: Into<String>,
    {
        let mut workspace = Self::new();
        for (path, content) in documents {
            workspace.insert(path, content);
        }
        workspace
    }

    /// Inserts or overwrites a document outside any atomic scope.
    ///
    /// Listeners are not notified; this seeds fixtures.
    pub fn insert(&mut self, path: impl Into<DocumentPath>, content: impl Into<String>) {
        self.documents.insert(path.into(), content.into());
    }

    /// Registers a listener for committed scopes.
    pub fn add_listener(&mut self, listener: Box<dyn DeltaListener>) {
        self.listeners.push(listener);
    }

    /// Snapshot of every document.
    #[must_use]
    pub const fn documents(&self) -> &BTreeMap<DocumentPath, String> {
        &self.documents
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` when the workspace holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn missing(path: &DocumentPath) -> StoreError {
        StoreError::Missing { path: path.clone() }
    }
}

impl Clone for InMemoryWorkspace {
    fn clone(&self) -> Self {
        Self {
            documents: self.documents.clone(),
            listeners: Vec::new(),
            scope_depth: 0,
        }
    }
}

impl fmt::Debug for InMemoryWorkspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryWorkspace")
            .field("documents", &self.documents)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl BackingStore for InMemoryWorkspace {
    fn read(&self, path: &DocumentPath) -> Option<&str> {
        self.documents.get(path).map(String::as_str)
    }

    fn document_paths(&self) -> Vec<DocumentPath> {
        self.documents.keys().cloned().collect()
    }

    fn apply(&mut self, edit: StoreEdit) -> Result<(), StoreError> {
        match edit {
            StoreEdit::Replace { path, content } => {
                let slot = self
                    .documents
                    .get_mut(&path)
                    .ok_or_else(|| Self::missing(&path))?;
                *slot = content;
            }
            StoreEdit::Create { path, content } => {
                if self.documents.contains_key(&path) {
                    return Err(StoreError::AlreadyExists { path });
                }
                self.documents.insert(path, content);
            }
            StoreEdit::Delete { path } => {
                self.documents
                    .remove(&path)
                    .ok_or_else(|| Self::missing(&path))?;
            }
            StoreEdit::Rename { from, to } => {
                if self.documents.contains_key(&to) {
                    return Err(StoreError::AlreadyExists { path: to });
                }
                let content = self
                    .documents
                    .remove(&from)
                    .ok_or_else(|| Self::missing(&from))?;
                self.documents.insert(to, content);
            }
        }
        Ok(())
    }

    fn run_atomic(
        &mut self,
        operation: &mut AtomicOperation<'_>,
    ) -> Result<WorkspaceDelta, ChangeError> {
        if self.scope_depth > 0 {
            operation(self)?;
            return Ok(WorkspaceDelta::empty());
        }

        let snapshot = self.documents.clone();
        self.scope_depth += 1;
        let outcome = operation(self);
        self.scope_depth -= 1;

        if let Err(error) = outcome {
            debug!(
                target: STORE_TARGET,
                error = %error,
                "atomic scope failed; restoring snapshot"
            );
            self.documents = snapshot;
            return Err(error);
        }

        let delta = WorkspaceDelta::between(&snapshot, &self.documents);
        debug!(
            target: STORE_TARGET,
            affected = delta.len(),
            "atomic scope committed"
        );
        for listener in &mut self.listeners {
            listener.workspace_changed(&delta);
        }
        Ok(delta)
    }
}
