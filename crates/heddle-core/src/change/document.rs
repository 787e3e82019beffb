//! Whole-document changes: create, delete and rename.

use heddle_status::Status;

use super::{Change, ChangeError, ContentStamp, validate_stamp};
use crate::handle::DocumentPath;
use crate::store::{BackingStore, StoreEdit, StoreError};

/// Creates a document. The inverse deletes it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDocumentChange {
    name: String,
    path: DocumentPath,
    content: String,
}

impl CreateDocumentChange {
    /// Creates the change.
    #[must_use]
    pub fn new(name: impl Into<String>, path: DocumentPath, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path,
            content: content.into(),
        }
    }

    /// Document to create.
    #[must_use]
    pub const fn path(&self) -> &DocumentPath {
        &self.path
    }
}

impl Change for CreateDocumentChange {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_valid(&self, store: &dyn BackingStore) -> Status {
        if store.exists(&self.path) {
            Status::fatal(format!("Document '{}' already exists", self.path))
        } else {
            Status::ok()
        }
    }

    fn perform(
        self: Box<Self>,
        store: &mut dyn BackingStore,
    ) -> Result<Option<Box<dyn Change>>, ChangeError> {
        let stamp = ContentStamp::of(&self.content);
        store.apply(StoreEdit::Create {
            path: self.path.clone(),
            content: self.content,
        })?;
        Ok(Some(Box::new(DeleteDocumentChange {
            name: self.name,
            path: self.path,
            stamp: Some(stamp),
        })))
    }

    fn affected_documents(&self) -> Vec<DocumentPath> {
        vec![self.path.clone()]
    }
}

/// Deletes a document. The inverse recreates it with its prior content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDocumentChange {
    name: String,
    path: DocumentPath,
    stamp: Option<ContentStamp>,
}

impl DeleteDocumentChange {
    /// Creates an unstamped deletion.
    #[must_use]
    pub fn new(name: impl Into<String>, path: DocumentPath) -> Self {
        Self {
            name: name.into(),
            path,
            stamp: None,
        }
    }

    /// Creates a deletion stamped with the document's current content.
    #[must_use]
    pub fn for_document(store: &dyn BackingStore, name: impl Into<String>, path: DocumentPath) -> Self {
        let stamp = store.read(&path).map(ContentStamp::of);
        Self {
            name: name.into(),
            path,
            stamp,
        }
    }

    /// Document to delete.
    #[must_use]
    pub const fn path(&self) -> &DocumentPath {
        &self.path
    }
}

impl Change for DeleteDocumentChange {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_valid(&self, store: &dyn BackingStore) -> Status {
        validate_stamp(store, &self.path, self.stamp.as_ref())
    }

    fn perform(
        self: Box<Self>,
        store: &mut dyn BackingStore,
    ) -> Result<Option<Box<dyn Change>>, ChangeError> {
        let content = store
            .read(&self.path)
            .map(str::to_owned)
            .ok_or_else(|| StoreError::Missing {
                path: self.path.clone(),
            })?;
        store.apply(StoreEdit::Delete {
            path: self.path.clone(),
        })?;
        Ok(Some(Box::new(CreateDocumentChange {
            name: self.name,
            path: self.path,
            content,
        })))
    }

    fn affected_documents(&self) -> Vec<DocumentPath> {
        vec![self.path.clone()]
    }
}

/// Moves a document to a new path. The inverse moves it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameDocumentChange {
    name: String,
    from: DocumentPath,
    to: DocumentPath,
}

impl RenameDocumentChange {
    /// Creates the change.
    #[must_use]
    pub fn new(name: impl Into<String>, from: DocumentPath, to: DocumentPath) -> Self {
        Self {
            name: name.into(),
            from,
            to,
        }
    }

    /// Current path.
    #[must_use]
    pub const fn source(&self) -> &DocumentPath {
        &self.from
    }

    /// Target path.
    #[must_use]
    pub const fn target(&self) -> &DocumentPath {
        &self.to
    }
}

impl Change for RenameDocumentChange {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_valid(&self, store: &dyn BackingStore) -> Status {
        let mut status = Status::ok();
        if !store.exists(&self.from) {
            status.add_fatal(format!("Document '{}' no longer exists", self.from));
        }
        if store.exists(&self.to) {
            status.add_fatal(format!("Document '{}' already exists", self.to));
        }
        status
    }

    fn perform(
        self: Box<Self>,
        store: &mut dyn BackingStore,
    ) -> Result<Option<Box<dyn Change>>, ChangeError> {
        store.apply(StoreEdit::Rename {
            from: self.from.clone(),
            to: self.to.clone(),
        })?;
        Ok(Some(Box::new(Self {
            name: self.name,
            from: self.to,
            to: self.from,
        })))
    }

    fn affected_documents(&self) -> Vec<DocumentPath> {
        vec![self.from.clone(), self.to.clone()]
    }
}
