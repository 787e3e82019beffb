//! Moving, copying and deleting whole documents.

use heddle_core::{
    BackingStore, CancellationToken, Change, CompositeChange, CreateDocumentChange,
    DeleteDocumentChange, DescriptorFlags, DocumentPath, ParticipantArgument, ParticipantRegistry,
    Refactoring, RefactoringContribution, RefactoringDescriptor, RenameDocumentChange,
};
use heddle_status::Status;
use tracing::debug;

use crate::arguments::{self, DESTINATION, INPUT, NAME};
use crate::source;

const DOCUMENTS_TARGET: &str = "heddle_refactorings::documents";

/// Descriptor id of [`MoveDocumentRefactoring`].
pub const MOVE_DOCUMENT_ID: &str = "heddle.move.document";
/// Descriptor id of [`CopyDocumentRefactoring`].
pub const COPY_DOCUMENT_ID: &str = "heddle.copy.document";
/// Descriptor id of [`DeleteDocumentRefactoring`].
pub const DELETE_DOCUMENT_ID: &str = "heddle.delete.document";

fn missing(path: &DocumentPath) -> Status {
    Status::fatal(format!("Document '{path}' does not exist"))
}

fn wrap(name: String, change: Box<dyn Change>) -> Box<dyn Change> {
    Box::new(CompositeChange::new(name).with_child(change))
}

/// Moves a document into another directory, keeping its file name.
#[derive(Debug, Clone)]
pub struct MoveDocumentRefactoring {
    source: DocumentPath,
    destination: String,
}

impl MoveDocumentRefactoring {
    /// Moves `source` into directory `destination`.
    #[must_use]
    pub fn new(source: impl Into<DocumentPath>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Path the document ends up at.
    #[must_use]
    pub fn target(&self) -> DocumentPath {
        DocumentPath::join(&self.destination, self.source.file_name())
    }
}

impl Refactoring for MoveDocumentRefactoring {
    fn name(&self) -> String {
        format!("Move '{}' to '{}'", self.source, self.destination)
    }

    fn check_initial_conditions(
        &mut self,
        store: &dyn BackingStore,
        _token: &CancellationToken,
    ) -> Status {
        if store.exists(&self.source) {
            Status::ok()
        } else {
            missing(&self.source)
        }
    }

    fn check_final_conditions(
        &mut self,
        store: &dyn BackingStore,
        _token: &CancellationToken,
    ) -> Status {
        let target = self.target();
        if target == self.source {
            return Status::fatal(format!(
                "Document '{}' is already in '{}'",
                self.source, self.destination
            ));
        }
        if store.exists(&target) {
            return Status::error(format!(
                "Document '{}' already exists in '{}'",
                self.source.file_name(),
                self.destination
            ));
        }
        Status::ok()
    }

    fn create_change(
        &mut self,
        store: &dyn BackingStore,
        participants: &mut ParticipantRegistry,
        _token: &CancellationToken,
    ) -> Result<Box<dyn Change>, Status> {
        if !store.exists(&self.source) {
            return Err(missing(&self.source));
        }
        arguments::notify(
            participants,
            format!("document:{}", self.source),
            ParticipantArgument::Move {
                destination: self.destination.clone(),
                update_references: false,
            },
        )?;
        let target = self.target();
        debug!(target: DOCUMENTS_TARGET, from = %self.source, to = %target, "move change built");
        Ok(wrap(
            self.name(),
            Box::new(RenameDocumentChange::new(
                format!("Move '{}' to '{target}'", self.source),
                self.source.clone(),
                target,
            )),
        ))
    }

    fn create_descriptor(&self) -> RefactoringDescriptor {
        RefactoringDescriptor::new(MOVE_DOCUMENT_ID, self.name())
            .with_flags(DescriptorFlags::STRUCTURAL_CHANGE)
            .with_argument(INPUT, self.source.as_str())
            .with_argument(DESTINATION, self.destination.as_str())
    }
}

/// Copies a document into a directory, optionally under a new file name.
#[derive(Debug, Clone)]
pub struct CopyDocumentRefactoring {
    source: DocumentPath,
    destination: String,
    new_name: Option<String>,
}

impl CopyDocumentRefactoring {
    /// Copies `source` into directory `destination` under its own name.
    #[must_use]
    pub fn new(source: impl Into<DocumentPath>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            new_name: None,
        }
    }

    /// Uses `file_name` for the copy instead of the source's file name.
    #[must_use]
    pub fn with_new_name(mut self, file_name: impl Into<String>) -> Self {
        self.new_name = Some(file_name.into());
        self
    }

    /// Path of the copy.
    #[must_use]
    pub fn target(&self) -> DocumentPath {
        let file_name = self
            .new_name
            .as_deref()
            .unwrap_or_else(|| self.source.file_name());
        DocumentPath::join(&self.destination, file_name)
    }
}

impl Refactoring for CopyDocumentRefactoring {
    fn name(&self) -> String {
        format!("Copy '{}' to '{}'", self.source, self.target())
    }

    fn check_initial_conditions(
        &mut self,
        store: &dyn BackingStore,
        _token: &CancellationToken,
    ) -> Status {
        let mut status = Status::ok();
        if !store.exists(&self.source) {
            status.add_fatal(format!("Document '{}' does not exist", self.source));
        }
        if let Some(file_name) = self
            .new_name
            .as_ref()
            .filter(|candidate| candidate.is_empty() || candidate.contains('/'))
        {
            status.add_fatal(format!("'{file_name}' is not a valid file name"));
        }
        status
    }

    fn check_final_conditions(
        &mut self,
        store: &dyn BackingStore,
        _token: &CancellationToken,
    ) -> Status {
        let target = self.target();
        if store.exists(&target) {
            Status::error(format!("Document '{target}' already exists"))
        } else {
            Status::ok()
        }
    }

    fn create_change(
        &mut self,
        store: &dyn BackingStore,
        participants: &mut ParticipantRegistry,
        _token: &CancellationToken,
    ) -> Result<Box<dyn Change>, Status> {
        let content = store.read(&self.source).ok_or_else(|| missing(&self.source))?;
        let target = self.target();
        arguments::notify(
            participants,
            format!("document:{}", self.source),
            ParticipantArgument::Copy {
                destination: self.destination.clone(),
            },
        )?;
        arguments::notify(
            participants,
            format!("document:{target}"),
            ParticipantArgument::Create,
        )?;
        debug!(target: DOCUMENTS_TARGET, from = %self.source, to = %target, "copy change built");
        Ok(wrap(
            self.name(),
            Box::new(CreateDocumentChange::new(
                format!("Create '{target}'"),
                target,
                content,
            )),
        ))
    }

    fn create_descriptor(&self) -> RefactoringDescriptor {
        let descriptor = RefactoringDescriptor::new(COPY_DOCUMENT_ID, self.name())
            .with_argument(INPUT, self.source.as_str())
            .with_argument(DESTINATION, self.destination.as_str());
        self.new_name.iter().fold(descriptor, |described, file_name| {
            described.with_argument(NAME, file_name.as_str())
        })
    }
}

/// Deletes a document.
///
/// Deleting a type that other source documents still use is allowed but
/// reported as a warning.
#[derive(Debug, Clone)]
pub struct DeleteDocumentRefactoring {
    path: DocumentPath,
}

impl DeleteDocumentRefactoring {
    /// Deletes the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<DocumentPath>) -> Self {
        Self { path: path.into() }
    }

    /// Source documents other than the deleted one that use its type.
    fn referencing_documents(&self, store: &dyn BackingStore) -> Vec<DocumentPath> {
        if !source::is_source(&self.path) {
            return Vec::new();
        }
        let stem = self.path.file_stem();
        let qualified = source::qualify(&self.path.parent().replace('/', "."), stem);
        store
            .document_paths()
            .into_iter()
            .filter(|path| path != &self.path && source::is_source(path))
            .filter(|path| {
                store.read(path).is_some_and(|content| {
                    source::sees_type(path, content, &qualified)
                        && source::occurrences(content, stem)
                            .iter()
                            .any(|token| token.region == source::Region::Code)
                })
            })
            .collect()
    }
}

impl Refactoring for DeleteDocumentRefactoring {
    fn name(&self) -> String {
        format!("Delete '{}'", self.path)
    }

    fn check_initial_conditions(
        &mut self,
        store: &dyn BackingStore,
        _token: &CancellationToken,
    ) -> Status {
        if store.exists(&self.path) {
            Status::ok()
        } else {
            missing(&self.path)
        }
    }

    fn check_final_conditions(
        &mut self,
        store: &dyn BackingStore,
        _token: &CancellationToken,
    ) -> Status {
        let mut status = Status::ok();
        for path in self.referencing_documents(store) {
            status.add_warning(format!("'{}' is still used by '{path}'", self.path));
        }
        status
    }

    fn create_change(
        &mut self,
        store: &dyn BackingStore,
        participants: &mut ParticipantRegistry,
        _token: &CancellationToken,
    ) -> Result<Box<dyn Change>, Status> {
        if !store.exists(&self.path) {
            return Err(missing(&self.path));
        }
        arguments::notify(
            participants,
            format!("document:{}", self.path),
            ParticipantArgument::Delete,
        )?;
        debug!(target: DOCUMENTS_TARGET, path = %self.path, "delete change built");
        Ok(wrap(
            self.name(),
            Box::new(DeleteDocumentChange::for_document(
                store,
                self.name(),
                self.path.clone(),
            )),
        ))
    }

    fn create_descriptor(&self) -> RefactoringDescriptor {
        RefactoringDescriptor::new(DELETE_DOCUMENT_ID, self.name())
            .with_flags(DescriptorFlags::BREAKING_CHANGE)
            .with_argument(INPUT, self.path.as_str())
    }
}

/// Rebuilds [`MoveDocumentRefactoring`] from its descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveDocumentContribution;

impl RefactoringContribution for MoveDocumentContribution {
    fn id(&self) -> &str {
        MOVE_DOCUMENT_ID
    }

    fn create_refactoring(
        &self,
        descriptor: &RefactoringDescriptor,
    ) -> Result<Box<dyn Refactoring>, Status> {
        Ok(Box::new(MoveDocumentRefactoring::new(
            descriptor.required_argument(INPUT)?,
            descriptor.required_argument(DESTINATION)?,
        )))
    }
}

/// Rebuilds [`CopyDocumentRefactoring`] from its descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyDocumentContribution;

impl RefactoringContribution for CopyDocumentContribution {
    fn id(&self) -> &str {
        COPY_DOCUMENT_ID
    }

    fn create_refactoring(
        &self,
        descriptor: &RefactoringDescriptor,
    ) -> Result<Box<dyn Refactoring>, Status> {
        Ok(Box::new(CopyDocumentRefactoring {
            source: descriptor.required_argument(INPUT)?.into(),
            destination: descriptor.required_argument(DESTINATION)?.to_owned(),
            new_name: descriptor.argument(NAME).map(str::to_owned),
        }))
    }
}

/// Rebuilds [`DeleteDocumentRefactoring`] from its descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteDocumentContribution;

impl RefactoringContribution for DeleteDocumentContribution {
    fn id(&self) -> &str {
        DELETE_DOCUMENT_ID
    }

    fn create_refactoring(
        &self,
        descriptor: &RefactoringDescriptor,
    ) -> Result<Box<dyn Refactoring>, Status> {
        Ok(Box::new(DeleteDocumentRefactoring::new(
            descriptor.required_argument(INPUT)?,
        )))
    }
}
