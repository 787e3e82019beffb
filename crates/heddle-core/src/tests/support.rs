//! Scriptable refactoring used by the pipeline, session and round-trip
//! tests.

use heddle_config::EngineConfig;
use heddle_status::Status;
use tracing_subscriber::fmt::TestWriter;

use crate::{
    BackingStore, CancellationToken, Change, ChangeError, CompositeChange, ContributionRegistry,
    DeleteDocumentChange, DescriptorFlags, DocumentPath, ElementHandle, ParticipantArgument,
    ParticipantRegistry, Position, Refactoring, RefactoringContribution, RefactoringDescriptor,
    TextChange, TextEdit,
};

pub(crate) const APPEND_ID: &str = "heddle.test.append";

/// Routes engine events at `debug` into the test runner's captured output.
pub(crate) fn capture_logs() {
    let config = EngineConfig::default().with_log_filter("warn,heddle_core=debug");
    crate::telemetry::initialise_with(&config, TestWriter::new())
        .expect("test telemetry installs");
}

/// Appends a suffix to one document, with every pipeline outcome
/// scriptable.
#[derive(Debug, Clone)]
pub(crate) struct AppendRefactoring {
    pub(crate) path: DocumentPath,
    pub(crate) suffix: String,
    pub(crate) initial: Status,
    pub(crate) fin: Status,
    pub(crate) creation_failure: Option<Status>,
    pub(crate) reversible: bool,
    pub(crate) broken_tail: bool,
    pub(crate) objection: Option<Status>,
    pub(crate) cancel_in_initial: bool,
    pub(crate) descriptor_suffix: Option<String>,
    pub(crate) notifications: Vec<(ElementHandle, ParticipantArgument)>,
    pub(crate) initial_calls: usize,
    pub(crate) final_calls: usize,
    pub(crate) create_calls: usize,
}

impl AppendRefactoring {
    pub(crate) fn new(path: &str, suffix: &str) -> Self {
        Self {
            path: DocumentPath::new(path),
            suffix: suffix.to_owned(),
            initial: Status::ok(),
            fin: Status::ok(),
            creation_failure: None,
            reversible: true,
            broken_tail: false,
            objection: None,
            cancel_in_initial: false,
            descriptor_suffix: None,
            notifications: Vec::new(),
            initial_calls: 0,
            final_calls: 0,
            create_calls: 0,
        }
    }

    pub(crate) fn with_initial(mut self, status: Status) -> Self {
        self.initial = status;
        self
    }

    pub(crate) fn with_final(mut self, status: Status) -> Self {
        self.fin = status;
        self
    }

    pub(crate) fn failing_creation(mut self, status: Status) -> Self {
        self.creation_failure = Some(status);
        self
    }

    pub(crate) fn irreversible(mut self) -> Self {
        self.reversible = false;
        self
    }

    /// Adds a child that deletes a missing document, which fails both
    /// validation and application.
    pub(crate) fn with_broken_tail(mut self) -> Self {
        self.broken_tail = true;
        self
    }

    /// Makes the created change report `status` when validated.
    pub(crate) fn with_objection(mut self, status: Status) -> Self {
        self.objection = Some(status);
        self
    }

    pub(crate) fn cancelling_in_initial(mut self) -> Self {
        self.cancel_in_initial = true;
        self
    }

    /// Makes the descriptor lie about the suffix.
    pub(crate) fn with_descriptor_suffix(mut self, suffix: &str) -> Self {
        self.descriptor_suffix = Some(suffix.to_owned());
        self
    }

    pub(crate) fn notifying(mut self, handle: &str, argument: ParticipantArgument) -> Self {
        self.notifications
            .push((ElementHandle::new(handle), argument));
        self
    }
}

impl Refactoring for AppendRefactoring {
    fn name(&self) -> String {
        format!("Append to {}", self.path)
    }

    fn check_initial_conditions(
        &mut self,
        store: &dyn BackingStore,
        token: &CancellationToken,
    ) -> Status {
        self.initial_calls += 1;
        if self.cancel_in_initial {
            token.cancel();
        }
        let mut status = self.initial.clone();
        if !store.exists(&self.path) {
            status.add_fatal(format!("Document '{}' does not exist", self.path));
        }
        status
    }

    fn check_final_conditions(
        &mut self,
        _store: &dyn BackingStore,
        _token: &CancellationToken,
    ) -> Status {
        self.final_calls += 1;
        self.fin.clone()
    }

    fn create_change(
        &mut self,
        store: &dyn BackingStore,
        participants: &mut ParticipantRegistry,
        _token: &CancellationToken,
    ) -> Result<Box<dyn Change>, Status> {
        self.create_calls += 1;
        if let Some(failure) = &self.creation_failure {
            return Err(failure.clone());
        }
        for (handle, argument) in &self.notifications {
            participants
                .record(handle.clone(), argument.clone())
                .map_err(|error| Status::fatal(error.to_string()))?;
        }
        let content = store
            .read(&self.path)
            .ok_or_else(|| Status::fatal(format!("Document '{}' does not exist", self.path)))?;
        let end = Position::at_offset(content, content.len())
            .ok_or_else(|| Status::fatal("document end is not addressable"))?;
        let edit = TextChange::for_document(
            store,
            self.name(),
            self.path.clone(),
            vec![TextEdit::insert_at(end, self.suffix.clone())],
        );
        let mut root = CompositeChange::new(self.name()).with_child(Box::new(edit));
        if self.broken_tail {
            root.add(Box::new(DeleteDocumentChange::new(
                "Delete missing document",
                DocumentPath::new("missing.txt"),
            )));
        }
        if let Some(objection) = self.objection.clone() {
            return Ok(Box::new(ObjectingChange {
                inner: Box::new(root),
                objection,
            }));
        }
        Ok(Box::new(root))
    }

    fn create_descriptor(&self) -> RefactoringDescriptor {
        let suffix = self.descriptor_suffix.as_deref().unwrap_or(&self.suffix);
        RefactoringDescriptor::new(APPEND_ID, self.name())
            .with_flags(DescriptorFlags::MULTI_CHANGE)
            .with_argument("path", self.path.as_str())
            .with_argument("suffix", suffix)
            .with_argument("reversible", self.reversible.to_string())
    }

    fn provides_undo(&self) -> bool {
        self.reversible
    }
}

/// Change that performs `inner` but adds `objection` to its validation.
#[derive(Debug)]
pub(crate) struct ObjectingChange {
    inner: Box<dyn Change>,
    objection: Status,
}

impl Change for ObjectingChange {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn is_valid(&self, store: &dyn BackingStore) -> Status {
        self.inner.is_valid(store).merged(self.objection.clone())
    }

    fn perform(
        self: Box<Self>,
        store: &mut dyn BackingStore,
    ) -> Result<Option<Box<dyn Change>>, ChangeError> {
        self.inner.perform(store)
    }

    fn affected_documents(&self) -> Vec<DocumentPath> {
        self.inner.affected_documents()
    }
}

pub(crate) struct AppendContribution;

impl RefactoringContribution for AppendContribution {
    fn id(&self) -> &str {
        APPEND_ID
    }

    fn create_refactoring(
        &self,
        descriptor: &RefactoringDescriptor,
    ) -> Result<Box<dyn Refactoring>, Status> {
        let mut refactoring = AppendRefactoring::new(
            descriptor.required_argument("path")?,
            descriptor.required_argument("suffix")?,
        );
        refactoring.reversible = descriptor.bool_argument("reversible", true)?;
        Ok(Box::new(refactoring))
    }
}

pub(crate) fn registry() -> ContributionRegistry {
    let mut registry = ContributionRegistry::new();
    registry
        .register(Box::new(AppendContribution))
        .expect("fresh registry accepts the contribution");
    registry
}
