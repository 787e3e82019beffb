//! Renaming a top-level type together with its compilation unit.

use heddle_core::{
    BackingStore, CancellationToken, Capabilities, Change, CompositeChange, DescriptorFlags,
    DocumentPath, ParticipantArgument, ParticipantRegistry, Refactoring, RefactoringContribution,
    RefactoringDescriptor, RenameDocumentChange,
};
use heddle_status::Status;
use tracing::debug;

use crate::arguments::{self, INPUT, NAME};
use crate::source::{self, EditSet, Region};

const RENAME_TYPE_TARGET: &str = "heddle_refactorings::rename_type";

/// Descriptor id of [`RenameTypeRefactoring`].
pub const RENAME_TYPE_ID: &str = "heddle.rename.type";

/// Renames type `p.A` to `p.B`.
///
/// The declaring document `p/A.java` is edited and renamed to `p/B.java`.
/// Depending on the capabilities, code references in other documents,
/// occurrences in comments and string literals, and fully qualified names
/// in matching non-source documents are updated as well. Participants are
/// told about the type and about its compilation unit.
#[derive(Debug, Clone)]
pub struct RenameTypeRefactoring {
    qualified: String,
    new_name: String,
    capabilities: Capabilities,
}

impl RenameTypeRefactoring {
    /// Renames the type with qualified name `qualified` to `new_name`.
    ///
    /// Reference updating starts enabled; text and qualified-name updating
    /// start disabled.
    #[must_use]
    pub fn new(qualified: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            qualified: qualified.into(),
            new_name: new_name.into(),
            capabilities: Capabilities::none()
                .with_reference_updating(true)
                .with_text_updating(false)
                .with_qualified_name_updating(),
        }
    }

    /// Qualified name of the renamed type.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified
    }

    /// Requested simple name.
    #[must_use]
    pub fn new_name(&self) -> &str {
        &self.new_name
    }

    fn package(&self) -> &str {
        source::split_qualified(&self.qualified).0
    }

    fn old_name(&self) -> &str {
        source::split_qualified(&self.qualified).1
    }

    fn old_document(&self) -> DocumentPath {
        source::type_document(&self.qualified)
    }

    fn new_document(&self) -> DocumentPath {
        source::type_document(&source::qualify(self.package(), &self.new_name))
    }

    fn collect_edits(&self, store: &dyn BackingStore) -> EditSet {
        let old_document = self.old_document();
        let new_qualified = source::qualify(self.package(), &self.new_name);
        let mut edits = EditSet::default();
        for path in store.document_paths() {
            let Some(content) = store.read(&path) else {
                continue;
            };
            if source::is_source(&path) {
                let declaring = path == old_document;
                if !declaring && !source::sees_type(&path, content, &self.qualified) {
                    continue;
                }
                for token in source::occurrences(content, self.old_name()) {
                    let wanted = match token.region {
                        Region::Code => declaring || self.capabilities.update_references(),
                        Region::Comment | Region::Literal => {
                            self.capabilities.update_text_occurrences()
                        }
                    };
                    if wanted {
                        edits.replace(&path, token.start, token.end, self.new_name.as_str());
                    }
                }
            } else if self
                .capabilities
                .qualified_names()
                .is_some_and(|options| options.enabled() && options.matches(path.file_name()))
            {
                for start in source::qualified_occurrences(content, &self.qualified) {
                    edits.replace(
                        &path,
                        start,
                        start + self.qualified.len(),
                        new_qualified.as_str(),
                    );
                }
            }
        }
        edits
    }
}

impl Refactoring for RenameTypeRefactoring {
    fn name(&self) -> String {
        format!("Rename type '{}' to '{}'", self.qualified, self.new_name)
    }

    fn check_initial_conditions(
        &mut self,
        store: &dyn BackingStore,
        _token: &CancellationToken,
    ) -> Status {
        let mut status = Status::ok();
        if !source::is_identifier(&self.new_name) {
            status.add_fatal(format!("'{}' is not a valid type name", self.new_name));
        }
        let document = self.old_document();
        match store.read(&document) {
            None => status.add_fatal(format!("Type '{}' does not exist", self.qualified)),
            Some(content) if !source::declares_type(content, self.old_name()) => {
                status.add_fatal(format!(
                    "Document '{document}' does not declare type '{}'",
                    self.old_name()
                ));
            }
            Some(_) => {}
        }
        status
    }

    fn check_final_conditions(
        &mut self,
        store: &dyn BackingStore,
        _token: &CancellationToken,
    ) -> Status {
        let mut status = Status::ok();
        if self.new_name == self.old_name() {
            status.add_fatal("The new name must differ from the current name");
            return status;
        }
        if !self.new_name.starts_with(char::is_uppercase) {
            status.add_warning("By convention, type names start with an upper-case letter");
        }
        if store.exists(&self.new_document()) {
            status.add_error(format!(
                "Type '{}' already exists in package '{}'",
                self.new_name,
                self.package()
            ));
        }
        status
    }

    fn create_change(
        &mut self,
        store: &dyn BackingStore,
        participants: &mut ParticipantRegistry,
        _token: &CancellationToken,
    ) -> Result<Box<dyn Change>, Status> {
        let update_references = self.capabilities.update_references();
        arguments::notify(
            participants,
            format!("type:{}", self.qualified),
            ParticipantArgument::Rename {
                new_name: self.new_name.clone(),
                update_references,
            },
        )?;
        let old_document = self.old_document();
        let new_document = self.new_document();
        arguments::notify(
            participants,
            format!("unit:{old_document}"),
            ParticipantArgument::Rename {
                new_name: new_document.file_name().to_owned(),
                update_references,
            },
        )?;

        let edits = self.collect_edits(store);
        let mut root = CompositeChange::new(self.name());
        for change in edits.into_changes(store)? {
            root.add(Box::new(change));
        }
        debug!(
            target: RENAME_TYPE_TARGET,
            qualified = %self.qualified,
            edited_documents = root.len(),
            "rename change built"
        );
        root.add(Box::new(RenameDocumentChange::new(
            format!("Rename '{old_document}' to '{new_document}'"),
            old_document,
            new_document,
        )));
        Ok(Box::new(root))
    }

    fn create_descriptor(&self) -> RefactoringDescriptor {
        let descriptor = RefactoringDescriptor::new(RENAME_TYPE_ID, self.name())
            .with_flags(
                DescriptorFlags::STRUCTURAL_CHANGE
                    | DescriptorFlags::MULTI_CHANGE
                    | DescriptorFlags::BREAKING_CHANGE,
            )
            .with_argument(INPUT, self.qualified.as_str())
            .with_argument(NAME, self.new_name.as_str());
        arguments::with_capabilities(descriptor, &self.capabilities)
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn capabilities_mut(&mut self) -> Option<&mut Capabilities> {
        Some(&mut self.capabilities)
    }
}

/// Rebuilds [`RenameTypeRefactoring`] from its descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameTypeContribution;

impl RefactoringContribution for RenameTypeContribution {
    fn id(&self) -> &str {
        RENAME_TYPE_ID
    }

    fn create_refactoring(
        &self,
        descriptor: &RefactoringDescriptor,
    ) -> Result<Box<dyn Refactoring>, Status> {
        let mut refactoring = RenameTypeRefactoring::new(
            descriptor.required_argument(INPUT)?,
            descriptor.required_argument(NAME)?,
        );
        arguments::read_capabilities(descriptor, &mut refactoring.capabilities)?;
        Ok(Box::new(refactoring))
    }
}
