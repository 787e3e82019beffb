//! Renaming a field and, optionally, its accessors.

use heddle_core::{
    BackingStore, CancellationToken, Capabilities, Change, CompositeChange, DescriptorFlags,
    DocumentPath, ParticipantArgument, ParticipantRegistry, Refactoring, RefactoringContribution,
    RefactoringDescriptor,
};
use heddle_status::Status;
use tracing::debug;

use crate::arguments::{self, INPUT, NAME};
use crate::source::{self, EditSet, Region};

const RENAME_FIELD_TARGET: &str = "heddle_refactorings::rename_field";

/// Descriptor id of [`RenameFieldRefactoring`].
pub const RENAME_FIELD_ID: &str = "heddle.rename.field";

const FIELD_ARGUMENT: &str = "field";
const ACCESSOR_PREFIXES: [&str; 3] = ["get", "is", "set"];

/// Renames field `count` of type `p.A` to `total`.
///
/// With derived-element updating, the accessors `getCount`, `isCount` and
/// `setCount` that the type declares are renamed to match. Participants are
/// told about the field and about each renamed accessor.
#[derive(Debug, Clone)]
pub struct RenameFieldRefactoring {
    declaring_type: String,
    field: String,
    new_name: String,
    capabilities: Capabilities,
}

/// An accessor renamed along with the field.
struct Accessor {
    old: String,
    new: String,
}

impl RenameFieldRefactoring {
    /// Renames `field` of the type with qualified name `declaring_type`.
    ///
    /// Reference updating starts enabled and accessor renaming disabled.
    #[must_use]
    pub fn new(
        declaring_type: impl Into<String>,
        field: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            field: field.into(),
            new_name: new_name.into(),
            capabilities: Capabilities::none()
                .with_reference_updating(true)
                .with_derived_element_updating(false),
        }
    }

    /// Current field name.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Requested field name.
    #[must_use]
    pub fn new_name(&self) -> &str {
        &self.new_name
    }

    fn document(&self) -> DocumentPath {
        source::type_document(&self.declaring_type)
    }

    /// Accessors the declaring type actually declares, in prefix order.
    fn accessors(&self, content: &str) -> Vec<Accessor> {
        if !self.capabilities.update_derived_elements() {
            return Vec::new();
        }
        ACCESSOR_PREFIXES
            .iter()
            .map(|prefix| Accessor {
                old: accessor_name(prefix, &self.field),
                new: accessor_name(prefix, &self.new_name),
            })
            .filter(|accessor| source::declares_method(content, &accessor.old))
            .collect()
    }

    fn collect_edits(&self, store: &dyn BackingStore, accessors: &[Accessor]) -> EditSet {
        let declaring_document = self.document();
        let mut edits = EditSet::default();
        let renames: Vec<(&str, &str)> =
            std::iter::once((self.field.as_str(), self.new_name.as_str()))
                .chain(
                    accessors
                        .iter()
                        .map(|accessor| (accessor.old.as_str(), accessor.new.as_str())),
                )
                .collect();
        for path in store.document_paths() {
            if !source::is_source(&path) {
                continue;
            }
            let Some(content) = store.read(&path) else {
                continue;
            };
            let declaring = path == declaring_document;
            if !declaring
                && !(self.capabilities.update_references()
                    && source::sees_type(&path, content, &self.declaring_type))
            {
                continue;
            }
            for (old, new) in &renames {
                for token in source::occurrences(content, old) {
                    if token.region != Region::Code {
                        continue;
                    }
                    let qualified_access = source::previous_significant(content, token.start)
                        .is_some_and(|ch| ch == '.');
                    if declaring || qualified_access {
                        edits.replace(&path, token.start, token.end, *new);
                    }
                }
            }
        }
        edits
    }
}

fn accessor_name(prefix: &str, field: &str) -> String {
    let mut chars = field.chars();
    chars.next().map_or_else(
        || prefix.to_owned(),
        |first| format!("{prefix}{}{}", first.to_uppercase(), chars.as_str()),
    )
}

impl Refactoring for RenameFieldRefactoring {
    fn name(&self) -> String {
        format!(
            "Rename field '{}.{}' to '{}'",
            self.declaring_type, self.field, self.new_name
        )
    }

    fn check_initial_conditions(
        &mut self,
        store: &dyn BackingStore,
        _token: &CancellationToken,
    ) -> Status {
        let mut status = Status::ok();
        if !source::is_identifier(&self.new_name) {
            status.add_fatal(format!("'{}' is not a valid field name", self.new_name));
        }
        match store.read(&self.document()) {
            None => status.add_fatal(format!("Type '{}' does not exist", self.declaring_type)),
            Some(content) if !source::declares_field(content, &self.field) => {
                status.add_fatal(format!(
                    "Field '{}' is not declared in type '{}'",
                    self.field, self.declaring_type
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
        if self.new_name == self.field {
            status.add_fatal("The new name must differ from the current name");
            return status;
        }
        let Some(content) = store.read(&self.document()) else {
            status.add_fatal(format!("Type '{}' does not exist", self.declaring_type));
            return status;
        };
        if source::declares_field(content, &self.new_name) {
            status.add_error(format!(
                "Field '{}' already exists in type '{}'",
                self.new_name, self.declaring_type
            ));
        }
        for accessor in self.accessors(content) {
            if source::declares_method(content, &accessor.new) {
                status.add_error(format!(
                    "Method '{}' already exists in type '{}'",
                    accessor.new, self.declaring_type
                ));
            }
        }
        status
    }

    fn create_change(
        &mut self,
        store: &dyn BackingStore,
        participants: &mut ParticipantRegistry,
        _token: &CancellationToken,
    ) -> Result<Box<dyn Change>, Status> {
        let content = store
            .read(&self.document())
            .ok_or_else(|| Status::fatal(format!("Type '{}' does not exist", self.declaring_type)))?;
        let accessors = self.accessors(content);
        let update_references = self.capabilities.update_references();

        arguments::notify(
            participants,
            format!("field:{}.{}", self.declaring_type, self.field),
            ParticipantArgument::Rename {
                new_name: self.new_name.clone(),
                update_references,
            },
        )?;
        for accessor in &accessors {
            arguments::notify(
                participants,
                format!("method:{}.{}", self.declaring_type, accessor.old),
                ParticipantArgument::Rename {
                    new_name: accessor.new.clone(),
                    update_references,
                },
            )?;
        }

        let mut root = CompositeChange::new(self.name());
        for change in self.collect_edits(store, &accessors).into_changes(store)? {
            root.add(Box::new(change));
        }
        debug!(
            target: RENAME_FIELD_TARGET,
            field = %self.field,
            accessors = accessors.len(),
            edited_documents = root.len(),
            "field rename change built"
        );
        Ok(Box::new(root))
    }

    fn create_descriptor(&self) -> RefactoringDescriptor {
        let descriptor = RefactoringDescriptor::new(RENAME_FIELD_ID, self.name())
            .with_flags(DescriptorFlags::STRUCTURAL_CHANGE | DescriptorFlags::MULTI_CHANGE)
            .with_argument(INPUT, self.declaring_type.as_str())
            .with_argument(FIELD_ARGUMENT, self.field.as_str())
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

/// Rebuilds [`RenameFieldRefactoring`] from its descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameFieldContribution;

impl RefactoringContribution for RenameFieldContribution {
    fn id(&self) -> &str {
        RENAME_FIELD_ID
    }

    fn create_refactoring(
        &self,
        descriptor: &RefactoringDescriptor,
    ) -> Result<Box<dyn Refactoring>, Status> {
        let mut refactoring = RenameFieldRefactoring::new(
            descriptor.required_argument(INPUT)?,
            descriptor.required_argument(FIELD_ARGUMENT)?,
            descriptor.required_argument(NAME)?,
        );
        arguments::read_capabilities(descriptor, &mut refactoring.capabilities)?;
        Ok(Box::new(refactoring))
    }
}
