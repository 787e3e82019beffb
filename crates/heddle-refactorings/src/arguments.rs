//! Descriptor arguments and notifications shared by the refactorings.

use heddle_core::{
    Capabilities, Capability, ElementHandle, ParticipantArgument, ParticipantRegistry,
    RefactoringDescriptor,
};
use heddle_status::Status;

pub(crate) const INPUT: &str = "input";
pub(crate) const NAME: &str = "name";
pub(crate) const DESTINATION: &str = "destination";

const REFERENCES: &str = "references";
const TEXTUAL: &str = "textual";
const QUALIFIED: &str = "qualified";
const PATTERNS: &str = "patterns";
const DERIVED: &str = "derived";

/// Adds one argument per offered capability.
pub(crate) fn with_capabilities(
    descriptor: RefactoringDescriptor,
    capabilities: &Capabilities,
) -> RefactoringDescriptor {
    let mut described = descriptor;
    if capabilities.supports(Capability::ReferenceUpdating) {
        described =
            described.with_argument(REFERENCES, capabilities.update_references().to_string());
    }
    if capabilities.supports(Capability::TextUpdating) {
        described =
            described.with_argument(TEXTUAL, capabilities.update_text_occurrences().to_string());
    }
    if let Some(options) = capabilities.qualified_names() {
        described = described
            .with_argument(QUALIFIED, options.enabled().to_string())
            .with_argument(PATTERNS, options.file_patterns().join(","));
    }
    if capabilities.supports(Capability::DerivedElementUpdating) {
        described =
            described.with_argument(DERIVED, capabilities.update_derived_elements().to_string());
    }
    described
}

/// Applies the capability arguments of `descriptor` to `capabilities`.
///
/// Absent arguments keep the current value.
pub(crate) fn read_capabilities(
    descriptor: &RefactoringDescriptor,
    capabilities: &mut Capabilities,
) -> Result<(), Status> {
    if capabilities.supports(Capability::ReferenceUpdating) {
        let enabled = descriptor.bool_argument(REFERENCES, capabilities.update_references())?;
        capabilities
            .set_update_references(enabled)
            .map_err(|error| Status::fatal(error.to_string()))?;
    }
    if capabilities.supports(Capability::TextUpdating) {
        let enabled = descriptor.bool_argument(TEXTUAL, capabilities.update_text_occurrences())?;
        capabilities
            .set_update_text_occurrences(enabled)
            .map_err(|error| Status::fatal(error.to_string()))?;
    }
    if capabilities.supports(Capability::QualifiedNameUpdating) {
        let enabled = descriptor.bool_argument(QUALIFIED, capabilities.update_qualified_names())?;
        capabilities
            .set_update_qualified_names(enabled)
            .map_err(|error| Status::fatal(error.to_string()))?;
        if let Some(patterns) = descriptor.argument(PATTERNS) {
            capabilities
                .set_file_patterns(patterns)
                .map_err(|error| Status::fatal(error.to_string()))?;
        }
    }
    if capabilities.supports(Capability::DerivedElementUpdating) {
        let enabled = descriptor.bool_argument(DERIVED, capabilities.update_derived_elements())?;
        capabilities
            .set_update_derived_elements(enabled)
            .map_err(|error| Status::fatal(error.to_string()))?;
    }
    Ok(())
}

/// Records a notification, turning a duplicate into a FATAL status.
pub(crate) fn notify(
    participants: &mut ParticipantRegistry,
    handle: String,
    argument: ParticipantArgument,
) -> Result<(), Status> {
    participants
        .record(ElementHandle::new(handle), argument)
        .map_err(|error| Status::fatal(error.to_string()))
}
