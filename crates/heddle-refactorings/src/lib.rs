//! Reference refactorings over a Java-like in-memory workspace.
//!
//! These refactorings drive the `heddle_core` execution pipeline end to end.
//! Each one checks its conditions, builds a reversible change tree, notifies
//! participants about every element it affects and describes itself through
//! a descriptor that its contribution can turn back into a refactoring.
//!
//! ```
//! use heddle_config::EngineConfig;
//! use heddle_core::{InMemoryWorkspace, Session};
//! use heddle_refactorings::{RenameTypeRefactoring, contribution_registry};
//!
//! let store = InMemoryWorkspace::with_documents([
//!     ("p/A.java", "package p;\nclass A {}\n"),
//!     ("p/User.java", "package p;\nclass User { A a; }\n"),
//! ]);
//! let registry = contribution_registry().expect("ids are distinct");
//! let mut session = Session::new(store, EngineConfig::default()).with_contributions(registry);
//!
//! let mut rename = RenameTypeRefactoring::new("p.A", "B");
//! let status = session.perform_refactoring(&mut rename).expect("rename runs");
//! assert!(status.is_none());
//! session
//!     .assert_document_eq("p/User.java", "package p;\nclass User { B a; }\n")
//!     .expect("reference updated");
//! ```

mod arguments;
mod documents;
mod rename_field;
mod rename_type;
mod reorder;
mod source;

use heddle_core::{ContributionRegistry, RegistryError};

pub use documents::{
    COPY_DOCUMENT_ID, CopyDocumentContribution, CopyDocumentRefactoring, DELETE_DOCUMENT_ID,
    DeleteDocumentContribution, DeleteDocumentRefactoring, MOVE_DOCUMENT_ID,
    MoveDocumentContribution, MoveDocumentRefactoring,
};
pub use rename_field::{RENAME_FIELD_ID, RenameFieldContribution, RenameFieldRefactoring};
pub use rename_type::{RENAME_TYPE_ID, RenameTypeContribution, RenameTypeRefactoring};
pub use reorder::{CHANGE_SIGNATURE_ID, ReorderParametersContribution, ReorderParametersRefactoring};

/// Registers the contribution of every refactoring in this crate.
///
/// # Errors
///
/// Returns [`RegistryError::Duplicate`] when one of the ids is already
/// registered.
pub fn register_all(registry: &mut ContributionRegistry) -> Result<(), RegistryError> {
    registry.register(Box::new(RenameTypeContribution))?;
    registry.register(Box::new(RenameFieldContribution))?;
    registry.register(Box::new(ReorderParametersContribution))?;
    registry.register(Box::new(MoveDocumentContribution))?;
    registry.register(Box::new(CopyDocumentContribution))?;
    registry.register(Box::new(DeleteDocumentContribution))?;
    Ok(())
}

/// A registry holding every contribution in this crate.
///
/// # Errors
///
/// Returns the error of [`register_all`].
pub fn contribution_registry() -> Result<ContributionRegistry, RegistryError> {
    let mut registry = ContributionRegistry::new();
    register_all(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests;
