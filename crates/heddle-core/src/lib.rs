//! Execution protocol for workspace refactorings.
//!
//! A refactoring runs through a fixed pipeline. Its preconditions are checked
//! in two phases by a [`ConditionChecker`], and a [`Change`] tree is built.
//! The [`ChangeExecutor`] applies that tree atomically against a
//! [`BackingStore`], and the inverse tree it yields is recorded with an
//! [`UndoManager`]. Interested observers are told about the elements that
//! move or get renamed through the [`ParticipantRegistry`]. Each refactoring
//! can also be serialised to a [`RefactoringDescriptor`] and rebuilt from it.
//!
//! The [`Session`] type wires these pieces together for callers and test
//! harnesses:
//!
//! ```
//! use heddle_config::EngineConfig;
//! use heddle_core::{BackingStore, DocumentPath, InMemoryWorkspace, Session};
//!
//! let mut store = InMemoryWorkspace::new();
//! store.insert("p/A.java", "package p;\nclass A {}\n");
//! let session = Session::new(store, EngineConfig::default());
//! assert!(session.store().exists(&DocumentPath::new("p/A.java")));
//! assert!(!session.undo_manager().anything_to_undo());
//! ```

mod cancel;
mod change;
mod checker;
mod descriptor;
mod executor;
mod handle;
mod participants;
mod refactoring;
mod session;
mod store;
pub mod telemetry;
mod undo;

pub use cancel::CancellationToken;
pub use change::{
    Change, ChangeError, CompositeChange, ContentStamp, CreateDocumentChange,
    DeleteDocumentChange, NullChange, Position, RenameDocumentChange, TextChange, TextEdit,
    TextRange,
};
pub use checker::{CheckError, CheckPhase, CheckState, CheckStyle, ConditionChecker};
pub use descriptor::{
    ContributionRegistry, DescriptorFlags, HistoryEntry, RefactoringContribution,
    RefactoringDescriptor, RefactoringHistory, RegistryError, RoundTripError, verify_equivalence,
};
pub use executor::{
    ChangeExecutor, ExecutionContext, ExecutionError, Performed, PostApplyHook, UndoPolicy,
};
pub use handle::{DocumentPath, ElementHandle};
pub use participants::{
    Notification, NotificationMismatch, ParticipantArgument, ParticipantError,
    ParticipantRegistry,
};
pub use refactoring::{
    Capabilities, Capability, CapabilityError, QualifiedNameOptions, Refactoring,
};
pub use session::{DocumentMismatch, LineMismatch, Session, SessionError, compare_lines};
pub use store::{
    AtomicOperation, BackingStore, DeltaEntry, DeltaKind, DeltaListener, InMemoryWorkspace,
    StoreEdit, StoreError, WorkspaceDelta,
};
pub use undo::{UndoDirection, UndoError, UndoListener, UndoManager, UndoRecord};

#[cfg(test)]
mod tests;
