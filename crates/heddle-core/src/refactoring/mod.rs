//! The contract every refactoring implements.

mod capabilities;

use heddle_status::Status;

use crate::cancel::CancellationToken;
use crate::change::Change;
use crate::descriptor::RefactoringDescriptor;
use crate::participants::ParticipantRegistry;
use crate::store::BackingStore;

pub use capabilities::{Capabilities, Capability, CapabilityError, QualifiedNameOptions};

static NO_CAPABILITIES: Capabilities = Capabilities::none();

/// A workspace transformation driven through the execution pipeline.
///
/// The pipeline calls the methods in a fixed order:
///
/// 1. [`check_initial_conditions`](Self::check_initial_conditions) once the
///    refactoring is configured with its target element. A FATAL result ends
///    the run.
/// 2. [`check_final_conditions`](Self::check_final_conditions) once all
///    user input is set. It may be called again after the input changes.
/// 3. [`create_change`](Self::create_change) when the combined status is
///    below the failure severity.
///
/// Implementations may cache analysis results between these calls. They
/// must not mutate the store; every modification goes through the returned
/// change.
pub trait Refactoring {
    /// Human-readable name, used as the undo label.
    fn name(&self) -> String;

    /// Validates that the refactoring applies to its target at all.
    fn check_initial_conditions(
        &mut self,
        store: &dyn BackingStore,
        token: &CancellationToken,
    ) -> Status;

    /// Validates the user-supplied input against the workspace.
    fn check_final_conditions(
        &mut self,
        store: &dyn BackingStore,
        token: &CancellationToken,
    ) -> Status;

    /// Builds the change tree and records element notifications.
    ///
    /// # Errors
    ///
    /// Returns a FATAL status when the change cannot be built.
    fn create_change(
        &mut self,
        store: &dyn BackingStore,
        participants: &mut ParticipantRegistry,
        token: &CancellationToken,
    ) -> Result<Box<dyn Change>, Status>;

    /// Serialisable description of the configured refactoring.
    fn create_descriptor(&self) -> RefactoringDescriptor;

    /// Capability settings. Refactorings without capabilities keep the
    /// default.
    fn capabilities(&self) -> &Capabilities {
        &NO_CAPABILITIES
    }

    /// Mutable capability settings, `None` when nothing is configurable.
    fn capabilities_mut(&mut self) -> Option<&mut Capabilities> {
        None
    }

    /// Whether the performed change may be recorded for undo. An
    /// irreversible refactoring discards the undo history instead.
    fn provides_undo(&self) -> bool {
        true
    }
}
