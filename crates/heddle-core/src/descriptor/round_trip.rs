//! Descriptor round-trip verification.
//!
//! A refactoring is serialised to its descriptor, parsed back, rebuilt
//! through the contribution registry and then run alongside the original on
//! two scratch copies of the store. The two runs must agree on their
//! outcome, their participant notifications and every resulting document.

use heddle_config::EngineConfig;
use heddle_status::Status;
use thiserror::Error;
use tracing::debug;

use super::{ContributionRegistry, RefactoringDescriptor};
use crate::cancel::CancellationToken;
use crate::executor::{ChangeExecutor, ExecutionContext, ExecutionError, Performed, UndoPolicy};
use crate::handle::{DocumentPath, ElementHandle};
use crate::participants::{NotificationMismatch, ParticipantArgument, ParticipantRegistry};
use crate::refactoring::Refactoring;
use crate::store::BackingStore;
use crate::undo::UndoManager;

const ROUND_TRIP_TARGET: &str = "heddle_core::descriptor";

/// Differences found while verifying a descriptor round trip.
#[derive(Debug, Error)]
pub enum RoundTripError {
    /// The descriptor could not be serialised or parsed.
    #[error("descriptor serialisation failed: {0}")]
    Serialisation(#[from] serde_json::Error),

    /// Parsing the serialised descriptor produced a different descriptor.
    #[error("descriptor '{id}' changed across serialisation")]
    DescriptorChanged {
        /// Descriptor id.
        id: String,
    },

    /// The registry could not rebuild the refactoring.
    #[error("descriptor '{id}' could not be turned back into a refactoring: {status}")]
    Reconstruct {
        /// Descriptor id.
        id: String,
        /// Failure reported by the registry or contribution.
        status: Status,
    },

    /// The two runs ended differently.
    #[error("original run {original}, reconstructed run {reconstructed}")]
    Outcome {
        /// Summary of the original run.
        original: String,
        /// Summary of the reconstructed run.
        reconstructed: String,
    },

    /// The two runs notified different participants.
    #[error("participant notifications differ: {0}")]
    Notifications(#[source] NotificationMismatch),

    /// A document differs between the two resulting stores.
    #[error("document '{path}' differs between the original and reconstructed runs")]
    Document {
        /// First differing document.
        path: DocumentPath,
    },
}

struct RunResult<S> {
    store: S,
    participants: ParticipantRegistry,
    outcome: Result<Performed, ExecutionError>,
}

/// Checks that `refactoring` survives a round trip through its descriptor.
///
/// Neither `store` nor any undo history is modified; both runs happen on
/// clones.
///
/// # Errors
///
/// Returns the first [`RoundTripError`] found.
pub fn verify_equivalence<S>(
    refactoring: &mut dyn Refactoring,
    registry: &ContributionRegistry,
    store: &S,
    config: &EngineConfig,
) -> Result<(), RoundTripError>
where
    S: BackingStore + Clone,
{
    let descriptor = refactoring.create_descriptor();
    let json = descriptor.to_json()?;
    let parsed = RefactoringDescriptor::from_json(&json)?;
    if parsed != descriptor {
        return Err(RoundTripError::DescriptorChanged {
            id: descriptor.id().to_owned(),
        });
    }
    let mut rebuilt =
        parsed
            .create_refactoring(registry)
            .map_err(|status| RoundTripError::Reconstruct {
                id: parsed.id().to_owned(),
                status,
            })?;

    let original = run_on_clone(refactoring, store, config);
    let reconstructed = run_on_clone(rebuilt.as_mut(), store, config);
    debug!(
        target: ROUND_TRIP_TARGET,
        id = %descriptor.id(),
        original = %summarise(&original.outcome),
        reconstructed = %summarise(&reconstructed.outcome),
        "compared descriptor round trip"
    );

    match (&original.outcome, &reconstructed.outcome) {
        (Ok(_), Ok(_)) => {}
        (Err(left), Err(right)) if same_failure(left, right) => return Ok(()),
        (left, right) => {
            return Err(RoundTripError::Outcome {
                original: summarise(left),
                reconstructed: summarise(right),
            });
        }
    }

    let (handles, arguments): (Vec<ElementHandle>, Vec<ParticipantArgument>) = original
        .participants
        .notifications()
        .iter()
        .map(|notification| {
            (
                notification.handle().clone(),
                notification.argument().clone(),
            )
        })
        .unzip();
    reconstructed
        .participants
        .assert_notifications(&handles, &arguments)
        .map_err(RoundTripError::Notifications)?;

    compare_stores(&original.store, &reconstructed.store)
}

fn run_on_clone<S>(refactoring: &mut dyn Refactoring, store: &S, config: &EngineConfig) -> RunResult<S>
where
    S: BackingStore + Clone,
{
    let mut scratch = store.clone();
    let mut undo = UndoManager::new(1);
    let mut participants = ParticipantRegistry::new();
    let mut executor = ChangeExecutor::new(config);
    let outcome = executor.perform(
        refactoring,
        ExecutionContext::new(&mut scratch, &mut undo, &mut participants),
        UndoPolicy::Discard,
        &CancellationToken::new(),
    );
    RunResult {
        store: scratch,
        participants,
        outcome,
    }
}

fn same_failure(left: &ExecutionError, right: &ExecutionError) -> bool {
    match (left.status(), right.status()) {
        (Some(original), Some(rebuilt)) => original.severity() == rebuilt.severity(),
        _ => false,
    }
}

fn summarise(outcome: &Result<Performed, ExecutionError>) -> String {
    match outcome {
        Ok(performed) => format!("performed with {}", performed.status().severity()),
        Err(error) => format!("failed: {error}"),
    }
}

fn compare_stores<S: BackingStore>(original: &S, reconstructed: &S) -> Result<(), RoundTripError> {
    let mut paths = original.document_paths();
    paths.extend(reconstructed.document_paths());
    paths.sort();
    paths.dedup();
    match paths
        .into_iter()
        .find(|path| original.read(path) != reconstructed.read(path))
    {
        Some(path) => Err(RoundTripError::Document { path }),
        None => Ok(()),
    }
}
