//! Mapping from descriptor ids to refactoring factories.

use std::collections::HashMap;
use std::fmt;

use heddle_status::Status;
use thiserror::Error;

use super::RefactoringDescriptor;
use crate::refactoring::Refactoring;

/// Errors raised while registering contributions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A contribution with the same id is already registered.
    #[error("a refactoring contribution with id '{id}' is already registered")]
    Duplicate {
        /// Conflicting id.
        id: String,
    },
}

/// Rebuilds refactorings of one kind from their descriptors.
pub trait RefactoringContribution {
    /// Descriptor id this contribution understands.
    fn id(&self) -> &str;

    /// Builds a configured refactoring from `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns a FATAL status when an argument is missing or malformed.
    fn create_refactoring(
        &self,
        descriptor: &RefactoringDescriptor,
    ) -> Result<Box<dyn Refactoring>, Status>;
}

/// Registered contributions, keyed by id.
#[derive(Default)]
pub struct ContributionRegistry {
    contributions: HashMap<String, Box<dyn RefactoringContribution>>,
}

impl ContributionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a contribution under its id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] when the id is taken.
    pub fn register(
        &mut self,
        contribution: Box<dyn RefactoringContribution>,
    ) -> Result<(), RegistryError> {
        let id = contribution.id().to_owned();
        if self.contributions.contains_key(&id) {
            return Err(RegistryError::Duplicate { id });
        }
        self.contributions.insert(id, contribution);
        Ok(())
    }

    /// Looks up a contribution.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&dyn RefactoringContribution> {
        self.contributions.get(id).map(|contribution| &**contribution)
    }

    /// Returns `true` when `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.contributions.contains_key(id)
    }

    /// Registered ids in sorted order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.contributions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered contributions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }
}

impl fmt::Debug for ContributionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContributionRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}
