//! Serialisable refactoring descriptions.
//!
//! A [`RefactoringDescriptor`] captures everything needed to rebuild a
//! configured refactoring: the contribution id, a free-form description,
//! change flags and string arguments. Descriptors are resolved back into
//! refactorings through a [`ContributionRegistry`], which maps ids to the
//! [`RefactoringContribution`] that understands their arguments.

mod contribution;
mod history;
mod round_trip;

use std::collections::BTreeMap;

use bitflags::bitflags;
use heddle_status::Status;
use serde::{Deserialize, Serialize};

use crate::refactoring::Refactoring;

pub use contribution::{ContributionRegistry, RefactoringContribution, RegistryError};
pub use history::{HistoryEntry, RefactoringHistory};
pub use round_trip::{RoundTripError, verify_equivalence};

bitflags! {
    /// Properties of the change a refactoring makes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DescriptorFlags: u32 {
        /// The change alters program structure, not just text.
        const STRUCTURAL_CHANGE = 1;
        /// The change spans more than one document.
        const MULTI_CHANGE = 1 << 1;
        /// The change may break clients outside the workspace.
        const BREAKING_CHANGE = 1 << 2;
        /// The change only affects elements reachable from the target.
        const CLOSURE_CHANGE = 1 << 3;
    }
}

impl Default for DescriptorFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Stable, serialisable description of a configured refactoring.
///
/// # Example
///
/// ```
/// use heddle_core::{DescriptorFlags, RefactoringDescriptor};
///
/// let descriptor = RefactoringDescriptor::new("heddle.rename.type", "Rename type 'p.A'")
///     .with_project("demo")
///     .with_flags(DescriptorFlags::STRUCTURAL_CHANGE | DescriptorFlags::MULTI_CHANGE)
///     .with_argument("input", "p.A")
///     .with_argument("name", "B");
///
/// let json = descriptor.to_json().expect("serialise");
/// let parsed = RefactoringDescriptor::from_json(&json).expect("parse");
/// assert_eq!(parsed, descriptor);
/// assert_eq!(parsed.argument("name"), Some("B"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactoringDescriptor {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project: Option<String>,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(default)]
    flags: DescriptorFlags,
    #[serde(default)]
    arguments: BTreeMap<String, String>,
}

impl RefactoringDescriptor {
    /// Creates a descriptor with no project, comment, flags or arguments.
    #[must_use]
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            project: None,
            description: description.into(),
            comment: None,
            flags: DescriptorFlags::empty(),
            arguments: BTreeMap::new(),
        }
    }

    /// Sets the project name.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the change flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: DescriptorFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Adds or replaces an argument.
    #[must_use]
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Contribution id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Project name.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// One-line description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Free-form comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Change flags.
    #[must_use]
    pub const fn flags(&self) -> DescriptorFlags {
        self.flags
    }

    /// All arguments, sorted by key.
    #[must_use]
    pub const fn arguments(&self) -> &BTreeMap<String, String> {
        &self.arguments
    }

    /// Looks up one argument.
    #[must_use]
    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).map(String::as_str)
    }

    /// Looks up an argument that must be present.
    ///
    /// # Errors
    ///
    /// Returns a FATAL status naming the missing key.
    pub fn required_argument(&self, key: &str) -> Result<&str, Status> {
        self.argument(key).ok_or_else(|| {
            Status::fatal(format!(
                "Refactoring descriptor '{}' is missing argument '{key}'",
                self.id
            ))
        })
    }

    /// Reads a boolean argument, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns a FATAL status when the value is neither `true` nor `false`.
    pub fn bool_argument(&self, key: &str, default: bool) -> Result<bool, Status> {
        match self.argument(key) {
            None => Ok(default),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(Status::fatal(format!(
                "Argument '{key}' of refactoring descriptor '{}' must be 'true' or 'false', found '{other}'",
                self.id
            ))),
        }
    }

    /// Serialises the descriptor to JSON.
    ///
    /// # Errors
    ///
    /// Returns the serialiser's error.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a descriptor from JSON.
    ///
    /// # Errors
    ///
    /// Returns the parser's error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Rebuilds the refactoring through the contribution registered for
    /// this descriptor's id.
    ///
    /// # Errors
    ///
    /// Returns a FATAL status when no contribution is registered or the
    /// contribution rejects the arguments.
    pub fn create_refactoring(
        &self,
        registry: &ContributionRegistry,
    ) -> Result<Box<dyn Refactoring>, Status> {
        let contribution = registry.get(&self.id).ok_or_else(|| {
            Status::fatal(format!(
                "No refactoring contribution is registered for '{}'",
                self.id
            ))
        })?;
        contribution.create_refactoring(self)
    }
}
