//! Log of performed refactorings.

use serde::{Deserialize, Serialize};

use super::RefactoringDescriptor;

/// One performed refactoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    sequence: u64,
    descriptor: RefactoringDescriptor,
}

impl HistoryEntry {
    /// Position in the history, starting at one.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Descriptor of the performed refactoring.
    #[must_use]
    pub const fn descriptor(&self) -> &RefactoringDescriptor {
        &self.descriptor
    }
}

/// Ordered, serialisable history of performed refactorings.
///
/// Replaying the descriptors in order through a
/// [`ContributionRegistry`](crate::ContributionRegistry) reproduces the
/// recorded session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactoringHistory {
    entries: Vec<HistoryEntry>,
}

impl RefactoringHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a descriptor and returns its sequence number.
    pub fn record(&mut self, descriptor: RefactoringDescriptor) -> u64 {
        let sequence = self.entries.last().map_or(1, |entry| entry.sequence + 1);
        self.entries.push(HistoryEntry {
            sequence,
            descriptor,
        });
        sequence
    }

    /// Entries in recording order.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Entries whose descriptor carries `id`.
    pub fn entries_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.descriptor.id() == id)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Serialises the history to JSON.
    ///
    /// # Errors
    ///
    /// Returns the serialiser's error.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a history from JSON.
    ///
    /// # Errors
    ///
    /// Returns the parser's error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
