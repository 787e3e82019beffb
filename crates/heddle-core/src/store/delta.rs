//! Structural change summaries emitted per atomic scope.

use std::collections::BTreeMap;

use crate::handle::DocumentPath;

/// How a document changed within one atomic scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeltaKind {
    /// The document did not exist before the scope.
    Added,
    /// The document no longer exists after the scope.
    Removed,
    /// The document exists on both sides with different content.
    Changed,
}

/// One document's entry in a [`WorkspaceDelta`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaEntry {
    path: DocumentPath,
    kind: DeltaKind,
}

impl DeltaEntry {
    /// Creates an entry.
    #[must_use]
    pub const fn new(path: DocumentPath, kind: DeltaKind) -> Self {
        Self { path, kind }
    }

    /// Affected document.
    #[must_use]
    pub const fn path(&self) -> &DocumentPath {
        &self.path
    }

    /// Kind of change.
    #[must_use]
    pub const fn kind(&self) -> DeltaKind {
        self.kind
    }
}

/// Net effect of one atomic scope, sorted by path.
///
/// A document that is edited several times within the scope appears once.
/// A document whose content ends up unchanged does not appear at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceDelta {
    entries: Vec<DeltaEntry>,
}

impl WorkspaceDelta {
    /// Creates an empty delta.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Computes the delta between two snapshots of a store.
    #[must_use]
    pub fn between(
        before: &BTreeMap<DocumentPath, String>,
        after: &BTreeMap<DocumentPath, String>,
    ) -> Self {
        let mut entries: Vec<DeltaEntry> = before
            .iter()
            .filter_map(|(path, old)| match after.get(path) {
                None => Some(DeltaEntry::new(path.clone(), DeltaKind::Removed)),
                Some(new) if new != old => Some(DeltaEntry::new(path.clone(), DeltaKind::Changed)),
                Some(_) => None,
            })
            .collect();
        entries.extend(
            after
                .keys()
                .filter(|path| !before.contains_key(*path))
                .map(|path| DeltaEntry::new(path.clone(), DeltaKind::Added)),
        );
        entries.sort_by(|left, right| left.path.cmp(&right.path));
        Self { entries }
    }

    /// Entries in path order.
    #[must_use]
    pub fn entries(&self) -> &[DeltaEntry] {
        &self.entries
    }

    /// Kind of change recorded for `path`, if any.
    #[must_use]
    pub fn kind_of(&self, path: &DocumentPath) -> Option<DeltaKind> {
        self.entries
            .iter()
            .find(|entry| &entry.path == path)
            .map(DeltaEntry::kind)
    }

    /// Number of affected documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Observer of committed atomic scopes.
pub trait DeltaListener {
    /// Called once per committed outermost scope, with an empty delta when
    /// the scope changed nothing.
    fn workspace_changed(&mut self, delta: &WorkspaceDelta);
}
