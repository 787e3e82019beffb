//! Ordered groups of changes.

use std::collections::BTreeSet;

use heddle_status::Status;
use tracing::warn;

use super::{Change, ChangeError};
use crate::handle::DocumentPath;
use crate::store::BackingStore;

const CHANGE_TARGET: &str = "heddle_core::change";

/// Ordered list of child changes performed as one unit.
///
/// Children run in insertion order. The inverse holds the children's
/// inverses in reverse order, so undo unwinds the last edit first. When any
/// child has no inverse, the composite has none either.
///
/// Validation checks each child against the current store, except children
/// touching a document an earlier sibling already affects: those depend on
/// state that only exists once the earlier sibling has run and are checked
/// when they are performed.
///
/// If a child fails, the children already performed are unwound in reverse
/// order before the error is returned. The unwinding is best-effort; the
/// atomic scope of the store remains the authoritative rollback.
#[derive(Debug, Default)]
pub struct CompositeChange {
    name: String,
    children: Vec<Box<dyn Change>>,
}

impl CompositeChange {
    /// Creates an empty composite.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Appends a child.
    pub fn add(&mut self, child: Box<dyn Change>) {
        self.children.push(child);
    }

    /// Appends a child, builder style.
    #[must_use]
    pub fn with_child(mut self, child: Box<dyn Change>) -> Self {
        self.add(child);
        self
    }

    /// Number of direct children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` when the composite has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Change for CompositeChange {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_valid(&self, store: &dyn BackingStore) -> Status {
        let mut touched: BTreeSet<DocumentPath> = BTreeSet::new();
        let mut status = Status::ok();
        for child in &self.children {
            let affected = child.affected_documents();
            if affected.iter().all(|path| !touched.contains(path)) {
                status.merge(child.is_valid(store));
            }
            touched.extend(affected);
        }
        status
    }

    fn perform(
        self: Box<Self>,
        store: &mut dyn BackingStore,
    ) -> Result<Option<Box<dyn Change>>, ChangeError> {
        let Self { name, children } = *self;
        let mut inverses: Vec<Option<Box<dyn Change>>> = Vec::with_capacity(children.len());
        for child in children {
            match child.perform(store) {
                Ok(inverse) => inverses.push(inverse),
                Err(error) => {
                    unwind(store, inverses);
                    return Err(error);
                }
            }
        }

        let reversed: Option<Vec<Box<dyn Change>>> = inverses.into_iter().rev().collect();
        Ok(reversed.map(|children| Box::new(Self { name, children }) as Box<dyn Change>))
    }

    fn children(&self) -> &[Box<dyn Change>] {
        &self.children
    }

    fn affected_documents(&self) -> Vec<DocumentPath> {
        let mut documents: Vec<DocumentPath> = self
            .children
            .iter()
            .flat_map(|child| child.affected_documents())
            .collect();
        documents.sort();
        documents.dedup();
        documents
    }
}

fn unwind(store: &mut dyn BackingStore, inverses: Vec<Option<Box<dyn Change>>>) {
    for inverse in inverses.into_iter().rev().flatten() {
        let name = inverse.name();
        if let Err(error) = inverse.perform(store) {
            warn!(
                target: CHANGE_TARGET,
                change = %name,
                error = %error,
                "failed to unwind child change"
            );
        }
    }
}
