//! Reordering the parameters of a method.

use std::collections::BTreeMap;

use heddle_core::{
    BackingStore, CancellationToken, Change, CompositeChange, DescriptorFlags, DocumentPath,
    ParticipantRegistry, Refactoring, RefactoringContribution, RefactoringDescriptor,
};
use heddle_status::Status;
use tracing::debug;

use crate::arguments::INPUT;
use crate::source::{self, ArgumentList, EditSet};

const REORDER_TARGET: &str = "heddle_refactorings::reorder";

/// Descriptor id of [`ReorderParametersRefactoring`].
pub const CHANGE_SIGNATURE_ID: &str = "heddle.change.signature";

const METHOD_ARGUMENT: &str = "method";
const ORDER_ARGUMENT: &str = "order";

/// Permutes the parameters of method `m` declared in type `p.A`.
///
/// `order[k]` names the old position of the parameter that ends up at
/// position `k`, so `m(int i, int j)` with order `[1, 0]` becomes
/// `m(int j, int i)`. Every call site in a document that sees the type has
/// its arguments permuted the same way.
///
/// # Example
///
/// ```
/// use heddle_config::EngineConfig;
/// use heddle_core::{InMemoryWorkspace, Session};
/// use heddle_refactorings::ReorderParametersRefactoring;
///
/// let store = InMemoryWorkspace::with_documents([(
///     "p/A.java",
///     "package p;\nclass A {\n  void m(int i, int j) {}\n  void n() { m(1, 2); }\n}\n",
/// )]);
/// let mut session = Session::new(store, EngineConfig::default());
/// let mut reorder = ReorderParametersRefactoring::new("p.A", "m", vec![1, 0]);
///
/// assert!(session.perform_refactoring(&mut reorder).expect("reorder runs").is_none());
/// session
///     .assert_document_eq(
///         "p/A.java",
///         "package p;\nclass A {\n  void m(int j, int i) {}\n  void n() { m(2, 1); }\n}\n",
///     )
///     .expect("declaration and call reordered");
/// ```
#[derive(Debug, Clone)]
pub struct ReorderParametersRefactoring {
    declaring_type: String,
    method: String,
    order: Vec<usize>,
}

/// Parameter and argument lists affected by a reorder.
struct Sites {
    declaration: ArgumentList,
    calls: Vec<(DocumentPath, ArgumentList)>,
}

impl ReorderParametersRefactoring {
    /// Reorders the parameters of `method` in type `declaring_type`.
    #[must_use]
    pub fn new(declaring_type: impl Into<String>, method: impl Into<String>, order: Vec<usize>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            method: method.into(),
            order,
        }
    }

    /// Requested parameter order.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Replaces the requested order; final conditions should be checked
    /// again afterwards.
    pub fn set_order(&mut self, order: Vec<usize>) {
        self.order = order;
    }

    fn document(&self) -> DocumentPath {
        source::type_document(&self.declaring_type)
    }

    fn sites(&self, store: &dyn BackingStore) -> Result<Sites, Status> {
        let document = self.document();
        let content = store
            .read(&document)
            .ok_or_else(|| Status::fatal(format!("Type '{}' does not exist", self.declaring_type)))?;
        let declaration = source::invocations(content, &self.method)
            .into_iter()
            .find(|invocation| invocation.declaration)
            .map(|invocation| invocation.list)
            .ok_or_else(|| {
                Status::fatal(format!(
                    "Method '{}' is not declared in type '{}'",
                    self.method, self.declaring_type
                ))
            })?;
        let mut calls = Vec::new();
        for path in store.document_paths() {
            if !source::is_source(&path) {
                continue;
            }
            let Some(text) = store.read(&path) else {
                continue;
            };
            if path != document && !source::sees_type(&path, text, &self.declaring_type) {
                continue;
            }
            calls.extend(
                source::invocations(text, &self.method)
                    .into_iter()
                    .filter(|invocation| !invocation.declaration)
                    .map(|invocation| (path.clone(), invocation.list)),
            );
        }
        Ok(Sites { declaration, calls })
    }

    fn is_permutation(&self, arity: usize) -> bool {
        let mut seen = vec![false; arity];
        self.order.len() == arity
            && self.order.iter().all(|position| {
                seen.get_mut(*position)
                    .is_some_and(|slot| !std::mem::replace(slot, true))
            })
    }

    /// Text of `bounds` with every list inside it rewritten.
    fn render(&self, content: &str, bounds: Span, lists: &[ArgumentList]) -> String {
        let mut text = String::new();
        let mut cursor = bounds.0;
        for (list, (start, end)) in outermost(lists, bounds) {
            text.push_str(content.get(cursor..start).unwrap_or_default());
            text.push_str(&self.rewrite(content, list, lists));
            cursor = end;
        }
        text.push_str(content.get(cursor..bounds.1).unwrap_or_default());
        text
    }

    /// Items of `list` in the requested order, separators kept in place.
    /// Calls nested in an item are rewritten as part of it.
    fn rewrite(&self, content: &str, list: &ArgumentList, lists: &[ArgumentList]) -> String {
        let permuted = list.items.len() == self.order.len();
        let mut text = String::new();
        let mut previous_end = None;
        for (position, item) in list.items.iter().enumerate() {
            if let Some(end) = previous_end {
                text.push_str(content.get(end..item.0).unwrap_or_default());
            }
            previous_end = Some(item.1);
            let origin = self
                .order
                .get(position)
                .filter(|_| permuted)
                .and_then(|from| list.items.get(*from))
                .unwrap_or(item);
            text.push_str(&self.render(content, *origin, lists));
        }
        text
    }
}

type Span = (usize, usize);

/// From the first item's start to the last item's end.
fn span(list: &ArgumentList) -> Option<Span> {
    Some((list.items.first()?.0, list.items.last()?.1))
}

/// Lists inside `bounds` that no other such list encloses, in document
/// order.
fn outermost(lists: &[ArgumentList], bounds: Span) -> Vec<(&ArgumentList, Span)> {
    let inside: Vec<(&ArgumentList, Span)> = lists
        .iter()
        .filter_map(|list| span(list).map(|extent| (list, extent)))
        .filter(|(_, extent)| bounds.0 <= extent.0 && extent.1 <= bounds.1)
        .collect();
    let mut top: Vec<(&ArgumentList, Span)> = inside
        .iter()
        .filter(|(_, extent)| {
            !inside.iter().any(|(_, other)| {
                other != extent && other.0 <= extent.0 && extent.1 <= other.1
            })
        })
        .copied()
        .collect();
    top.sort_by_key(|(_, extent)| extent.0);
    top
}

impl Refactoring for ReorderParametersRefactoring {
    fn name(&self) -> String {
        format!(
            "Reorder parameters of '{}.{}'",
            self.declaring_type, self.method
        )
    }

    fn check_initial_conditions(
        &mut self,
        store: &dyn BackingStore,
        _token: &CancellationToken,
    ) -> Status {
        self.sites(store).err().unwrap_or_else(Status::ok)
    }

    fn check_final_conditions(
        &mut self,
        store: &dyn BackingStore,
        _token: &CancellationToken,
    ) -> Status {
        let sites = match self.sites(store) {
            Ok(sites) => sites,
            Err(status) => return status,
        };
        let arity = sites.declaration.items.len();
        let mut status = Status::ok();
        if !self.is_permutation(arity) {
            status.add_fatal(format!(
                "Parameter order {:?} is not a permutation of the {arity} parameters of '{}'",
                self.order, self.method
            ));
            return status;
        }
        for (path, call) in &sites.calls {
            if call.items.len() != arity {
                status.add_error(format!(
                    "Call to '{}' in '{path}' passes {} arguments, expected {arity}",
                    self.method,
                    call.items.len()
                ));
            }
        }
        status
    }

    fn create_change(
        &mut self,
        store: &dyn BackingStore,
        _participants: &mut ParticipantRegistry,
        _token: &CancellationToken,
    ) -> Result<Box<dyn Change>, Status> {
        let sites = self.sites(store)?;
        let call_count = sites.calls.len();
        let mut lists: BTreeMap<DocumentPath, Vec<ArgumentList>> = BTreeMap::new();
        lists
            .entry(self.document())
            .or_default()
            .push(sites.declaration);
        for (path, call) in sites.calls {
            lists.entry(path).or_default().push(call);
        }
        let mut edits = EditSet::default();
        for (path, document_lists) in &lists {
            let Some(content) = store.read(path) else {
                continue;
            };
            for (list, (start, end)) in outermost(document_lists, (0, content.len())) {
                let rewritten = self.rewrite(content, list, document_lists);
                if content.get(start..end) != Some(rewritten.as_str()) {
                    edits.replace(path, start, end, rewritten);
                }
            }
        }
        debug!(
            target: REORDER_TARGET,
            method = %self.method,
            calls = call_count,
            "reorder change built"
        );
        let mut root = CompositeChange::new(self.name());
        for change in edits.into_changes(store)? {
            root.add(Box::new(change));
        }
        Ok(Box::new(root))
    }

    fn create_descriptor(&self) -> RefactoringDescriptor {
        let order = self
            .order
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(",");
        RefactoringDescriptor::new(CHANGE_SIGNATURE_ID, self.name())
            .with_flags(DescriptorFlags::STRUCTURAL_CHANGE | DescriptorFlags::MULTI_CHANGE)
            .with_argument(INPUT, self.declaring_type.as_str())
            .with_argument(METHOD_ARGUMENT, self.method.as_str())
            .with_argument(ORDER_ARGUMENT, order)
    }
}

/// Rebuilds [`ReorderParametersRefactoring`] from its descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReorderParametersContribution;

impl RefactoringContribution for ReorderParametersContribution {
    fn id(&self) -> &str {
        CHANGE_SIGNATURE_ID
    }

    fn create_refactoring(
        &self,
        descriptor: &RefactoringDescriptor,
    ) -> Result<Box<dyn Refactoring>, Status> {
        let raw = descriptor.required_argument(ORDER_ARGUMENT)?;
        let order = raw
            .split(',')
            .filter(|item| !item.trim().is_empty())
            .map(|item| item.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| {
                Status::fatal(format!("Parameter order '{raw}' is malformed: {error}"))
            })?;
        Ok(Box::new(ReorderParametersRefactoring::new(
            descriptor.required_argument(INPUT)?,
            descriptor.required_argument(METHOD_ARGUMENT)?,
            order,
        )))
    }
}
