//! Tests for reordering method parameters.

use std::cell::RefCell;
use std::rc::Rc;

use heddle_core::{
    DeltaListener, InMemoryWorkspace, Refactoring, RefactoringDescriptor, WorkspaceDelta,
};
use heddle_status::Severity;
use rstest::rstest;

use super::support::{CALLER, METHOD_OWNER, method_workspace, session, snapshot};
use crate::{CHANGE_SIGNATURE_ID, ReorderParametersRefactoring, contribution_registry};

fn caller(call: &str) -> String {
    format!("package p;\n\nclass Caller {{\n  void run(int a, int b) {{ {call} }}\n}}\n")
}

#[rstest]
fn declaration_and_call_sites_are_permuted() {
    let mut session = session(method_workspace());
    let mut refactoring = ReorderParametersRefactoring::new("p.A", "m", vec![1, 0]);

    let outcome = session
        .perform_refactoring(&mut refactoring)
        .expect("reorder should run");

    assert!(outcome.is_none());
    session
        .assert_document_eq(
            "p/A.java",
            "package p;\n\npublic class A {\n  void m(int j, int i) {}\n}\n",
        )
        .expect("parameters swapped");
    session
        .assert_document_eq("p/Caller.java", &caller("new A().m(b, a);"))
        .expect("arguments swapped");
    assert!(session.participants().is_empty());
}

#[rstest]
#[case::nested_call("new A().m(f(a, b), c);", "new A().m(c, f(a, b));")]
#[case::literals("new A().m(\"x, y\", 'z');", "new A().m('z', \"x, y\");")]
#[case::two_calls("new A().m(a, b); new A().m(1, 2);", "new A().m(b, a); new A().m(2, 1);")]
#[case::call_as_first_argument(
    "new A().m(new A().m(a, b), c);",
    "new A().m(c, new A().m(b, a));"
)]
#[case::call_as_last_argument(
    "new A().m(a, new A().m(b, c));",
    "new A().m(new A().m(c, b), a);"
)]
#[case::three_levels(
    "x.m(x.m(x.m(a, b), c), d);",
    "x.m(d, x.m(c, x.m(b, a)));"
)]
fn arguments_are_permuted_as_whole_expressions(#[case] call: &str, #[case] expected: &str) {
    let mut session = session(InMemoryWorkspace::with_documents([
        ("p/A.java", METHOD_OWNER.to_owned()),
        ("p/Caller.java", caller(call)),
    ]));
    let mut refactoring = ReorderParametersRefactoring::new("p.A", "m", vec![1, 0]);

    session
        .perform_refactoring(&mut refactoring)
        .expect("reorder should run");

    session
        .assert_document_eq("p/Caller.java", &caller(expected))
        .expect("arguments permuted");
}

/// Records the size of every delta the store reports.
struct DeltaLog(Rc<RefCell<Vec<usize>>>);

impl DeltaListener for DeltaLog {
    fn workspace_changed(&mut self, delta: &WorkspaceDelta) {
        self.0.borrow_mut().push(delta.len());
    }
}

#[rstest]
fn identity_order_changes_nothing_but_still_reports_one_delta() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut workspace = method_workspace();
    workspace.add_listener(Box::new(DeltaLog(Rc::clone(&seen))));
    let mut session = session(workspace);
    let before = snapshot(&session);
    let mut refactoring = ReorderParametersRefactoring::new("p.A", "m", vec![0, 1]);

    let outcome = session
        .perform_refactoring(&mut refactoring)
        .expect("identity reorder runs");

    assert!(outcome.is_none());
    assert_eq!(snapshot(&session), before);
    assert_eq!(*seen.borrow(), vec![0]);
}

#[rstest]
fn call_with_wrong_arity_blocks_the_reorder() {
    let mut workspace = method_workspace();
    workspace.insert(
        "p/Bad.java",
        "package p;\n\nclass Bad {\n  void go() { new A().m(1); }\n}\n",
    );
    let mut session = session(workspace);
    let before = snapshot(&session);
    let mut refactoring = ReorderParametersRefactoring::new("p.A", "m", vec![1, 0]);

    let status = session
        .perform_refactoring(&mut refactoring)
        .expect("refusal is reported as a status")
        .expect("refusal carries a status");

    assert_eq!(status.severity(), Severity::Error);
    assert_eq!(
        status.message_matching(Severity::Error),
        Some("Call to 'm' in 'p/Bad.java' passes 1 arguments, expected 2")
    );
    assert_eq!(snapshot(&session), before);
}

#[rstest]
#[case::repeated(vec![0, 0])]
#[case::too_short(vec![0])]
#[case::too_long(vec![0, 1, 2])]
#[case::out_of_range(vec![2, 0])]
fn invalid_permutations_are_fatal(#[case] order: Vec<usize>) {
    let mut session = session(method_workspace());
    let before = snapshot(&session);
    let mut refactoring = ReorderParametersRefactoring::new("p.A", "m", order);

    let status = session
        .perform_refactoring(&mut refactoring)
        .expect("refusal is reported as a status")
        .expect("refusal carries a status");

    assert_eq!(status.severity(), Severity::Fatal);
    assert!(
        status
            .message_matching(Severity::Fatal)
            .is_some_and(|message| message.starts_with("Parameter order")),
        "unexpected status: {status:?}"
    );
    assert_eq!(snapshot(&session), before);
}

#[rstest]
#[case::missing_method("p.A", "n", "Method 'n' is not declared in type 'p.A'")]
#[case::missing_type("p.Z", "m", "Type 'p.Z' does not exist")]
fn missing_targets_are_fatal(
    #[case] declaring_type: &str,
    #[case] method: &str,
    #[case] message: &str,
) {
    let mut session = session(method_workspace());
    let mut refactoring = ReorderParametersRefactoring::new(declaring_type, method, vec![1, 0]);

    let status = session
        .perform_refactoring(&mut refactoring)
        .expect("refusal is reported as a status")
        .expect("refusal carries a status");

    assert_eq!(status.message_matching(Severity::Fatal), Some(message));
}

#[rstest]
fn undo_restores_declaration_and_calls() {
    let mut session = session(method_workspace());
    let mut refactoring = ReorderParametersRefactoring::new("p.A", "m", vec![1, 0]);
    session
        .perform_refactoring(&mut refactoring)
        .expect("reorder should run");

    session.undo().expect("undo should succeed");

    session
        .assert_document_eq("p/A.java", METHOD_OWNER)
        .expect("declaration restored");
    session
        .assert_document_eq("p/Caller.java", CALLER)
        .expect("call restored");
}

#[rstest]
fn descriptor_encodes_the_order() {
    let refactoring = ReorderParametersRefactoring::new("p.A", "m", vec![2, 0, 1]);

    let descriptor = refactoring.create_descriptor();

    assert_eq!(descriptor.argument("method"), Some("m"));
    assert_eq!(descriptor.argument("order"), Some("2,0,1"));
}

#[rstest]
fn malformed_order_cannot_be_rebuilt() {
    let registry = contribution_registry().expect("contribution ids are distinct");
    let descriptor = RefactoringDescriptor::new(CHANGE_SIGNATURE_ID, "Reorder")
        .with_argument("input", "p.A")
        .with_argument("method", "m")
        .with_argument("order", "1,x");

    let status = descriptor
        .create_refactoring(&registry)
        .err()
        .expect("malformed order is rejected");

    assert!(status.has_fatal());
    assert!(
        status
            .message_matching(Severity::Fatal)
            .is_some_and(|message| message.starts_with("Parameter order '1,x' is malformed"))
    );
}
