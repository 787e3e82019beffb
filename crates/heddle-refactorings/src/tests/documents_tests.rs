//! Tests for moving, copying and deleting documents.

use heddle_core::{BackingStore, ParticipantArgument};
use heddle_status::Severity;
use rstest::rstest;

use super::support::{BEANS, TYPE_A, USER, doc, handles, session, snapshot, type_workspace};
use crate::{CopyDocumentRefactoring, DeleteDocumentRefactoring, MoveDocumentRefactoring};

#[rstest]
fn move_relocates_the_document() {
    let mut session = session(type_workspace());
    let mut refactoring = MoveDocumentRefactoring::new("p/User.java", "q");

    let outcome = session
        .perform_refactoring(&mut refactoring)
        .expect("move should run");

    assert!(outcome.is_none());
    assert!(!session.store().exists(&doc("p/User.java")));
    session
        .assert_document_eq("q/User.java", USER)
        .expect("content moved unchanged");
    session
        .participants()
        .assert_notifications(
            &handles(&["document:p/User.java"]),
            &[ParticipantArgument::Move {
                destination: "q".to_owned(),
                update_references: false,
            }],
        )
        .expect("move notified");
}

#[rstest]
#[case::occupied_target("q/Remote.java", "p", Severity::Error, "Document 'Remote.java' already exists in 'p'")]
#[case::same_directory("p/User.java", "p", Severity::Fatal, "Document 'p/User.java' is already in 'p'")]
#[case::missing_source("p/Z.java", "q", Severity::Fatal, "Document 'p/Z.java' does not exist")]
fn move_refusals(
    #[case] source: &str,
    #[case] destination: &str,
    #[case] severity: Severity,
    #[case] message: &str,
) {
    let mut workspace = type_workspace();
    workspace.insert("p/Remote.java", "package p;\n\nclass Remote {}\n");
    let mut session = session(workspace);
    let before = snapshot(&session);
    let mut refactoring = MoveDocumentRefactoring::new(source, destination);

    let status = session
        .perform_refactoring(&mut refactoring)
        .expect("refusal is reported as a status")
        .expect("refusal carries a status");

    assert_eq!(status.severity(), severity);
    assert_eq!(status.message_matching(severity), Some(message));
    assert_eq!(snapshot(&session), before);
}

#[rstest]
fn copy_creates_a_duplicate_and_keeps_the_source() {
    let mut session = session(type_workspace());
    let mut refactoring = CopyDocumentRefactoring::new("p/User.java", "q").with_new_name("Copy.java");

    session
        .perform_refactoring(&mut refactoring)
        .expect("copy should run");

    session
        .assert_document_eq("q/Copy.java", USER)
        .expect("copy created");
    session
        .assert_document_eq("p/User.java", USER)
        .expect("source kept");
    session
        .participants()
        .assert_notifications(
            &handles(&["document:p/User.java", "document:q/Copy.java"]),
            &[
                ParticipantArgument::Copy {
                    destination: "q".to_owned(),
                },
                ParticipantArgument::Create,
            ],
        )
        .expect("copy and creation notified");
}

#[rstest]
fn undoing_a_copy_removes_the_duplicate() {
    let mut session = session(type_workspace());
    let before = snapshot(&session);
    let mut refactoring = CopyDocumentRefactoring::new("p/User.java", "q");
    session
        .perform_refactoring(&mut refactoring)
        .expect("copy should run");
    assert!(session.store().exists(&doc("q/User.java")));

    session.undo().expect("undo should succeed");

    assert_eq!(snapshot(&session), before);
}

#[rstest]
#[case::invalid_name(
    CopyDocumentRefactoring::new("p/User.java", "q").with_new_name("a/b"),
    Severity::Fatal,
    "'a/b' is not a valid file name"
)]
#[case::onto_itself(
    CopyDocumentRefactoring::new("p/User.java", "p"),
    Severity::Error,
    "Document 'p/User.java' already exists"
)]
fn copy_refusals(
    #[case] mut refactoring: CopyDocumentRefactoring,
    #[case] severity: Severity,
    #[case] message: &str,
) {
    let mut session = session(type_workspace());

    let status = session
        .perform_refactoring(&mut refactoring)
        .expect("refusal is reported as a status")
        .expect("refusal carries a status");

    assert_eq!(status.severity(), severity);
    assert_eq!(status.message_matching(severity), Some(message));
}

#[rstest]
fn deleting_a_used_type_warns_once_per_user() {
    let mut session = session(type_workspace());
    let mut refactoring = DeleteDocumentRefactoring::new("p/A.java");

    let status = session
        .perform_refactoring(&mut refactoring)
        .expect("delete should run")
        .expect("warnings are reported");

    assert_eq!(status.severity(), Severity::Warning);
    let messages: Vec<&str> = status
        .entries()
        .iter()
        .map(|entry| entry.message())
        .collect();
    assert_eq!(
        messages,
        vec![
            "'p/A.java' is still used by 'p/User.java'",
            "'p/A.java' is still used by 'q/Other.java'",
        ]
    );
    assert!(!session.store().exists(&doc("p/A.java")));
}

#[rstest]
fn delete_notifies_and_undo_restores() {
    let mut session = session(type_workspace());
    let mut refactoring = DeleteDocumentRefactoring::new("config/beans.xml");

    let outcome = session
        .perform_refactoring(&mut refactoring)
        .expect("delete should run");

    assert!(outcome.is_none());
    session
        .participants()
        .assert_notifications(
            &handles(&["document:config/beans.xml"]),
            &[ParticipantArgument::Delete],
        )
        .expect("deletion notified");

    session.undo().expect("undo should succeed");

    session
        .assert_document_eq("config/beans.xml", BEANS)
        .expect("document restored");
    session
        .assert_document_eq("p/A.java", TYPE_A)
        .expect("other documents untouched");
}
