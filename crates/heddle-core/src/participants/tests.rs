//! Tests for participant notifications.

use rstest::{fixture, rstest};

use super::*;

fn handle(raw: &str) -> ElementHandle {
    ElementHandle::new(raw)
}

#[fixture]
fn field_rename() -> ParticipantRegistry {
    let mut registry = ParticipantRegistry::new();
    registry
        .record(handle("p.A.f"), ParticipantArgument::rename("g"))
        .expect("field");
    registry
        .record(handle("p.A.getF()"), ParticipantArgument::rename("getG"))
        .expect("getter");
    registry
        .record(handle("p.A.setF(int)"), ParticipantArgument::rename("setG"))
        .expect("setter");
    registry
}

#[rstest]
fn matching_expectation_passes(field_rename: ParticipantRegistry) {
    field_rename
        .assert_notifications(
            &[handle("p.A.f"), handle("p.A.getF()"), handle("p.A.setF(int)")],
            &[
                ParticipantArgument::rename("g"),
                ParticipantArgument::rename("getG"),
                ParticipantArgument::rename("setG"),
            ],
        )
        .expect("notifications match");
    assert_eq!(field_rename.handles().len(), 3);
    assert_eq!(field_rename.arguments().len(), 3);
}

#[rstest]
fn count_mismatch_is_reported(field_rename: ParticipantRegistry) {
    let err = field_rename
        .assert_notifications(&[handle("p.A.f")], &[ParticipantArgument::rename("g")])
        .expect_err("too few expected");
    assert_eq!(
        err,
        NotificationMismatch::Count {
            expected: 1,
            actual: 3
        }
    );
}

#[rstest]
fn argument_mismatch_names_the_element(field_rename: ParticipantRegistry) {
    let err = field_rename
        .assert_notifications(
            &[handle("p.A.f"), handle("p.A.getF()"), handle("p.A.setF(int)")],
            &[
                ParticipantArgument::rename("g"),
                ParticipantArgument::rename("getG"),
                ParticipantArgument::Delete,
            ],
        )
        .expect_err("setter argument differs");
    assert!(matches!(err, NotificationMismatch::Argument { index: 2, .. }));
    assert!(err.to_string().contains("p.A.setF(int)"));
}

#[rstest]
fn order_matters(field_rename: ParticipantRegistry) {
    let err = field_rename
        .assert_notifications(
            &[handle("p.A.getF()"), handle("p.A.f"), handle("p.A.setF(int)")],
            &[
                ParticipantArgument::rename("getG"),
                ParticipantArgument::rename("g"),
                ParticipantArgument::rename("setG"),
            ],
        )
        .expect_err("order differs");
    assert!(matches!(err, NotificationMismatch::Handle { index: 0, .. }));
}

#[test]
fn unbalanced_expectation_is_rejected() {
    let registry = ParticipantRegistry::new();
    let err = registry
        .assert_notifications(&[handle("p.A")], &[])
        .expect_err("lists differ");
    assert!(matches!(
        err,
        NotificationMismatch::UnbalancedExpectation {
            handles: 1,
            arguments: 0
        }
    ));
}

#[rstest]
fn reset_allows_renotification(mut field_rename: ParticipantRegistry) {
    let err = field_rename
        .record(handle("p.A.f"), ParticipantArgument::Delete)
        .expect_err("duplicate within one execution");
    assert_eq!(
        err,
        ParticipantError::Duplicate {
            handle: handle("p.A.f")
        }
    );

    field_rename.reset();
    assert!(field_rename.is_empty());
    field_rename
        .record(handle("p.A.f"), ParticipantArgument::Delete)
        .expect("fresh execution");
}

#[rstest]
#[case::rename(ParticipantArgument::rename("B"), "rename to 'B' (references: true)")]
#[case::moved(ParticipantArgument::move_to("q"), "move to 'q' (references: true)")]
#[case::copy(ParticipantArgument::Copy { destination: String::from("q") }, "copy to 'q'")]
#[case::delete(ParticipantArgument::Delete, "delete")]
fn arguments_render_readably(#[case] argument: ParticipantArgument, #[case] expected: &str) {
    assert_eq!(argument.to_string(), expected);
}
