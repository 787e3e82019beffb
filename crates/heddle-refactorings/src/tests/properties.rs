//! Properties every reference refactoring must hold.

use heddle_config::EngineConfig;
use heddle_core::{
    CancellationToken, InMemoryWorkspace, Refactoring, Session, verify_equivalence,
};
use rstest::rstest;

use super::support::{
    field_workspace, method_workspace, session, snapshot, type_workspace,
};
use crate::{
    CopyDocumentRefactoring, DeleteDocumentRefactoring, MoveDocumentRefactoring,
    RenameFieldRefactoring, RenameTypeRefactoring, ReorderParametersRefactoring,
    contribution_registry,
};

fn textual_type_rename() -> RenameTypeRefactoring {
    let mut refactoring = RenameTypeRefactoring::new("p.A", "B");
    let capabilities = refactoring
        .capabilities_mut()
        .expect("capabilities are configurable");
    capabilities
        .set_update_text_occurrences(true)
        .expect("text updating is offered");
    capabilities
        .set_update_qualified_names(true)
        .expect("qualified names are offered");
    capabilities
        .set_file_patterns("*.xml")
        .expect("qualified names are offered");
    refactoring
}

fn accessor_rename() -> RenameFieldRefactoring {
    let mut refactoring = RenameFieldRefactoring::new("p.A", "count", "total");
    refactoring
        .capabilities_mut()
        .expect("capabilities are configurable")
        .set_update_derived_elements(true)
        .expect("derived elements are offered");
    refactoring
}

fn applies_cleanly(session: &mut Session<InMemoryWorkspace>, refactoring: &mut dyn Refactoring) {
    let outcome = session
        .perform_refactoring(refactoring)
        .expect("refactoring should run");
    assert!(outcome.is_none(), "unexpected status: {outcome:?}");
}

#[rstest]
#[case::rename_type(type_workspace(), Box::new(RenameTypeRefactoring::new("p.A", "B")))]
#[case::rename_type_textually(type_workspace(), Box::new(textual_type_rename()))]
#[case::rename_field(field_workspace(), Box::new(accessor_rename()))]
#[case::reorder(method_workspace(), Box::new(ReorderParametersRefactoring::new("p.A", "m", vec![1, 0])))]
#[case::move_document(type_workspace(), Box::new(MoveDocumentRefactoring::new("p/User.java", "q")))]
#[case::copy_document(
    type_workspace(),
    Box::new(CopyDocumentRefactoring::new("p/User.java", "q").with_new_name("Copy.java"))
)]
#[case::delete_document(type_workspace(), Box::new(DeleteDocumentRefactoring::new("config/beans.xml")))]
fn undo_restores_and_redo_replays_exactly(
    #[case] workspace: InMemoryWorkspace,
    #[case] mut refactoring: Box<dyn Refactoring>,
) {
    let mut session = session(workspace);
    let before = snapshot(&session);
    applies_cleanly(&mut session, refactoring.as_mut());
    let after = snapshot(&session);
    assert_ne!(after, before);

    session.undo().expect("undo should succeed");
    assert_eq!(snapshot(&session), before);
    assert!(session.undo_manager().anything_to_redo());

    session.redo().expect("redo should succeed");
    assert_eq!(snapshot(&session), after);
}

#[rstest]
#[case::rename_type(type_workspace(), Box::new(RenameTypeRefactoring::new("p.A", "B")))]
#[case::invalid_type_name(type_workspace(), Box::new(RenameTypeRefactoring::new("p.A", "1B")))]
#[case::rename_field(field_workspace(), Box::new(accessor_rename()))]
#[case::missing_field(field_workspace(), Box::new(RenameFieldRefactoring::new("p.A", "size", "total")))]
#[case::reorder(method_workspace(), Box::new(ReorderParametersRefactoring::new("p.A", "m", vec![1, 0])))]
#[case::missing_document(type_workspace(), Box::new(DeleteDocumentRefactoring::new("p/Z.java")))]
fn initial_checks_are_idempotent(
    #[case] workspace: InMemoryWorkspace,
    #[case] mut refactoring: Box<dyn Refactoring>,
) {
    let token = CancellationToken::new();

    let first = refactoring.check_initial_conditions(&workspace, &token);
    let second = refactoring.check_initial_conditions(&workspace, &token);

    assert_eq!(first.severity(), second.severity());
    assert_eq!(first.len(), second.len());
}

#[rstest]
#[case::rename_type(type_workspace(), Box::new(RenameTypeRefactoring::new("p.A", "B")))]
#[case::rename_type_textually(type_workspace(), Box::new(textual_type_rename()))]
#[case::rename_field(field_workspace(), Box::new(accessor_rename()))]
#[case::reorder(method_workspace(), Box::new(ReorderParametersRefactoring::new("p.A", "m", vec![1, 0])))]
#[case::move_document(type_workspace(), Box::new(MoveDocumentRefactoring::new("p/User.java", "q")))]
#[case::copy_document(
    type_workspace(),
    Box::new(CopyDocumentRefactoring::new("p/User.java", "q").with_new_name("Copy.java"))
)]
#[case::delete_used_document(type_workspace(), Box::new(DeleteDocumentRefactoring::new("p/A.java")))]
#[case::refused_rename(type_workspace(), Box::new(RenameTypeRefactoring::new("p.A", "A")))]
fn descriptors_rebuild_equivalent_refactorings(
    #[case] workspace: InMemoryWorkspace,
    #[case] mut refactoring: Box<dyn Refactoring>,
) {
    let registry = contribution_registry().expect("contribution ids are distinct");

    verify_equivalence(
        refactoring.as_mut(),
        &registry,
        &workspace,
        &EngineConfig::default(),
    )
    .expect("rebuilt refactoring behaves identically");
}

#[rstest]
fn sessions_can_verify_round_trips_before_performing() {
    let config = EngineConfig::default().with_descriptor_round_trip(true);
    let mut session = Session::new(type_workspace(), config)
        .with_contributions(contribution_registry().expect("contribution ids are distinct"));
    let mut refactoring = textual_type_rename();

    applies_cleanly(&mut session, &mut refactoring);

    session
        .assert_document_eq("config/beans.xml", "<bean class=\"p.B\"/>\n<bean class=\"p.AB\"/>\n")
        .expect("qualified name renamed");
    assert_eq!(session.history().len(), 1);
}

#[rstest]
fn flushing_clears_both_stacks() {
    let mut session = session(method_workspace());
    let mut first = ReorderParametersRefactoring::new("p.A", "m", vec![1, 0]);
    applies_cleanly(&mut session, &mut first);
    session.undo().expect("undo should succeed");
    assert!(session.undo_manager().anything_to_redo());

    session.flush_undo();

    assert!(!session.undo_manager().anything_to_undo());
    assert!(!session.undo_manager().anything_to_redo());
}

#[rstest]
fn each_refactoring_replaces_the_undo_history() {
    let mut session = session(method_workspace());
    let mut forward = ReorderParametersRefactoring::new("p.A", "m", vec![1, 0]);
    let mut backward = ReorderParametersRefactoring::new("p.A", "m", vec![1, 0]);

    applies_cleanly(&mut session, &mut forward);
    applies_cleanly(&mut session, &mut backward);

    assert_eq!(session.undo_manager().undo_depth(), 1);
    assert_eq!(
        session.undo_manager().peek_undo_name(),
        Some("Reorder parameters of 'p.A.m'")
    );
}
