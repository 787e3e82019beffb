//! Unit tests for change trees and inverses.

use heddle_status::Severity;
use rstest::{fixture, rstest};

use super::*;
use crate::store::InMemoryWorkspace;

fn doc(path: &str) -> DocumentPath {
    DocumentPath::new(path)
}

#[fixture]
fn store() -> InMemoryWorkspace {
    InMemoryWorkspace::with_documents([
        ("p/A.java", "package p;\nclass A {\n  A a;\n}\n"),
        ("p/B.java", "package p;\nclass B extends A {}\n"),
    ])
}

fn replace(line: u32, start: u32, end: u32, text: &str) -> TextEdit {
    TextEdit::from_positions(Position::new(line, start), Position::new(line, end), text)
}

#[rstest]
fn text_change_inverse_restores_original(mut store: InMemoryWorkspace) {
    let original = store.read(&doc("p/A.java")).map(str::to_owned);
    let change = TextChange::for_document(
        &store,
        "Rename A",
        doc("p/A.java"),
        vec![replace(1, 6, 7, "Alpha"), replace(2, 2, 3, "Alpha")],
    );

    let inverse = Box::new(change)
        .perform(&mut store)
        .expect("change applies")
        .expect("text changes are reversible");
    assert_eq!(
        store.read(&doc("p/A.java")),
        Some("package p;\nclass Alpha {\n  Alpha a;\n}\n")
    );

    assert!(inverse.is_valid(&store).is_ok());
    let redo = inverse
        .perform(&mut store)
        .expect("inverse applies")
        .expect("inverse is reversible");
    assert_eq!(store.read(&doc("p/A.java")).map(str::to_owned), original);

    redo.perform(&mut store).expect("redo applies");
    assert_eq!(
        store.read(&doc("p/A.java")),
        Some("package p;\nclass Alpha {\n  Alpha a;\n}\n")
    );
}

#[rstest]
#[case::insertion(TextEdit::insert_at(Position::new(0, 6), "beautiful "), "hello beautiful world")]
#[case::deletion(TextEdit::delete_range(Position::new(0, 5), Position::new(0, 11)), "hello")]
#[case::end_of_line(TextEdit::insert_at(Position::new(0, 11), "!"), "hello world!")]
fn text_edits_apply_and_invert(#[case] edit: TextEdit, #[case] expected: &str) {
    let path = doc("greeting.txt");
    let mut store = InMemoryWorkspace::with_documents([("greeting.txt", "hello world")]);
    let change = TextChange::for_document(&store, "Edit", path.clone(), vec![edit]);

    let inverse = Box::new(change)
        .perform(&mut store)
        .expect("applies")
        .expect("reversible");
    assert_eq!(store.read(&path), Some(expected));

    inverse.perform(&mut store).expect("inverse applies");
    assert_eq!(store.read(&path), Some("hello world"));
}

#[test]
fn text_edits_handle_crlf_line_endings() {
    let path = doc("lines.txt");
    let mut store =
        InMemoryWorkspace::with_documents([("lines.txt", "line one\r\nline two\r\nline three")]);
    let change = TextChange::for_document(&store, "Edit", path.clone(), vec![replace(1, 5, 8, "TWO")]);

    let inverse = Box::new(change)
        .perform(&mut store)
        .expect("applies")
        .expect("reversible");
    assert_eq!(store.read(&path), Some("line one\r\nline TWO\r\nline three"));

    inverse.perform(&mut store).expect("inverse applies");
    assert_eq!(store.read(&path), Some("line one\r\nline two\r\nline three"));
}

#[rstest]
fn overlapping_edits_are_rejected(mut store: InMemoryWorkspace) {
    let change = TextChange::for_document(
        &store,
        "Overlap",
        doc("p/A.java"),
        vec![replace(1, 0, 7, "x"), replace(1, 6, 9, "y")],
    );
    let err = Box::new(change)
        .perform(&mut store)
        .expect_err("overlap must fail");
    assert!(matches!(err, ChangeError::OverlappingEdits { .. }));
}

#[rstest]
fn past_end_positions_are_rejected(mut store: InMemoryWorkspace) {
    let change = TextChange::for_document(
        &store,
        "Beyond",
        doc("p/A.java"),
        vec![TextEdit::insert_at(Position::new(40, 0), "x")],
    );
    let err = Box::new(change)
        .perform(&mut store)
        .expect_err("position past EOF");
    assert!(matches!(err, ChangeError::InvalidPosition { .. }));
}

#[rstest]
fn stale_text_change_is_fatal(mut store: InMemoryWorkspace) {
    let change = TextChange::for_document(&store, "Edit", doc("p/A.java"), Vec::new());
    store.insert("p/A.java", "class Drifted {}");

    let status = change.is_valid(&store);
    assert_eq!(status.severity(), Severity::Fatal);
    assert!(
        status
            .message_matching(Severity::Fatal)
            .is_some_and(|message| message.contains("modified"))
    );
}

#[rstest]
fn missing_document_is_fatal(store: InMemoryWorkspace) {
    let change = TextChange::new("Edit", doc("p/Gone.java"));
    assert!(change.is_valid(&store).has_fatal());
}

#[rstest]
fn document_changes_invert_each_other(mut store: InMemoryWorkspace) {
    let create = CreateDocumentChange::new("Create C", doc("p/C.java"), "class C {}");
    assert!(create.is_valid(&store).is_ok());
    let delete = Box::new(create)
        .perform(&mut store)
        .expect("create applies")
        .expect("reversible");
    assert!(store.exists(&doc("p/C.java")));

    delete.perform(&mut store).expect("delete applies");
    assert!(!store.exists(&doc("p/C.java")));

    let rename = RenameDocumentChange::new("Move B", doc("p/B.java"), doc("q/B.java"));
    let back = Box::new(rename)
        .perform(&mut store)
        .expect("rename applies")
        .expect("reversible");
    assert!(store.exists(&doc("q/B.java")));
    back.perform(&mut store).expect("rename back applies");
    assert!(store.exists(&doc("p/B.java")));
}

#[rstest]
fn rename_onto_existing_document_is_fatal(store: InMemoryWorkspace) {
    let rename = RenameDocumentChange::new("Clash", doc("p/A.java"), doc("p/B.java"));
    assert!(rename.is_valid(&store).has_fatal());
}

#[rstest]
fn delete_restores_content_on_undo(mut store: InMemoryWorkspace) {
    let before = store.read(&doc("p/B.java")).map(str::to_owned);
    let delete = DeleteDocumentChange::for_document(&store, "Delete B", doc("p/B.java"));
    let create = Box::new(delete)
        .perform(&mut store)
        .expect("delete applies")
        .expect("reversible");
    create.perform(&mut store).expect("recreate applies");
    assert_eq!(store.read(&doc("p/B.java")).map(str::to_owned), before);
}

#[rstest]
fn composite_inverse_runs_in_reverse_order(mut store: InMemoryWorkspace) {
    let before = store.clone();
    let composite = CompositeChange::new("Rename A to C")
        .with_child(Box::new(TextChange::for_document(
            &store,
            "Edit A",
            doc("p/A.java"),
            vec![replace(1, 6, 7, "C")],
        )))
        .with_child(Box::new(RenameDocumentChange::new(
            "Rename A.java",
            doc("p/A.java"),
            doc("p/C.java"),
        )));
    assert_eq!(composite.children().len(), 2);
    assert_eq!(
        composite.affected_documents(),
        vec![doc("p/A.java"), doc("p/C.java")]
    );

    let inverse = Box::new(composite)
        .perform(&mut store)
        .expect("composite applies")
        .expect("reversible");
    assert_eq!(
        inverse
            .children()
            .iter()
            .map(|child| child.name())
            .collect::<Vec<_>>(),
        ["Rename A.java", "Edit A"]
    );
    assert!(store.read(&doc("p/C.java")).is_some_and(|text| text.contains("class C")));
    assert!(inverse.is_valid(&store).is_ok());

    inverse.perform(&mut store).expect("undo applies");
    assert_eq!(store.documents(), before.documents());
}

#[rstest]
fn composite_unwinds_performed_children_on_failure(mut store: InMemoryWorkspace) {
    let before = store.clone();
    let composite = CompositeChange::new("Broken")
        .with_child(Box::new(TextChange::for_document(
            &store,
            "Edit A",
            doc("p/A.java"),
            vec![replace(1, 6, 7, "C")],
        )))
        .with_child(Box::new(DeleteDocumentChange::new("Delete ghost", doc("p/Ghost.java"))));

    let err = Box::new(composite)
        .perform(&mut store)
        .expect_err("second child fails");
    assert!(matches!(err, ChangeError::Store(_)));
    assert_eq!(store.documents(), before.documents());
}

#[rstest]
fn composite_validity_merges_children(store: InMemoryWorkspace) {
    let composite = CompositeChange::new("Mixed")
        .with_child(Box::new(NullChange::new("noop")))
        .with_child(Box::new(TextChange::new("Edit ghost", doc("p/Ghost.java"))));
    assert!(composite.is_valid(&store).has_fatal());
}

#[rstest]
fn children_depending_on_earlier_siblings_are_checked_when_run(store: InMemoryWorkspace) {
    let composite = CompositeChange::new("Rename then edit")
        .with_child(Box::new(RenameDocumentChange::new(
            "Rename A.java",
            doc("p/A.java"),
            doc("p/C.java"),
        )))
        .with_child(Box::new(TextChange::new("Edit C", doc("p/C.java"))));

    assert!(composite.is_valid(&store).is_ok());
}

#[rstest]
fn stale_text_change_fails_when_performed(mut store: InMemoryWorkspace) {
    let change = TextChange::for_document(
        &store,
        "Edit A",
        doc("p/A.java"),
        vec![replace(1, 6, 7, "C")],
    );
    store.insert("p/A.java", "package p;\nclass Z {}\n");

    let err = Box::new(change)
        .perform(&mut store)
        .expect_err("stamp no longer matches");

    assert!(matches!(err, ChangeError::Failed { .. }));
    assert_eq!(
        store.read(&doc("p/A.java")),
        Some("package p;\nclass Z {}\n")
    );
}

#[derive(Debug)]
struct OneWay;

impl Change for OneWay {
    fn name(&self) -> String {
        String::from("one way")
    }

    fn is_valid(&self, _store: &dyn BackingStore) -> Status {
        Status::ok()
    }

    fn perform(
        self: Box<Self>,
        _store: &mut dyn BackingStore,
    ) -> Result<Option<Box<dyn Change>>, ChangeError> {
        Ok(None)
    }

    fn affected_documents(&self) -> Vec<DocumentPath> {
        Vec::new()
    }
}

#[rstest]
fn composite_without_child_inverse_is_irreversible(mut store: InMemoryWorkspace) {
    let composite = CompositeChange::new("Partly reversible")
        .with_child(Box::new(NullChange::new("noop")))
        .with_child(Box::new(OneWay));
    let inverse = Box::new(composite).perform(&mut store).expect("applies");
    assert!(inverse.is_none());
}

#[test]
fn content_stamp_tracks_content() {
    let stamp = ContentStamp::of("class A {}");
    assert!(stamp.matches("class A {}"));
    assert!(!stamp.matches("class B {}"));
    assert!(format!("{stamp:?}").starts_with("ContentStamp("));
}

#[test]
fn position_from_offset_counts_lines() {
    let content = "ab\ncd\nef";
    assert_eq!(Position::at_offset(content, 4), Some(Position::new(1, 1)));
    assert_eq!(Position::at_offset(content, 8), Some(Position::new(2, 2)));
    assert_eq!(Position::at_offset(content, 9), None);
}
