//! Unit tests for the lexical source model.

use heddle_core::InMemoryWorkspace;
use rstest::rstest;

use super::*;

fn spelled<'a>(content: &'a str, token: &Token) -> &'a str {
    content.get(token.start..token.end).unwrap_or_default()
}

#[rstest]
#[case::plain("Alpha", true)]
#[case::underscore("_count", true)]
#[case::digit_first("1st", false)]
#[case::keyword("class", false)]
#[case::empty("", false)]
#[case::dotted("p.A", false)]
fn identifiers_are_validated(#[case] name: &str, #[case] expected: bool) {
    assert_eq!(is_identifier(name), expected);
}

#[rstest]
fn tokens_are_classified_by_region() {
    let content = "class A { // uses A\n  String s = \"A\"; /* A */ A a; }\n";

    let found: Vec<(Region, usize)> = occurrences(content, "A")
        .iter()
        .map(|token| (token.region, token.start))
        .collect();

    let regions: Vec<Region> = found.iter().map(|(region, _)| *region).collect();
    assert_eq!(
        regions,
        vec![
            Region::Code,
            Region::Comment,
            Region::Literal,
            Region::Comment,
            Region::Code,
        ]
    );
}

#[rstest]
fn identifiers_inside_longer_names_are_not_matched() {
    let content = "class AB extends A { A_1 x; A1 y; A z; }";

    let code: Vec<&str> = occurrences(content, "A")
        .iter()
        .map(|token| spelled(content, token))
        .collect();

    assert_eq!(code.len(), 2);
}

#[rstest]
fn escaped_quotes_stay_inside_literals() {
    let content = "String s = \"say \\\"A\\\"\"; A a;";

    let regions: Vec<Region> = occurrences(content, "A")
        .iter()
        .map(|token| token.region)
        .collect();

    assert_eq!(regions, vec![Region::Literal, Region::Code]);
}

#[rstest]
fn keyword_precedes_declaration() {
    let content = "public class A extends B {}";
    let all = tokens(content);
    let declaration = occurrences(content, "A");

    assert!(declaration
        .first()
        .is_some_and(|token| preceded_by(content, &all, token, "class")));
}

#[rstest]
#[case::qualified("type=p.A\n", vec![5])]
#[case::longer_name("type=p.AB\n", vec![])]
#[case::nested_package("type=q.p.A\n", vec![])]
#[case::twice("p.A,p.A", vec![0, 4])]
fn qualified_names_respect_boundaries(#[case] content: &str, #[case] expected: Vec<usize>) {
    assert_eq!(qualified_occurrences(content, "p.A"), expected);
}

#[rstest]
fn argument_lists_respect_nesting() {
    let content = "m(f(a, b), \"x,y\", c)";

    let list = argument_list(content, 1).expect("list is terminated");

    let items: Vec<&str> = list
        .items
        .iter()
        .map(|(start, end)| content.get(*start..*end).unwrap_or_default())
        .collect();
    assert_eq!(items, vec!["f(a, b)", "\"x,y\"", "c"]);
    assert_eq!(list.end, content.len());
}

#[rstest]
#[case::empty("m()", 0)]
#[case::spaced("m( int i ,int j )", 2)]
fn argument_lists_count_items(#[case] content: &str, #[case] count: usize) {
    let list = argument_list(content, 1).expect("list is terminated");

    assert_eq!(list.items.len(), count);
}

#[rstest]
fn unterminated_argument_list_is_rejected() {
    assert!(argument_list("m(a, b", 1).is_none());
    assert!(argument_list("m a", 1).is_none());
}

#[rstest]
fn qualified_names_map_to_documents() {
    assert_eq!(type_document("p.q.A").as_str(), "p/q/A.java");
    assert_eq!(split_qualified("p.q.A"), ("p.q", "A"));
    assert_eq!(split_qualified("A"), ("", "A"));
    assert_eq!(qualify("", "A"), "A");
    assert_eq!(qualify("p", "A"), "p.A");
}

#[rstest]
fn edit_set_merges_edits_per_document() {
    let store = InMemoryWorkspace::with_documents([("p/A.java", "class A { A a; }\n")]);
    let path = DocumentPath::new("p/A.java");
    let mut edits = EditSet::default();
    edits.replace(&path, 6, 7, "B");
    edits.replace(&path, 10, 11, "B");
    edits.replace(&path, 6, 7, "B");

    let changes = edits.into_changes(&store).expect("offsets are valid");

    assert_eq!(changes.len(), 1);
    assert_eq!(changes.first().map(|change| change.edits().len()), Some(2));
}

#[rstest]
fn edit_set_rejects_missing_documents() {
    let store = InMemoryWorkspace::new();
    let mut edits = EditSet::default();
    edits.replace(&DocumentPath::new("p/A.java"), 0, 1, "B");

    let status = edits.into_changes(&store).expect_err("document is missing");

    assert!(status.has_fatal());
}
