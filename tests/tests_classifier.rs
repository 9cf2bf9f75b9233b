//! Change-classification rules, driven through public types only.

use rstest::rstest;

use stencil::base::{Edit, Snapshot, SourceChange};
use stencil::incremental::{Classification, IneligibleReason, ProvisionalPolicy, classify};
use stencil::parser::{SyntaxKind, parse_document};
use stencil::syntax::SyntaxTree;

fn classify_on(text: &str, change: SourceChange) -> Classification {
    let old = Snapshot::initial(text);
    let tree = SyntaxTree::new(parse_document(text), old.clone());
    let new = old.apply(&change);
    let edit = Edit::new(old, new, change);
    classify(&tree, &edit, &ProvisionalPolicy::default())
}

#[rstest]
#[case("if")]
#[case("else")]
#[case("for")]
#[case("foreach")]
#[case("while")]
#[case("do")]
#[case("switch")]
#[case("try")]
#[case("lock")]
#[case("using")]
fn every_block_keyword_replacement_is_ineligible(#[case] keyword: &str) {
    // Replace the identifier of "foo @date baz" with the keyword.
    let verdict = classify_on("foo @date baz", SourceChange::new(5, 4, keyword));
    assert_eq!(
        verdict,
        Classification::NotEligible(IneligibleReason::ReservedWord {
            word: keyword.to_string(),
            directive: false,
        })
    );
}

#[rstest]
#[case("inherits")]
#[case("functions")]
#[case("section")]
#[case("class")]
#[case("namespace")]
fn every_directive_replacement_is_ineligible(#[case] directive: &str) {
    let verdict = classify_on("foo @date baz", SourceChange::new(5, 4, directive));
    assert_eq!(
        verdict,
        Classification::NotEligible(IneligibleReason::ReservedWord {
            word: directive.to_string(),
            directive: true,
        })
    );
}

#[test]
fn keyword_as_substring_is_fine() {
    // "iff" contains "if" but is an ordinary identifier.
    match classify_on("foo @date baz", SourceChange::new(5, 4, "iff")) {
        Classification::Eligible(span) => assert_eq!(span.kind, SyntaxKind::EXPR_SPAN),
        other => panic!("expected eligible, got {other:?}"),
    }
}

#[test]
fn edit_contained_in_one_span_is_eligible() {
    match classify_on("foo @bar baz", SourceChange::new(5, 3, "DateTime")) {
        Classification::Eligible(span) => {
            assert_eq!(span.kind, SyntaxKind::EXPR_SPAN);
            assert!(!span.accepts_trailing_dot);
        }
        other => panic!("expected eligible, got {other:?}"),
    }
}

#[test]
fn edit_across_expression_and_markup_is_ineligible() {
    assert_eq!(
        classify_on("foo @bar baz", SourceChange::new(7, 3, "p D")),
        Classification::NotEligible(IneligibleReason::CrossesSpanBoundary)
    );
}

#[rstest]
#[case(SourceChange::insertion(2, "\n"))]
#[case(SourceChange::insertion(2, "a\r\nb"))]
#[case(SourceChange::deletion(3, 1))]
fn newline_edits_are_ineligible(#[case] change: SourceChange) {
    assert_eq!(
        classify_on("foo\nbar", change),
        Classification::NotEligible(IneligibleReason::ContainsNewline)
    );
}

#[test]
fn keyword_span_interiors_are_off_limits() {
    // "a @if (x) { y }" - touch the body.
    assert_eq!(
        classify_on("a @if (x) { y }", SourceChange::insertion(12, "z")),
        Classification::NotEligible(IneligibleReason::SpanKindForbids(SyntaxKind::KEYWORD_SPAN))
    );
}

#[test]
fn directive_span_interiors_are_off_limits() {
    assert_eq!(
        classify_on("@inherits Foo\nx", SourceChange::insertion(11, "o")),
        Classification::NotEligible(IneligibleReason::SpanKindForbids(SyntaxKind::DIRECTIVE_SPAN))
    );
}

#[test]
fn stale_tree_is_never_patched() {
    let s0 = Snapshot::initial("foo @bar baz");
    let tree = SyntaxTree::new(parse_document(s0.text()), s0.clone());
    let c1 = SourceChange::insertion(8, "x");
    let s1 = s0.apply(&c1);
    let c2 = SourceChange::insertion(9, "y");
    let s2 = s1.apply(&c2);
    let edit = Edit::new(s1, s2, c2);
    assert_eq!(
        classify(&tree, &edit, &ProvisionalPolicy::default()),
        Classification::NotEligible(IneligibleReason::StaleTree)
    );
}

#[test]
fn end_of_expression_insertion_belongs_to_the_expression() {
    match classify_on("foo @bar baz", SourceChange::insertion(8, ".")) {
        Classification::Eligible(span) => assert_eq!(span.kind, SyntaxKind::EXPR_SPAN),
        other => panic!("expected eligible, got {other:?}"),
    }
}

#[test]
fn whitespace_after_expression_belongs_to_markup() {
    match classify_on("foo @bar baz", SourceChange::insertion(8, " x")) {
        Classification::Eligible(span) => assert_eq!(span.kind, SyntaxKind::MARKUP_SPAN),
        other => panic!("expected eligible, got {other:?}"),
    }
}
