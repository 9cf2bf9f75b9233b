//! In-place patching behavior, end to end through a session: acceptance,
//! provisional dots and parens, conservative rejections.
//!
//! The idle delay is set absurdly high so the background reparse never runs
//! inside a test; every result below is the synchronous patch verdict.

use std::sync::Arc;
use std::time::Duration;

use stencil::base::Snapshot;
use stencil::incremental::PartialParseResult;
use stencil::parser::parse_document;
use stencil::session::{ParserSession, SessionOptions};
use stencil::syntax::{SyntaxTree, structurally_equal};
use stencil::{StencilEngine, TextBuffer};

fn session_over(text: &str) -> (ParserSession, TextBuffer) {
    let options = SessionOptions::default().with_idle_delay(Duration::from_secs(3600));
    let session = ParserSession::start(Arc::new(StencilEngine), text, options)
        .expect("seed parse");
    (session, TextBuffer::new(text))
}

#[test]
fn whole_identifier_replacement_is_accepted() {
    let (session, mut buffer) = session_over("foo @bar baz");
    let result = session.on_edit(&buffer.replace(5, 3, "DateTime"));
    assert_eq!(result, PartialParseResult::ACCEPTED);
    assert_eq!(session.tree().syntax().text().to_string(), "foo @DateTime baz");
}

#[test]
fn accepted_patch_matches_a_full_reparse() {
    let (session, mut buffer) = session_over("foo @bar baz");
    let edit = buffer.replace(5, 3, "DateTime");
    assert_eq!(session.on_edit(&edit), PartialParseResult::ACCEPTED);
    let fresh = SyntaxTree::new(
        parse_document(buffer.text()),
        Snapshot::initial(buffer.text()),
    );
    assert!(structurally_equal(&session.tree(), &fresh));
}

#[test]
fn prefix_replacement_is_accepted() {
    let (session, mut buffer) = session_over("foo @bar baz");
    assert_eq!(
        session.on_edit(&buffer.replace(5, 1, "B")),
        PartialParseResult::ACCEPTED
    );
    assert_eq!(session.tree().syntax().text().to_string(), "foo @Bar baz");
}

#[test]
fn trailing_dot_in_markup_context_is_provisional() {
    let (session, mut buffer) = session_over("foo @bar baz");
    let result = session.on_edit(&buffer.insert(8, "."));
    assert_eq!(
        result,
        PartialParseResult::ACCEPTED | PartialParseResult::PROVISIONAL
    );
    assert!(session.is_provisional());
    assert_eq!(session.tree().syntax().text().to_string(), "foo @bar. baz");
}

#[test]
fn member_name_confirms_a_provisional_dot() {
    let (session, mut buffer) = session_over("foo @bar baz");
    session.on_edit(&buffer.insert(8, "."));
    let result = session.on_edit(&buffer.insert(9, "Now"));
    assert_eq!(result, PartialParseResult::ACCEPTED);
    assert!(!session.is_provisional());
    assert_eq!(session.tree().syntax().text().to_string(), "foo @bar.Now baz");
}

#[test]
fn second_dot_after_a_provisional_dot_is_rejected() {
    let (session, mut buffer) = session_over("foo @bar baz");
    session.on_edit(&buffer.insert(8, "."));
    assert_eq!(
        session.on_edit(&buffer.insert(9, ".")),
        PartialParseResult::REJECTED
    );
    assert!(!session.is_provisional());
}

#[test]
fn unrelated_edit_while_provisional_is_rejected() {
    let (session, mut buffer) = session_over("foo @bar baz");
    session.on_edit(&buffer.insert(8, "."));
    assert_eq!(
        session.on_edit(&buffer.insert(0, "x")),
        PartialParseResult::REJECTED
    );
    assert!(!session.is_provisional());
}

#[test]
fn deletion_leaving_a_trailing_dot_is_provisional() {
    let (session, mut buffer) = session_over("foo @bar.Baz x");
    let result = session.on_edit(&buffer.delete(9, 3));
    assert_eq!(
        result,
        PartialParseResult::ACCEPTED | PartialParseResult::PROVISIONAL
    );
    assert_eq!(session.tree().syntax().text().to_string(), "foo @bar. x");
}

#[test]
fn insertion_ending_in_a_dot_is_provisional() {
    let (session, mut buffer) = session_over("foo @bar baz");
    let result = session.on_edit(&buffer.insert(8, ".Now."));
    assert_eq!(
        result,
        PartialParseResult::ACCEPTED | PartialParseResult::PROVISIONAL
    );
}

#[test]
fn inner_double_dot_is_provisional_in_markup_context() {
    let (session, mut buffer) = session_over("foo @a.b x");
    let result = session.on_edit(&buffer.insert(7, "."));
    assert_eq!(
        result,
        PartialParseResult::ACCEPTED | PartialParseResult::PROVISIONAL
    );
    assert_eq!(session.tree().syntax().text().to_string(), "foo @a..b x");
}

#[test]
fn trailing_dot_in_statement_context_is_plainly_accepted() {
    let (session, mut buffer) = session_over("@{ @foo }");
    let result = session.on_edit(&buffer.insert(7, "."));
    assert_eq!(result, PartialParseResult::ACCEPTED);
    assert!(!session.is_provisional());
    assert_eq!(session.tree().syntax().text().to_string(), "@{ @foo. }");
}

#[test]
fn inner_double_dot_in_statement_context_is_plainly_accepted() {
    let (session, mut buffer) = session_over("@{ @a.b }");
    assert_eq!(
        session.on_edit(&buffer.insert(6, ".")),
        PartialParseResult::ACCEPTED
    );
}

#[test]
fn keyword_replacement_is_rejected() {
    let (session, mut buffer) = session_over("foo @date baz");
    assert_eq!(
        session.on_edit(&buffer.replace(5, 4, "if")),
        PartialParseResult::REJECTED
    );
}

#[test]
fn directive_replacement_is_rejected_with_context_change() {
    let (session, mut buffer) = session_over("foo @date baz");
    assert_eq!(
        session.on_edit(&buffer.replace(5, 4, "inherits")),
        PartialParseResult::REJECTED | PartialParseResult::SPAN_CONTEXT_CHANGED
    );
}

#[test]
fn empty_paren_pair_is_provisional_and_flips_context() {
    let (session, mut buffer) = session_over("foo @bar baz");
    let result = session.on_edit(&buffer.insert(8, "()"));
    assert!(result.is_accepted());
    assert!(result.is_provisional());
    assert!(result.contains(PartialParseResult::SPAN_CONTEXT_CHANGED));
    assert_eq!(session.tree().syntax().text().to_string(), "foo @bar() baz");

    // Typing an argument confirms the speculation.
    let result = session.on_edit(&buffer.insert(9, "1"));
    assert_eq!(result, PartialParseResult::ACCEPTED);
    assert!(!session.is_provisional());
}

#[test]
fn markup_edits_are_accepted() {
    let (session, mut buffer) = session_over("foo @bar baz");
    assert_eq!(
        session.on_edit(&buffer.insert(2, "xy")),
        PartialParseResult::ACCEPTED
    );
    assert_eq!(session.tree().syntax().text().to_string(), "foxyo @bar baz");
}

#[test]
fn bare_transition_in_markup_is_rejected() {
    let (session, mut buffer) = session_over("foo @bar baz");
    assert_eq!(
        session.on_edit(&buffer.insert(2, "@")),
        PartialParseResult::REJECTED
    );
    // The published tree is untouched by the rejection.
    assert_eq!(session.tree().syntax().text().to_string(), "foo @bar baz");
}

#[test]
fn identity_replacement_is_a_no_op() {
    let (session, mut buffer) = session_over("foo @bar baz");
    assert_eq!(
        session.on_edit(&buffer.replace(5, 3, "bar")),
        PartialParseResult::NO_OP
    );
}

#[test]
fn escaped_at_insertion_in_markup_is_accepted() {
    let (session, mut buffer) = session_over("foo @bar baz");
    assert_eq!(
        session.on_edit(&buffer.insert(10, "@@")),
        PartialParseResult::ACCEPTED
    );
    assert_eq!(session.tree().syntax().text().to_string(), "foo @bar b@@az");
}
