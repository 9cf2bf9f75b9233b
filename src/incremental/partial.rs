//! The partial (incremental) parser.
//!
//! Re-lexes a single leaf span with the edit applied and, when the new text
//! still forms a coherent span of the same kind, rewrites only that leaf.
//! Every sibling and ancestor green node is shared by reference with the
//! previous tree.
//!
//! Speculation is tracked here: a provisional acceptance leaves a mark that
//! the next edit must directly extend, otherwise it is rejected outright —
//! two speculative patches are never compounded.

use std::sync::Arc;

use rowan::{GreenNode, GreenNodeBuilder};
use text_size::TextSize;
use tracing::{debug, trace};

use crate::base::Edit;
use crate::engine::GrammarEngine;
use crate::parser::{OwnedToken, SyntaxKind, keywords};
use crate::syntax::{LeafSpan, SyntaxTree};

use super::PartialParseResult;
use super::policy::{InsertionShape, ProvisionalMark, ProvisionalPolicy};

/// Result of a partial-parse attempt, with the patched tree when the edit
/// was accepted.
#[derive(Debug)]
pub struct PartialOutcome {
    pub result: PartialParseResult,
    pub tree: Option<SyntaxTree>,
}

impl PartialOutcome {
    fn rejected() -> PartialOutcome {
        PartialOutcome {
            result: PartialParseResult::REJECTED,
            tree: None,
        }
    }

    fn flags(result: PartialParseResult) -> PartialOutcome {
        PartialOutcome { result, tree: None }
    }
}

/// Attempts in-place patches and carries the provisional state of the
/// session.
pub struct PartialParser {
    engine: Arc<dyn GrammarEngine>,
    policy: ProvisionalPolicy,
    pending: Option<ProvisionalMark>,
}

impl PartialParser {
    pub fn new(engine: Arc<dyn GrammarEngine>, policy: ProvisionalPolicy) -> PartialParser {
        PartialParser {
            engine,
            policy,
            pending: None,
        }
    }

    pub fn policy(&self) -> &ProvisionalPolicy {
        &self.policy
    }

    /// Whether the last accepted change is still awaiting confirmation.
    pub fn is_provisional(&self) -> bool {
        self.pending.is_some()
    }

    /// Forget any pending speculation. Called when a full reparse commits.
    pub fn reset(&mut self) {
        self.pending = None;
    }

    /// Provisional gate: while a provisional patch is pending, only an edit
    /// that directly extends it may proceed. Returns `true` when the edit is
    /// blocked and must be rejected (forcing a full reparse).
    pub fn gate_blocks(&mut self, edit: &Edit) -> bool {
        match self.pending {
            None => false,
            Some(mark) if mark.is_continuation(edit.change()) => false,
            Some(mark) => {
                debug!(?mark, "edit does not extend provisional mark; rejecting");
                self.pending = None;
                true
            }
        }
    }

    /// Attempt to patch `tree` in place for `edit`, whose owner `target` the
    /// classifier already located.
    pub fn parse(&mut self, tree: &SyntaxTree, edit: &Edit, target: &LeafSpan) -> PartialOutcome {
        let change = edit.change();
        let old_text = tree.snapshot().slice(target.range);
        let new_text = change.apply_to_span(old_text, target.range);
        if new_text == old_text {
            return PartialOutcome::flags(PartialParseResult::NO_OP);
        }

        let outcome = match target.kind {
            SyntaxKind::EXPR_SPAN => self.relex_expression(tree, edit, target, &new_text),
            SyntaxKind::MARKUP_SPAN => self.relex_markup(tree, edit, target, &new_text),
            // The classifier only forwards partial-editable kinds.
            _ => PartialOutcome::rejected(),
        };
        if outcome.result.is_rejected() {
            self.pending = None;
        }
        outcome
    }

    // =========================================================================
    // Expression spans
    // =========================================================================

    fn relex_expression(
        &mut self,
        tree: &SyntaxTree,
        edit: &Edit,
        target: &LeafSpan,
        new_text: &str,
    ) -> PartialOutcome {
        let tokens = self.engine.tokenize(new_text);
        let Some(shape) = analyze_expression(&tokens) else {
            trace!(%new_text, "re-lex did not form a single expression span");
            return PartialOutcome::rejected();
        };

        // A first identifier that became reserved changes the grammar of the
        // surrounding content; the patch cannot see that far.
        let first = tokens
            .first()
            .map(|t| t.text.as_str())
            .unwrap_or_default();
        if keywords::is_block_keyword(first) {
            return PartialOutcome::rejected();
        }
        if keywords::is_directive(first) {
            return PartialOutcome::flags(
                PartialParseResult::REJECTED | PartialParseResult::SPAN_CONTEXT_CHANGED,
            );
        }

        let mut result = PartialParseResult::ACCEPTED;
        let mut mark = None;

        if let Some(dot_end) = shape.questionable_dot_end {
            if target.accepts_trailing_dot {
                // Statement-context expressions keep speculative dots at full
                // parse too, so nothing is owed.
            } else if self.policy.allows(InsertionShape::TrailingDot) {
                result |= PartialParseResult::PROVISIONAL;
                mark = Some(ProvisionalMark {
                    shape: InsertionShape::TrailingDot,
                    pos: target.range.start() + dot_end,
                });
            } else {
                return PartialOutcome::rejected();
            }
        }

        if let Some(open_end) = shape.empty_paren_open_end {
            if edit.change().new_text().contains('(')
                && self.policy.allows(InsertionShape::ParenPair)
            {
                result |= PartialParseResult::PROVISIONAL;
                mark = Some(ProvisionalMark {
                    shape: InsertionShape::ParenPair,
                    pos: target.range.start() + open_end,
                });
            }
        }

        if shape.has_parens != target.has_parens {
            result |= PartialParseResult::SPAN_CONTEXT_CHANGED;
        }

        let Some(patched) = patch_span(tree, edit, target, &tokens) else {
            return PartialOutcome::rejected();
        };
        self.pending = mark;
        trace!(result = ?result, span = ?target.range, "expression span patched");
        PartialOutcome {
            result,
            tree: Some(patched),
        }
    }

    // =========================================================================
    // Markup spans
    // =========================================================================

    fn relex_markup(
        &mut self,
        tree: &SyntaxTree,
        edit: &Edit,
        target: &LeafSpan,
        new_text: &str,
    ) -> PartialOutcome {
        let Some(tokens) = scan_markup(new_text) else {
            trace!("markup re-lex found a bare transition; rejecting");
            return PartialOutcome::rejected();
        };
        if tokens.is_empty() {
            // An empty leaf is structure the patch cannot clean up.
            return PartialOutcome::rejected();
        }
        let Some(patched) = patch_span(tree, edit, target, &tokens) else {
            return PartialOutcome::rejected();
        };
        trace!(span = ?target.range, "markup span patched");
        PartialOutcome {
            result: PartialParseResult::ACCEPTED,
            tree: Some(patched),
        }
    }
}

/// Rewrite `target` with `tokens` and splice the result into the tree,
/// reusing all other green nodes by reference.
fn patch_span(
    tree: &SyntaxTree,
    edit: &Edit,
    target: &LeafSpan,
    tokens: &[OwnedToken],
) -> Option<SyntaxTree> {
    let root = tree.syntax();
    let node = target.node_in(&root)?;
    let mut builder = GreenNodeBuilder::new();
    builder.start_node(target.kind.into());
    for token in tokens {
        builder.token(token.kind.into(), &token.text);
    }
    builder.finish_node();
    let span_green: GreenNode = builder.finish();
    let new_root = node.replace_with(span_green);
    Some(tree.with_patch(new_root, edit.new_snapshot().clone(), edit.change()))
}

// =============================================================================
// Expression shape analysis
// =============================================================================

struct ExprShape {
    /// Offset just past the last dot that is not followed by an identifier.
    questionable_dot_end: Option<TextSize>,
    has_parens: bool,
    /// Offset just past the opening paren of a trailing `()` pair.
    empty_paren_open_end: Option<TextSize>,
}

/// Validate that `tokens` form a single implicit-expression span:
/// `Ident (('.' Ident) | '(' ... ')')*` with dots allowed to dangle.
/// Whitespace may only appear inside paren groups.
fn analyze_expression(tokens: &[OwnedToken]) -> Option<ExprShape> {
    let mut shape = ExprShape {
        questionable_dot_end: None,
        has_parens: false,
        empty_paren_open_end: None,
    };

    let mut pos = TextSize::new(0);
    let mut i = 0usize;

    if tokens.first()?.kind != SyntaxKind::IDENT {
        return None;
    }
    pos += TextSize::of(tokens[0].text.as_str());
    i += 1;

    while i < tokens.len() {
        match tokens[i].kind {
            SyntaxKind::DOT => {
                pos += TextSize::of(".");
                i += 1;
                match tokens.get(i).map(|t| t.kind) {
                    Some(SyntaxKind::IDENT) => {
                        pos += TextSize::of(tokens[i].text.as_str());
                        i += 1;
                    }
                    // Dangling dot: fine lexically, questionable
                    // structurally. A following dot is examined on its own
                    // on the next iteration.
                    Some(SyntaxKind::DOT) | None => {
                        shape.questionable_dot_end = Some(pos);
                    }
                    Some(_) => return None,
                }
            }
            SyntaxKind::L_PAREN => {
                shape.has_parens = true;
                let open_end = pos + TextSize::of("(");
                let mut depth = 1usize;
                let mut inner_tokens = 0usize;
                pos = open_end;
                i += 1;
                while depth > 0 {
                    let token = tokens.get(i)?;
                    match token.kind {
                        SyntaxKind::L_PAREN => depth += 1,
                        SyntaxKind::R_PAREN => depth -= 1,
                        _ => {}
                    }
                    if depth > 0 {
                        inner_tokens += 1;
                    }
                    pos += TextSize::of(token.text.as_str());
                    i += 1;
                }
                if inner_tokens == 0 && i == tokens.len() {
                    shape.empty_paren_open_end = Some(open_end);
                }
            }
            _ => return None,
        }
    }
    Some(shape)
}

// =============================================================================
// Markup re-scan
// =============================================================================

/// Scan markup text into MARKUP_TEXT / AT_AT tokens. A bare `@` means the
/// text is no longer plain markup; the caller must reject.
fn scan_markup(text: &str) -> Option<Vec<OwnedToken>> {
    let mut tokens = Vec::new();
    let mut rest = text;
    loop {
        match rest.find('@') {
            None => {
                if !rest.is_empty() {
                    tokens.push(OwnedToken::new(SyntaxKind::MARKUP_TEXT, rest));
                }
                return Some(tokens);
            }
            Some(at) => {
                if rest[at + 1..].starts_with('@') {
                    if at > 0 {
                        tokens.push(OwnedToken::new(SyntaxKind::MARKUP_TEXT, &rest[..at]));
                    }
                    tokens.push(OwnedToken::new(SyntaxKind::AT_AT, "@@"));
                    rest = &rest[at + 2..];
                } else {
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StencilEngine;

    fn analyze(text: &str) -> Option<ExprShape> {
        analyze_expression(&StencilEngine.tokenize(text))
    }

    #[test]
    fn member_chain_is_clean() {
        let shape = analyze("DateTime.Now").unwrap();
        assert!(shape.questionable_dot_end.is_none());
        assert!(!shape.has_parens);
    }

    #[test]
    fn trailing_dot_is_questionable() {
        let shape = analyze("User.").unwrap();
        assert_eq!(shape.questionable_dot_end, Some(TextSize::new(5)));
    }

    #[test]
    fn inner_double_dot_is_questionable() {
        let shape = analyze("DateTime..Now").unwrap();
        assert_eq!(shape.questionable_dot_end, Some(TextSize::new(9)));
    }

    #[test]
    fn whitespace_outside_parens_splits_the_span() {
        assert!(analyze("foo bar").is_none());
        assert!(analyze("foo (1)").is_none());
    }

    #[test]
    fn call_parens_are_allowed() {
        let shape = analyze("foo.ToString(\"u\")").unwrap();
        assert!(shape.has_parens);
        assert!(shape.empty_paren_open_end.is_none());
    }

    #[test]
    fn trailing_empty_parens_are_noted() {
        let shape = analyze("foo()").unwrap();
        assert_eq!(shape.empty_paren_open_end, Some(TextSize::new(4)));
    }

    #[test]
    fn leading_junk_is_invalid() {
        assert!(analyze(".foo").is_none());
        assert!(analyze("1.foo").is_none());
        assert!(analyze("foo@bar").is_none());
    }

    #[test]
    fn markup_scan_handles_escapes() {
        let tokens = scan_markup("a@@b").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, SyntaxKind::AT_AT);
        assert!(scan_markup("a@b").is_none());
    }
}
