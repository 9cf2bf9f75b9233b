//! Leaf-span lookup: which leaf span owns a change.
//!
//! The incremental layer only ever patches a single leaf span. Ownership
//! follows the editor's intuition rather than strict containment:
//!
//! - an edit strictly inside one leaf span belongs to that span;
//! - a pure insertion at the *end* of an expression span belongs to the
//!   expression (expressions accept non-whitespace continuation, which is
//!   what makes `@foo` + `.` patchable);
//! - a pure insertion at a markup boundary belongs to the markup span;
//! - anything that straddles two leaves has no owner and forces a reparse.

use rowan::TextRange;

use crate::base::SourceChange;
use crate::parser::{SyntaxKind, SyntaxNode};

/// A lightweight handle to the leaf span that owns a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSpan {
    pub kind: SyntaxKind,
    pub range: TextRange,
    /// Expression spans nested in statement blocks accept a trailing dot.
    pub accepts_trailing_dot: bool,
    /// Context tag for expression spans: does the span contain call parens?
    pub has_parens: bool,
}

impl LeafSpan {
    pub(crate) fn from_node(node: &SyntaxNode) -> LeafSpan {
        debug_assert!(node.kind().is_leaf_span());
        let accepts_trailing_dot = node.kind() == SyntaxKind::EXPR_SPAN
            && node
                .parent()
                .and_then(|block| block.parent())
                .is_some_and(|ctx| ctx.kind() == SyntaxKind::STMT_BLOCK);
        let has_parens = node
            .children_with_tokens()
            .filter_map(|el| el.into_token())
            .any(|t| t.kind() == SyntaxKind::L_PAREN);
        LeafSpan {
            kind: node.kind(),
            range: node.text_range(),
            accepts_trailing_dot,
            has_parens,
        }
    }

    /// Re-find the node for this span in `root`. The tree must be the one the
    /// span was located in.
    pub(crate) fn node_in(&self, root: &SyntaxNode) -> Option<SyntaxNode> {
        root.descendants()
            .find(|n| n.kind() == self.kind && n.text_range() == self.range)
    }
}

/// Result of change-ownership lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOwner {
    /// Exactly one leaf span owns the change.
    Owner(LeafSpan),
    /// The change touches more than one leaf span, or structure between
    /// spans (transitions, block delimiters).
    Straddles,
    /// No leaf span relates to the change at all (empty document, out of
    /// bounds).
    NoTarget,
}

/// Locate the leaf span owning `change` in `root`.
pub fn locate_owner(root: &SyntaxNode, change: &SourceChange) -> ChangeOwner {
    let spans: Vec<SyntaxNode> = root
        .descendants()
        .filter(|n| n.kind().is_leaf_span())
        .collect();
    if spans.is_empty() {
        return ChangeOwner::NoTarget;
    }

    let old_range = change.old_range();
    if !old_range.is_empty() {
        // Replacement/deletion: the replaced range must sit inside one span.
        let mut containing = spans
            .iter()
            .filter(|s| s.text_range().contains_range(old_range));
        return match (containing.next(), containing.next()) {
            (Some(owner), None) => ChangeOwner::Owner(LeafSpan::from_node(owner)),
            // An empty old range at a span boundary can sit in two spans;
            // that is handled by the insertion path, so two non-empty
            // containments cannot happen. Anything else straddles.
            _ => ChangeOwner::Straddles,
        };
    }

    // Pure insertion at a single offset.
    let pos = change.start();
    let mut preceding = None;
    let mut following = None;
    for span in &spans {
        let range = span.text_range();
        if range.start() < pos && pos < range.end() {
            return ChangeOwner::Owner(LeafSpan::from_node(span));
        }
        if range.end() == pos {
            preceding = Some(span);
        }
        if range.start() == pos {
            following = Some(span);
        }
    }

    let starts_with_whitespace = change
        .new_text()
        .chars()
        .next()
        .is_some_and(|c| c.is_whitespace());

    if let Some(prev) = preceding {
        // Expressions accept non-whitespace continuation at their end.
        if prev.kind() == SyntaxKind::EXPR_SPAN && !starts_with_whitespace {
            return ChangeOwner::Owner(LeafSpan::from_node(prev));
        }
        if prev.kind() == SyntaxKind::MARKUP_SPAN {
            return ChangeOwner::Owner(LeafSpan::from_node(prev));
        }
    }
    if let Some(next) = following {
        if next.kind() == SyntaxKind::MARKUP_SPAN {
            return ChangeOwner::Owner(LeafSpan::from_node(next));
        }
    }
    ChangeOwner::Straddles
}
