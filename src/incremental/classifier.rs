//! The change classifier.
//!
//! Given a cached tree and an edit, decide whether an in-place patch may be
//! attempted. Every rule errs on the side of the full reparse: lexical
//! containment is necessary but not sufficient for safe patching, and an
//! ambiguous edit is always classified as not eligible rather than guessed
//! at.

use tracing::debug;

use crate::base::Edit;
use crate::parser::{SyntaxKind, keywords};
use crate::syntax::{ChangeOwner, LeafSpan, SyntaxTree, locate_owner};

use super::policy::ProvisionalPolicy;

/// Why an edit is not eligible for partial parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IneligibleReason {
    /// The tree does not correspond to the edit's base snapshot.
    StaleTree,
    /// The change touches more than one leaf span or inter-span structure.
    CrossesSpanBoundary,
    /// No leaf span relates to the change.
    NoTarget,
    /// The change inserts or deletes a newline, which can move block
    /// structure.
    ContainsNewline,
    /// The inserted text is exactly a reserved word that changes the parse
    /// grammar of surrounding content.
    ReservedWord { word: String, directive: bool },
    /// The owning span's kind never accepts partial edits.
    SpanKindForbids(SyntaxKind),
}

/// Classifier verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Eligible(LeafSpan),
    NotEligible(IneligibleReason),
}

/// Classify `edit` against `tree`.
pub fn classify(tree: &SyntaxTree, edit: &Edit, policy: &ProvisionalPolicy) -> Classification {
    use Classification::*;

    // A patch computed against anything but the edit's base snapshot would
    // be applied to text it never saw.
    if tree.version() != edit.old_snapshot().version() {
        debug!(
            tree = %tree.version(),
            edit_base = %edit.old_snapshot().version(),
            "classifier: cached tree is stale"
        );
        return NotEligible(IneligibleReason::StaleTree);
    }

    let change = edit.change();

    let has_newline = change.new_text().contains('\n') || edit.deleted_text().contains('\n');
    if has_newline && !policy.newline_exempt(change) {
        return NotEligible(IneligibleReason::ContainsNewline);
    }

    if keywords::is_reserved(change.new_text()) {
        return NotEligible(IneligibleReason::ReservedWord {
            word: change.new_text().to_string(),
            directive: keywords::is_directive(change.new_text()),
        });
    }

    match locate_owner(&tree.syntax(), change) {
        ChangeOwner::NoTarget => NotEligible(IneligibleReason::NoTarget),
        ChangeOwner::Straddles => NotEligible(IneligibleReason::CrossesSpanBoundary),
        ChangeOwner::Owner(span) => {
            if !span.kind.accepts_partial_edits() {
                NotEligible(IneligibleReason::SpanKindForbids(span.kind))
            } else {
                Eligible(span)
            }
        }
    }
}
