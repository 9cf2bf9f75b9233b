//! The syntax tree / snapshot association.
//!
//! A [`SyntaxTree`] is a rowan green tree plus the diagnostics of the parse
//! that produced it, tied to exactly one [`Snapshot`]. Trees are immutable;
//! an in-place patch produces a new tree that shares every unchanged green
//! node with its predecessor.

use rowan::{GreenNode, NodeOrToken, TextRange};

use crate::base::{Snapshot, SnapshotVersion, SourceChange};
use crate::parser::{Parse, SyntaxError, SyntaxNode};

/// An immutable syntax tree associated with the snapshot it was parsed
/// against.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    green: GreenNode,
    errors: Vec<SyntaxError>,
    snapshot: Snapshot,
}

impl SyntaxTree {
    /// Wrap a full-parse result for `snapshot`.
    pub fn new(parse: Parse, snapshot: Snapshot) -> SyntaxTree {
        SyntaxTree {
            green: parse.green,
            errors: parse.errors,
            snapshot,
        }
    }

    /// Root cursor node. Cheap; cursors are created on demand so the tree
    /// itself stays `Send + Sync`.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// The snapshot this tree was parsed (or patched) against.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn version(&self) -> SnapshotVersion {
        self.snapshot.version()
    }

    /// Build the successor tree for an accepted in-place patch.
    ///
    /// Diagnostics outside the edited range are carried over with their
    /// offsets shifted; diagnostics that overlapped the re-lexed span are
    /// dropped (the patch re-validated that text).
    pub(crate) fn with_patch(
        &self,
        green: GreenNode,
        snapshot: Snapshot,
        change: &SourceChange,
    ) -> SyntaxTree {
        let old_range = change.old_range();
        let delta = change.len_delta();
        let errors = self
            .errors
            .iter()
            .filter_map(|err| {
                if err.range.end() <= old_range.start() {
                    Some(err.clone())
                } else if err.range.start() >= old_range.end() {
                    let start = (u32::from(err.range.start()) as i64 + delta) as u32;
                    let end = (u32::from(err.range.end()) as i64 + delta) as u32;
                    Some(SyntaxError::new(
                        err.message.clone(),
                        TextRange::new(start.into(), end.into()),
                    ))
                } else {
                    None
                }
            })
            .collect();
        SyntaxTree {
            green,
            errors,
            snapshot,
        }
    }
}

/// Structural tree equivalence: same node kinds, token kinds, token texts and
/// ranges, ignoring object identity. This is the equivalence used to compare
/// an in-place patch against a from-scratch reparse.
pub fn structurally_equal(a: &SyntaxTree, b: &SyntaxTree) -> bool {
    nodes_equal(&a.syntax(), &b.syntax())
}

fn nodes_equal(a: &SyntaxNode, b: &SyntaxNode) -> bool {
    if a.kind() != b.kind() || a.text_range() != b.text_range() {
        return false;
    }
    let mut ac = a.children_with_tokens();
    let mut bc = b.children_with_tokens();
    loop {
        match (ac.next(), bc.next()) {
            (None, None) => return true,
            (Some(NodeOrToken::Node(an)), Some(NodeOrToken::Node(bn))) => {
                if !nodes_equal(&an, &bn) {
                    return false;
                }
            }
            (Some(NodeOrToken::Token(at)), Some(NodeOrToken::Token(bt))) => {
                if at.kind() != bt.kind()
                    || at.text() != bt.text()
                    || at.text_range() != bt.text_range()
                {
                    return false;
                }
            }
            _ => return false,
        }
    }
}
