//! Provisional-acceptance policy.
//!
//! Which edits qualify for speculative acceptance is a product decision, not
//! a property of the grammar, so it lives in a table the host can extend or
//! prune. The default table covers the two shapes editors rely on most:
//! a trailing member-access dot (`@foo` + `.`) and an empty call-paren pair
//! (`@foo` + `()`).

use text_size::TextSize;

use crate::base::SourceChange;
use crate::parser::grammar::is_ident_start;

/// An insertion shape that may be accepted provisionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionShape {
    /// A member-access dot with no member name yet: `@foo.`
    TrailingDot,
    /// An empty argument list: `@foo()`
    ParenPair,
}

/// One policy table entry.
#[derive(Debug, Clone, Copy)]
pub struct ShapeRule {
    pub shape: InsertionShape,
    /// Whether edits matching this shape may contain a newline and still be
    /// classified as eligible. Off by default; block structure is fragile.
    pub allows_newline: bool,
}

impl ShapeRule {
    pub fn new(shape: InsertionShape) -> ShapeRule {
        ShapeRule {
            shape,
            allows_newline: false,
        }
    }
}

/// The provisional-acceptance table consulted by the classifier and the
/// partial parser.
#[derive(Debug, Clone)]
pub struct ProvisionalPolicy {
    rules: Vec<ShapeRule>,
}

impl Default for ProvisionalPolicy {
    fn default() -> Self {
        ProvisionalPolicy {
            rules: vec![
                ShapeRule::new(InsertionShape::TrailingDot),
                ShapeRule::new(InsertionShape::ParenPair),
            ],
        }
    }
}

impl ProvisionalPolicy {
    /// A policy with no provisional shapes: every questionable edit rejects.
    pub fn conservative() -> ProvisionalPolicy {
        ProvisionalPolicy { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: ShapeRule) -> ProvisionalPolicy {
        self.rules.push(rule);
        self
    }

    pub fn allows(&self, shape: InsertionShape) -> bool {
        self.rules.iter().any(|r| r.shape == shape)
    }

    /// Whether a newline-containing change is exempt from the classifier's
    /// newline rejection rule.
    pub fn newline_exempt(&self, change: &SourceChange) -> bool {
        self.rules
            .iter()
            .filter(|r| r.allows_newline)
            .any(|r| shape_matches(r.shape, change))
    }
}

fn shape_matches(shape: InsertionShape, change: &SourceChange) -> bool {
    if !change.is_insertion() {
        return false;
    }
    match shape {
        InsertionShape::TrailingDot => change.new_text().trim_end().ends_with('.'),
        InsertionShape::ParenPair => change.new_text().trim_end().ends_with("()"),
    }
}

/// A pending provisional mark: the position a continuation edit must extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionalMark {
    pub shape: InsertionShape,
    /// Offset (in the snapshot the mark was created against) immediately
    /// after the speculative text.
    pub pos: TextSize,
}

impl ProvisionalMark {
    /// Does `change` directly extend this mark and resolve the ambiguity?
    /// Anything else compounds speculation and must be rejected instead.
    pub fn is_continuation(&self, change: &SourceChange) -> bool {
        if !change.is_insertion() || change.start() != self.pos {
            return false;
        }
        let first = change.new_text().chars().next();
        match self.shape {
            // The dot is resolved by a member name.
            InsertionShape::TrailingDot => first.is_some_and(is_ident_start),
            // Anything typed inside the parens except closing them again.
            InsertionShape::ParenPair => first.is_some_and(|c| c != ')'),
        }
    }
}
