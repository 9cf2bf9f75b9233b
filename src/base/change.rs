//! Atomic text deltas.
//!
//! Exactly one [`SourceChange`] is produced per atomic buffer mutation; an
//! [`Edit`] pairs the change with the snapshots on either side of it.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::snapshot::Snapshot;

/// A single atomic text replacement: `old_len` bytes at `start` are replaced
/// by `new_text`. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChange {
    start: TextSize,
    old_len: TextSize,
    new_text: SmolStr,
}

impl SourceChange {
    pub fn new(start: u32, old_len: u32, new_text: impl Into<SmolStr>) -> SourceChange {
        SourceChange {
            start: TextSize::new(start),
            old_len: TextSize::new(old_len),
            new_text: new_text.into(),
        }
    }

    /// A pure insertion at `start`.
    pub fn insertion(start: u32, text: impl Into<SmolStr>) -> SourceChange {
        SourceChange::new(start, 0, text)
    }

    /// A pure deletion of `len` bytes at `start`.
    pub fn deletion(start: u32, len: u32) -> SourceChange {
        SourceChange::new(start, len, "")
    }

    pub fn start(&self) -> TextSize {
        self.start
    }

    /// The range this change replaces in the *old* snapshot. Empty for
    /// insertions.
    pub fn old_range(&self) -> TextRange {
        TextRange::at(self.start, self.old_len)
    }

    /// The range the replacement text occupies in the *new* snapshot.
    pub fn new_range(&self) -> TextRange {
        TextRange::at(self.start, TextSize::of(self.new_text.as_str()))
    }

    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    pub fn is_insertion(&self) -> bool {
        self.old_len == TextSize::new(0) && !self.new_text.is_empty()
    }

    pub fn is_deletion(&self) -> bool {
        self.old_len > TextSize::new(0) && self.new_text.is_empty()
    }

    /// Signed length difference the change introduces.
    pub fn len_delta(&self) -> i64 {
        self.new_text.len() as i64 - u32::from(self.old_len) as i64
    }

    /// Apply the change to `text`, producing the new document text.
    pub fn apply_to(&self, text: &str) -> String {
        let start = usize::from(self.start);
        let end = usize::from(self.old_range().end());
        let mut out = String::with_capacity(text.len() + self.new_text.len());
        out.push_str(&text[..start]);
        out.push_str(&self.new_text);
        out.push_str(&text[end..]);
        out
    }

    /// Splice the change into a sub-span of the old text. `span` must contain
    /// the changed range (end-inclusive for insertions at the span boundary).
    pub(crate) fn apply_to_span(&self, span_text: &str, span: TextRange) -> String {
        let rel_start = usize::from(self.start - span.start());
        let rel_end = rel_start + usize::from(self.old_range().len());
        let mut out = String::with_capacity(span_text.len() + self.new_text.len());
        out.push_str(&span_text[..rel_start]);
        out.push_str(&self.new_text);
        out.push_str(&span_text[rel_end..]);
        out
    }
}

/// An edit: one [`SourceChange`] together with the snapshot it was applied to
/// and the snapshot it produced. `old.version() < new.version()` always holds
/// for edits built through [`crate::buffer::TextBuffer`].
#[derive(Debug, Clone)]
pub struct Edit {
    old: Snapshot,
    new: Snapshot,
    change: SourceChange,
}

impl Edit {
    pub fn new(old: Snapshot, new: Snapshot, change: SourceChange) -> Edit {
        debug_assert!(old.version() < new.version());
        Edit { old, new, change }
    }

    pub fn old_snapshot(&self) -> &Snapshot {
        &self.old
    }

    pub fn new_snapshot(&self) -> &Snapshot {
        &self.new
    }

    pub fn change(&self) -> &SourceChange {
        &self.change
    }

    /// The text removed by this edit, read from the old snapshot.
    pub fn deleted_text(&self) -> &str {
        self.old.slice(self.change.old_range())
    }
}
