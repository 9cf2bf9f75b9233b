//! Host-side editing surface.
//!
//! [`TextBuffer`] owns the current snapshot and produces coherent [`Edit`]s,
//! one per atomic change, for feeding into a
//! [`crate::session::ParserSession`]. It also tracks a caret the way editor
//! hosts do; the caret is advisory and never affects parsing.

use text_size::TextSize;
use tracing::warn;

use crate::base::{Edit, Snapshot, SourceChange};

/// Caret position within the buffer, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caret {
    position: TextSize,
}

impl Caret {
    pub fn position(&self) -> TextSize {
        self.position
    }
}

/// An editable document: the latest snapshot plus a caret.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    snapshot: Snapshot,
    caret: Caret,
}

impl TextBuffer {
    pub fn new(text: &str) -> TextBuffer {
        TextBuffer {
            snapshot: Snapshot::initial(text),
            caret: Caret::default(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn text(&self) -> &str {
        self.snapshot.text()
    }

    pub fn caret(&self) -> Caret {
        self.caret
    }

    /// Move the caret, clamping to the document end. Out-of-range positions
    /// indicate a host bookkeeping bug, so they are logged.
    pub fn move_caret(&mut self, position: u32) {
        let len = TextSize::new(self.snapshot.len() as u32);
        let position = TextSize::new(position);
        if position > len {
            warn!(
                position = u32::from(position),
                len = u32::from(len),
                "caret out of range; clamping"
            );
            self.caret.position = len;
        } else {
            self.caret.position = position;
        }
    }

    /// Apply one atomic change and return the edit that describes it. The
    /// caret lands at the end of the inserted text.
    pub fn apply_change(&mut self, change: SourceChange) -> Edit {
        let old = self.snapshot.clone();
        let new = old.apply(&change);
        self.snapshot = new.clone();
        self.caret.position = change.new_range().end();
        Edit::new(old, new, change)
    }

    pub fn insert(&mut self, at: u32, text: &str) -> Edit {
        self.apply_change(SourceChange::insertion(at, text))
    }

    pub fn delete(&mut self, at: u32, len: u32) -> Edit {
        self.apply_change(SourceChange::deletion(at, len))
    }

    pub fn replace(&mut self, at: u32, len: u32, text: &str) -> Edit {
        self.apply_change(SourceChange::new(at, len, text))
    }

    /// Insert at the caret, as typing does.
    pub fn type_text(&mut self, text: &str) -> Edit {
        self.insert(self.caret.position.into(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_advances_the_caret() {
        let mut buffer = TextBuffer::new("foo @");
        buffer.move_caret(5);
        buffer.type_text("bar");
        assert_eq!(buffer.text(), "foo @bar");
        assert_eq!(buffer.caret().position(), TextSize::new(8));
        buffer.type_text(".");
        assert_eq!(buffer.text(), "foo @bar.");
    }

    #[test]
    fn versions_advance_per_change() {
        let mut buffer = TextBuffer::new("");
        let v0 = buffer.snapshot().version();
        let edit = buffer.insert(0, "x");
        assert_eq!(edit.old_snapshot().version(), v0);
        assert_eq!(edit.new_snapshot().version(), buffer.snapshot().version());
        assert!(v0 < buffer.snapshot().version());
    }

    #[test]
    fn out_of_range_caret_clamps() {
        let mut buffer = TextBuffer::new("ab");
        buffer.move_caret(99);
        assert_eq!(buffer.caret().position(), TextSize::new(2));
    }
}
