//! Immutable, versioned text snapshots.
//!
//! Every buffer mutation produces a new [`Snapshot`]; the text itself is never
//! mutated. Versions are totally ordered, so "is this tree stale" is a single
//! integer comparison.

use std::fmt;
use std::sync::Arc;

use text_size::TextRange;

use super::change::SourceChange;

/// Monotonically increasing snapshot version.
///
/// Versions only ever move forward within an editing session; a published
/// syntax tree is never allowed to regress to an older version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotVersion(u64);

impl SnapshotVersion {
    pub const INITIAL: SnapshotVersion = SnapshotVersion(0);

    pub fn next(self) -> SnapshotVersion {
        SnapshotVersion(self.0 + 1)
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// An immutable text snapshot with a version number.
///
/// Cloning is cheap (`Arc<str>`); old snapshots stay alive only as long as
/// something (e.g. an in-flight reparse) still references them.
#[derive(Clone)]
pub struct Snapshot {
    text: Arc<str>,
    version: SnapshotVersion,
}

impl Snapshot {
    /// Create the initial snapshot of an editing session.
    pub fn initial(text: impl Into<Arc<str>>) -> Snapshot {
        Snapshot {
            text: text.into(),
            version: SnapshotVersion::INITIAL,
        }
    }

    /// Produce the successor snapshot with `change` applied.
    ///
    /// Pure data construction; there are no error conditions. The caller is
    /// responsible for `change` being in bounds of this snapshot's text.
    pub fn apply(&self, change: &SourceChange) -> Snapshot {
        Snapshot {
            text: change.apply_to(&self.text).into(),
            version: self.version.next(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> SnapshotVersion {
        self.version
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Slice the snapshot text by a byte range.
    pub fn slice(&self, range: TextRange) -> &str {
        &self.text[range]
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("version", &self.version)
            .field("len", &self.text.len())
            .finish()
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && Arc::ptr_eq(&self.text, &other.text)
    }
}

impl Eq for Snapshot {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_bumps_version() {
        let s0 = Snapshot::initial("hello");
        let s1 = s0.apply(&SourceChange::insertion(5, " world"));
        assert_eq!(s0.version(), SnapshotVersion::INITIAL);
        assert!(s1.version() > s0.version());
        assert_eq!(s1.text(), "hello world");
        // The original is untouched.
        assert_eq!(s0.text(), "hello");
    }

    #[test]
    fn versions_are_totally_ordered() {
        let mut snap = Snapshot::initial("");
        let mut last = snap.version();
        for i in 0..5 {
            snap = snap.apply(&SourceChange::insertion(i, "x"));
            assert!(snap.version() > last);
            last = snap.version();
        }
    }
}
