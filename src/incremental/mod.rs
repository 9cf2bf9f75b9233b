//! Incremental parsing: change classification and in-place tree patching.
//!
//! This is the decision core of the crate. For every edit the classifier
//! decides whether an in-place patch may even be attempted; the partial
//! parser then re-lexes the owning leaf span and either rewrites it (sharing
//! every other green node with the previous tree) or rejects the edit,
//! falling back to the debounced full reparse.
//!
//! Rejection is not an error. It is the designed fallback path, and the
//! session always has a well-defined action for it.

mod classifier;
mod partial;
mod policy;

pub use classifier::{Classification, IneligibleReason, classify};
pub use partial::{PartialOutcome, PartialParser};
pub use policy::{InsertionShape, ProvisionalPolicy, ShapeRule};

use bitflags::bitflags;

bitflags! {
    /// Outcome of a partial-parse attempt.
    ///
    /// `ACCEPTED` and `REJECTED` are mutually exclusive; `PROVISIONAL` and
    /// `SPAN_CONTEXT_CHANGED` qualify either one.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PartialParseResult: u8 {
        /// The edit cannot be patched in place; a full reparse is owed.
        const REJECTED = 1 << 0;
        /// The tree was patched in place and is trustworthy.
        const ACCEPTED = 1 << 1;
        /// The patch is speculative; confirmation by full reparse is owed.
        const PROVISIONAL = 1 << 2;
        /// The leaf's context tag changed; confirm sooner than idle.
        const SPAN_CONTEXT_CHANGED = 1 << 3;
        /// The edit left the tree unchanged.
        const NO_OP = 1 << 4;
    }
}

impl PartialParseResult {
    pub fn is_accepted(self) -> bool {
        self.contains(PartialParseResult::ACCEPTED)
    }

    pub fn is_rejected(self) -> bool {
        self.contains(PartialParseResult::REJECTED)
    }

    pub fn is_provisional(self) -> bool {
        self.contains(PartialParseResult::PROVISIONAL)
    }
}
