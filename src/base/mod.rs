//! Foundation types for the stencil toolchain.
//!
//! This module provides the fundamental value types used throughout the crate:
//! - [`Snapshot`], [`SnapshotVersion`] - immutable, versioned text snapshots
//! - [`SourceChange`], [`Edit`] - atomic text-buffer deltas
//!
//! This module has NO dependencies on other stencil modules.

mod change;
mod snapshot;

pub use change::{Edit, SourceChange};
pub use snapshot::{Snapshot, SnapshotVersion};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
