//! # stencil-base
//!
//! Core library for incremental parsing of stencil templates: a lossless
//! CST, an in-place partial parser for small edits, and an editor-facing
//! session that coordinates patches with debounced full reparses.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! buffer      → Host editing surface (TextBuffer, Caret)
//!   ↓
//! session     → ParserSession, TreeCache, IdleScheduler, events
//!   ↓
//! incremental → Change classifier, partial parser, provisional policy
//!   ↓
//! engine      → GrammarEngine trait seam, StencilEngine
//!   ↓
//! syntax      → SyntaxTree ↔ Snapshot association, leaf-span lookup
//!   ↓
//! parser      → Logos lexer, rowan grammar, SyntaxKind, keywords
//!   ↓
//! base        → Primitives (Snapshot, SourceChange, Edit, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → engine → incremental
// → session → buffer)
// ============================================================================

/// Foundation types: Snapshot, SnapshotVersion, SourceChange, Edit
pub mod base;

/// Parser: Logos lexer, rowan grammar, SyntaxKind, reserved keywords
pub mod parser;

/// Syntax: SyntaxTree/Snapshot association, structural equality, leaf spans
pub mod syntax;

/// Grammar engine seam: the trait the session layer consumes
pub mod engine;

/// Incremental parsing: classifier, partial parser, provisional policy
pub mod incremental;

/// Session: per-document coordination of patches and full reparses
pub mod session;

/// Buffer: host-side editing surface producing coherent edits
pub mod buffer;

// Re-export commonly needed items
pub use parser::keywords;

// Re-export foundation types
pub use base::{Edit, Snapshot, SnapshotVersion, SourceChange, TextRange, TextSize};

// Re-export the editor-facing surface
pub use buffer::TextBuffer;
pub use engine::{EngineError, GrammarEngine, StencilEngine};
pub use incremental::{PartialParseResult, ProvisionalPolicy};
pub use session::{ParserSession, SessionOptions, Stats, StructureChange};
pub use syntax::SyntaxTree;
