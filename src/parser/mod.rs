//! Rowan-based parser for stencil templates.
//!
//! This module provides a lossless parser using:
//! - **logos** for fast lexing of code fragments
//! - **rowan** for the CST (Concrete Syntax Tree)
//!
//! ```text
//! Source Text
//!     ↓
//! Grammar (markup scan + logos tokens) → GreenNode tree
//!     ↓
//! SyntaxNode (rowan) → CST with parent pointers
//!     ↓
//! Leaf spans → unit of incremental patching
//! ```

pub mod grammar;
pub mod keywords;
mod lexer;
mod syntax_kind;

pub use grammar::{Parse, SyntaxError, parse_document};
pub use lexer::{Lexer, OwnedToken, Token, tokenize, tokenize_owned};
pub use syntax_kind::{StencilLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};
