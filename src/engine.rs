//! The grammar engine seam.
//!
//! The session layer never parses text itself; it consumes two primitives
//! from a [`GrammarEngine`]: a full parse and a leaf re-lex. The built-in
//! [`StencilEngine`] implements both for stencil templates, but any grammar
//! with the same leaf-span discipline can sit behind the trait.

use thiserror::Error;

use crate::parser::{OwnedToken, Parse, parse_document, tokenize_owned};

/// A failure of the grammar engine itself.
///
/// Parse errors in user text are *not* engine errors; they travel as
/// diagnostics on the resulting tree. An `EngineError` means the engine could
/// not produce a tree at all, and the session keeps its last-known-good tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("grammar engine failed: {0}")]
    Failed(String),
}

/// Full-parse and re-lex primitives supplied by a grammar implementation.
pub trait GrammarEngine: Send + Sync {
    /// Parse `text` from scratch into a lossless tree with diagnostics.
    fn parse(&self, text: &str) -> Result<Parse, EngineError>;

    /// Tokenize a single code fragment; used to re-lex one leaf span during
    /// partial parsing.
    fn tokenize(&self, text: &str) -> Vec<OwnedToken>;
}

/// The built-in stencil template engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct StencilEngine;

impl StencilEngine {
    pub fn new() -> StencilEngine {
        StencilEngine
    }
}

impl GrammarEngine for StencilEngine {
    fn parse(&self, text: &str) -> Result<Parse, EngineError> {
        Ok(parse_document(text))
    }

    fn tokenize(&self, text: &str) -> Vec<OwnedToken> {
        tokenize_owned(text)
    }
}
