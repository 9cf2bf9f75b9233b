//! Syntax kinds for the rowan-based CST.
//!
//! Tokens are leaves (text fragments, identifiers, punctuation); nodes are
//! composite (blocks and leaf spans). "Leaf spans" are the smallest nodes the
//! incremental layer operates on: each one covers a contiguous source range
//! with a single lexical role.

/// All syntax kinds (tokens and nodes) in stencil templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TOKENS
    // =========================================================================
    /// Raw markup text between code constructs
    MARKUP_TEXT = 0,
    /// `@` transition into code
    AT,
    /// `@@` escape for a literal `@` in markup
    AT_AT,
    IDENT,
    /// Reserved word heading a keyword block or directive
    KEYWORD,
    NUMBER,
    STRING,
    DOT,        // .
    L_PAREN,    // (
    R_PAREN,    // )
    L_BRACE,    // {
    R_BRACE,    // }
    WHITESPACE, // spaces and tabs
    NEWLINE,    // \n or \r\n
    /// Any other single code character
    PUNCT,
    ERROR,

    // =========================================================================
    // NODES
    // =========================================================================
    /// Root node covering the whole document
    DOCUMENT,
    /// Leaf span: run of markup text (may contain `@@` escapes)
    MARKUP_SPAN,
    /// `@expr` implicit expression block: AT + EXPR_SPAN
    EXPR_BLOCK,
    /// Leaf span: the code content of an implicit expression
    EXPR_SPAN,
    /// `@{ ... }` statement block
    STMT_BLOCK,
    /// Leaf span: raw statement code between nested constructs
    STMT_SPAN,
    /// `@if (...) { ... }` and friends
    KEYWORD_BLOCK,
    /// Leaf span: keyword block contents (not partial-editable)
    KEYWORD_SPAN,
    /// `@inherits Foo` and friends
    DIRECTIVE_BLOCK,
    /// Leaf span: directive contents (not partial-editable)
    DIRECTIVE_SPAN,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a leaf span: a terminal node covering a contiguous
    /// source range with a single lexical role. Only leaf spans are candidates
    /// for in-place patching.
    pub fn is_leaf_span(self) -> bool {
        matches!(
            self,
            Self::MARKUP_SPAN
                | Self::EXPR_SPAN
                | Self::STMT_SPAN
                | Self::KEYWORD_SPAN
                | Self::DIRECTIVE_SPAN
        )
    }

    /// Check if a leaf span of this kind accepts partial edits at all.
    /// Statement, keyword and directive spans always force a full reparse.
    pub fn accepts_partial_edits(self) -> bool {
        matches!(self, Self::MARKUP_SPAN | Self::EXPR_SPAN)
    }

    /// Check if this is a trivia token
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEWLINE)
    }

    pub fn is_token(self) -> bool {
        (self as u16) < (Self::DOCUMENT as u16)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StencilLanguage {}

impl rowan::Language for StencilLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<StencilLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<StencilLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<StencilLanguage>;
