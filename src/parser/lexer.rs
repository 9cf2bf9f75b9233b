//! Logos-based lexer for code fragments.
//!
//! Markup scanning lives in the grammar (it is driven by `@` transitions);
//! this lexer tokenizes the code side: expression tails, statement bodies,
//! keyword blocks and directives. It is also the leaf re-lex primitive used
//! by the partial parser.

use logos::Logos;
use rowan::TextSize;
use smol_str::SmolStr;

use super::syntax_kind::SyntaxKind;

/// A token with its kind, text, and position relative to the lexed fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// An owned token, as handed across the [`crate::engine::GrammarEngine`]
/// re-lex seam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedToken {
    pub kind: SyntaxKind,
    pub text: SmolStr,
}

impl OwnedToken {
    pub fn new(kind: SyntaxKind, text: impl Into<SmolStr>) -> OwnedToken {
        OwnedToken {
            kind,
            text: text.into(),
        }
    }
}

/// Lexer wrapping the logos-generated tokenizer.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::PUNCT,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize a code fragment into a Vec.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Tokenize a code fragment into owned tokens.
pub fn tokenize_owned(input: &str) -> Vec<OwnedToken> {
    Lexer::new(input)
        .map(|t| OwnedToken::new(t.kind, t.text))
        .collect()
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    #[regex(r"[\p{XID_Start}_]\p{XID_Continue}*")]
    Ident,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r#""[^"\n]*""#)]
    #[regex(r"'[^'\n]*'")]
    String,

    #[token(".")]
    Dot,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("@")]
    At,

    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::Number => SyntaxKind::NUMBER,
            LogosToken::String => SyntaxKind::STRING,
            LogosToken::Dot => SyntaxKind::DOT,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::LBrace => SyntaxKind::L_BRACE,
            LogosToken::RBrace => SyntaxKind::R_BRACE,
            LogosToken::At => SyntaxKind::AT,
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::Newline => SyntaxKind::NEWLINE,
        }
    }
}
