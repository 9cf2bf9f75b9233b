//! Full-document parser for stencil templates.
//!
//! Builds a rowan GreenNode tree from source text. The document is markup
//! with `@`-introduced code constructs:
//!
//! - `@expr` implicit expressions (`@foo.Bar(baz)`)
//! - `@{ ... }` statement blocks, with nested implicit expressions
//! - `@if (...) { ... }` keyword blocks
//! - `@inherits Foo` directives
//! - `@@` escapes for a literal `@`
//!
//! The tree is lossless: every byte of input appears in exactly one token.
//! Leaf spans (MARKUP_SPAN, EXPR_SPAN, ...) are the unit of incremental
//! patching; everything between them is structure.
//!
//! Implicit expressions inside statement blocks accept a trailing dot (a
//! common mid-edit state); in markup context the dot is left to the markup.

use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};
use unicode_ident::{is_xid_continue, is_xid_start};

use super::keywords;
use super::lexer::tokenize;
use super::syntax_kind::SyntaxKind;

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse a stencil template document into a CST.
pub fn parse_document(input: &str) -> Parse {
    let mut parser = DocParser::new(input);
    parser.parse_document();
    parser.finish()
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c == '_' || is_xid_start(c)
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    is_xid_continue(c)
}

struct DocParser<'a> {
    text: &'a str,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl<'a> DocParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.text[pos..].chars().next()
    }

    fn error(&mut self, message: impl Into<String>, start: usize, end: usize) {
        self.errors.push(SyntaxError::new(
            message,
            TextRange::new(TextSize::new(start as u32), TextSize::new(end as u32)),
        ));
    }

    /// Emit lexed code tokens for `self.text[start..end]`.
    fn emit_code_tokens(&mut self, start: usize, end: usize) {
        for token in tokenize(&self.text[start..end]) {
            self.builder.token(token.kind.into(), token.text);
        }
    }

    // =========================================================================
    // Document structure
    // =========================================================================

    fn parse_document(&mut self) {
        self.builder.start_node(SyntaxKind::DOCUMENT.into());
        while self.pos < self.text.len() {
            if self.at_construct() {
                self.parse_construct();
            } else {
                self.parse_markup_span();
            }
        }
        self.builder.finish_node();
    }

    /// At a `@` that introduces a code construct (not a `@@` escape).
    fn at_construct(&self) -> bool {
        self.char_at(self.pos) == Some('@') && self.char_at(self.pos + 1) != Some('@')
    }

    /// Consume markup text up to the next construct, folding `@@` escapes in.
    fn parse_markup_span(&mut self) {
        let span_start = self.pos;
        self.builder.start_node(SyntaxKind::MARKUP_SPAN.into());
        let mut chunk_start = self.pos;
        loop {
            match self.text[self.pos..].find('@') {
                None => {
                    self.pos = self.text.len();
                    break;
                }
                Some(rel) => {
                    let at = self.pos + rel;
                    if self.char_at(at + 1) == Some('@') {
                        if at > chunk_start {
                            self.builder
                                .token(SyntaxKind::MARKUP_TEXT.into(), &self.text[chunk_start..at]);
                        }
                        self.builder.token(SyntaxKind::AT_AT.into(), "@@");
                        self.pos = at + 2;
                        chunk_start = self.pos;
                    } else {
                        self.pos = at;
                        break;
                    }
                }
            }
        }
        if self.pos > chunk_start {
            self.builder
                .token(SyntaxKind::MARKUP_TEXT.into(), &self.text[chunk_start..self.pos]);
        }
        debug_assert!(self.pos > span_start, "markup span must make progress");
        self.builder.finish_node();
    }

    /// Dispatch a `@` construct: statement block, keyword block, directive,
    /// or implicit expression.
    fn parse_construct(&mut self) {
        let at_pos = self.pos;
        match self.char_at(at_pos + 1) {
            Some('{') => self.parse_statement_block(),
            Some(c) if is_ident_start(c) => {
                let word_start = at_pos + 1;
                let word_end = self.scan_ident(word_start);
                let word = &self.text[word_start..word_end];
                if keywords::is_directive(word) {
                    self.parse_directive(word_start, word_end);
                } else if keywords::is_block_keyword(word) {
                    self.parse_keyword_block(word_start, word_end);
                } else {
                    self.parse_expression_block(false);
                }
            }
            _ => {
                // Stray transition: keep the `@` in the tree, record an error.
                self.builder.start_node(SyntaxKind::EXPR_BLOCK.into());
                self.builder.token(SyntaxKind::AT.into(), "@");
                self.builder.finish_node();
                self.error("expected identifier, '{', or keyword after '@'", at_pos, at_pos + 1);
                self.pos = at_pos + 1;
            }
        }
    }

    fn scan_ident(&self, start: usize) -> usize {
        let mut end = start;
        for (i, c) in self.text[start..].char_indices() {
            if i == 0 {
                debug_assert!(is_ident_start(c));
            } else if !is_ident_continue(c) {
                break;
            }
            end = start + i + c.len_utf8();
        }
        end
    }

    // =========================================================================
    // Implicit expressions
    // =========================================================================

    /// `@foo.Bar(baz)`. Caller guarantees an identifier follows the `@`.
    fn parse_expression_block(&mut self, accepts_trailing_dot: bool) {
        let at_pos = self.pos;
        let expr_start = at_pos + 1;
        let expr_end = self.scan_expression(expr_start, accepts_trailing_dot);

        self.builder.start_node(SyntaxKind::EXPR_BLOCK.into());
        self.builder.token(SyntaxKind::AT.into(), "@");
        self.builder.start_node(SyntaxKind::EXPR_SPAN.into());
        self.emit_code_tokens(expr_start, expr_end);
        self.builder.finish_node();
        self.builder.finish_node();
        self.pos = expr_end;
    }

    /// Determine the extent of an implicit expression starting at an
    /// identifier: `Ident (('.' Ident) | '(' ... ')')*`, with lone dots
    /// consumed only where trailing dots are accepted.
    fn scan_expression(&mut self, start: usize, accepts_trailing_dot: bool) -> usize {
        let mut pos = self.scan_ident(start);
        loop {
            match self.char_at(pos) {
                Some('.') => {
                    let after_dot = pos + 1;
                    match self.char_at(after_dot) {
                        Some(c) if is_ident_start(c) => {
                            pos = self.scan_ident(after_dot);
                        }
                        _ if accepts_trailing_dot => {
                            pos = after_dot;
                        }
                        _ => break,
                    }
                }
                Some('(') => match self.scan_balanced(pos, '(', ')') {
                    Some(end) => pos = end,
                    None => {
                        self.error("unterminated argument list", pos, self.text.len());
                        pos = self.text.len();
                        break;
                    }
                },
                _ => break,
            }
        }
        pos
    }

    /// Scan a balanced `open`..`close` group starting at `open_pos`,
    /// skipping string literals. Returns the position after the closing
    /// delimiter, or None when the group never closes.
    fn scan_balanced(&self, open_pos: usize, open: char, close: char) -> Option<usize> {
        let mut depth = 0usize;
        let mut pos = open_pos;
        while let Some(c) = self.char_at(pos) {
            if c == open {
                depth += 1;
                pos += c.len_utf8();
            } else if c == close {
                depth -= 1;
                pos += c.len_utf8();
                if depth == 0 {
                    return Some(pos);
                }
            } else if c == '"' || c == '\'' {
                pos = self.scan_string_end(pos, c);
            } else {
                pos += c.len_utf8();
            }
        }
        None
    }

    /// Position after the closing quote, or the end of line for unterminated
    /// literals.
    fn scan_string_end(&self, quote_pos: usize, quote: char) -> usize {
        let rest = &self.text[quote_pos + quote.len_utf8()..];
        for (i, c) in rest.char_indices() {
            if c == quote {
                return quote_pos + quote.len_utf8() + i + c.len_utf8();
            }
            if c == '\n' {
                return quote_pos + quote.len_utf8() + i;
            }
        }
        self.text.len()
    }

    // =========================================================================
    // Statement blocks
    // =========================================================================

    /// `@{ ... }` with nested implicit expressions.
    fn parse_statement_block(&mut self) {
        let at_pos = self.pos;
        self.builder.start_node(SyntaxKind::STMT_BLOCK.into());
        self.builder.token(SyntaxKind::AT.into(), "@");
        self.builder.token(SyntaxKind::L_BRACE.into(), "{");
        self.pos = at_pos + 2;

        let mut depth = 1usize;
        let mut seg_start = self.pos;
        loop {
            let Some(c) = self.char_at(self.pos) else {
                self.flush_statement_segment(seg_start, self.pos);
                self.error("unterminated statement block", at_pos, self.text.len());
                break;
            };
            match c {
                '{' => {
                    depth += 1;
                    self.pos += 1;
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.flush_statement_segment(seg_start, self.pos);
                        self.builder.token(SyntaxKind::R_BRACE.into(), "}");
                        self.pos += 1;
                        break;
                    }
                    self.pos += 1;
                }
                '"' | '\'' => {
                    self.pos = self.scan_string_end(self.pos, c);
                }
                '@' => {
                    let next = self.char_at(self.pos + 1);
                    match next {
                        Some(n) if is_ident_start(n) => {
                            let word_end = self.scan_ident(self.pos + 1);
                            let word = &self.text[self.pos + 1..word_end];
                            if keywords::is_reserved(word) {
                                // Reserved words are plain code inside a
                                // statement body; the `@` stays in the segment.
                                self.pos = word_end;
                            } else {
                                self.flush_statement_segment(seg_start, self.pos);
                                self.parse_expression_block(true);
                                seg_start = self.pos;
                            }
                        }
                        Some('@') => self.pos += 2,
                        _ => self.pos += 1,
                    }
                }
                _ => self.pos += c.len_utf8(),
            }
        }
        self.builder.finish_node();
    }

    fn flush_statement_segment(&mut self, start: usize, end: usize) {
        if end > start {
            self.builder.start_node(SyntaxKind::STMT_SPAN.into());
            self.emit_code_tokens(start, end);
            self.builder.finish_node();
        }
    }

    // =========================================================================
    // Keyword blocks and directives
    // =========================================================================

    /// `@if (cond) { body }`. The whole construct is a single opaque leaf
    /// span; keyword blocks are never patched in place.
    fn parse_keyword_block(&mut self, word_start: usize, word_end: usize) {
        let mut end = word_end;

        // Optional condition group.
        let after_ws = self.skip_inline_ws(end);
        if self.char_at(after_ws) == Some('(') {
            match self.scan_balanced(after_ws, '(', ')') {
                Some(close) => end = close,
                None => {
                    self.error("unterminated condition", after_ws, self.text.len());
                    end = self.text.len();
                }
            }
        }

        // Optional body; whitespace (including newlines) may separate it.
        if end < self.text.len() {
            let body_probe = self.skip_ws_and_newlines(end);
            if self.char_at(body_probe) == Some('{') {
                match self.scan_balanced(body_probe, '{', '}') {
                    Some(close) => end = close,
                    None => {
                        self.error("unterminated block body", body_probe, self.text.len());
                        end = self.text.len();
                    }
                }
            } else if end == word_end {
                // No condition and no body: the construct runs to end of line.
                end = self.line_end(word_end);
            }
        }

        self.builder.start_node(SyntaxKind::KEYWORD_BLOCK.into());
        self.builder.token(SyntaxKind::AT.into(), "@");
        self.builder.start_node(SyntaxKind::KEYWORD_SPAN.into());
        self.builder
            .token(SyntaxKind::KEYWORD.into(), &self.text[word_start..word_end]);
        self.emit_code_tokens(word_end, end);
        self.builder.finish_node();
        self.builder.finish_node();
        self.pos = end;
    }

    /// `@inherits Foo.Bar` - runs to end of line, newline excluded.
    fn parse_directive(&mut self, word_start: usize, word_end: usize) {
        let end = self.line_end(word_end);
        self.builder.start_node(SyntaxKind::DIRECTIVE_BLOCK.into());
        self.builder.token(SyntaxKind::AT.into(), "@");
        self.builder.start_node(SyntaxKind::DIRECTIVE_SPAN.into());
        self.builder
            .token(SyntaxKind::KEYWORD.into(), &self.text[word_start..word_end]);
        self.emit_code_tokens(word_end, end);
        self.builder.finish_node();
        self.builder.finish_node();
        self.pos = end;
    }

    fn skip_inline_ws(&self, mut pos: usize) -> usize {
        while let Some(c) = self.char_at(pos) {
            if c == ' ' || c == '\t' {
                pos += 1;
            } else {
                break;
            }
        }
        pos
    }

    fn skip_ws_and_newlines(&self, mut pos: usize) -> usize {
        while let Some(c) = self.char_at(pos) {
            if c == ' ' || c == '\t' || c == '\n' || c == '\r' {
                pos += c.len_utf8();
            } else {
                break;
            }
        }
        pos
    }

    fn line_end(&self, pos: usize) -> usize {
        match self.text[pos..].find('\n') {
            Some(rel) => {
                let mut end = pos + rel;
                if end > pos && self.text.as_bytes()[end - 1] == b'\r' {
                    end -= 1;
                }
                end
            }
            None => self.text.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SyntaxNode;

    fn parse_ok(input: &str) -> SyntaxNode {
        let parse = parse_document(input);
        assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
        parse.syntax()
    }

    fn node_kinds(root: &SyntaxNode) -> Vec<SyntaxKind> {
        root.descendants().map(|n| n.kind()).collect()
    }

    #[test]
    fn plain_markup() {
        let root = parse_ok("hello world");
        assert_eq!(
            node_kinds(&root),
            vec![SyntaxKind::DOCUMENT, SyntaxKind::MARKUP_SPAN]
        );
        assert_eq!(root.text().to_string(), "hello world");
    }

    #[test]
    fn implicit_expression_splits_markup() {
        let root = parse_ok("foo @bar baz");
        assert_eq!(
            node_kinds(&root),
            vec![
                SyntaxKind::DOCUMENT,
                SyntaxKind::MARKUP_SPAN,
                SyntaxKind::EXPR_BLOCK,
                SyntaxKind::EXPR_SPAN,
                SyntaxKind::MARKUP_SPAN,
            ]
        );
        assert_eq!(root.text().to_string(), "foo @bar baz");
    }

    #[test]
    fn member_chain_and_call_stay_in_expression() {
        let root = parse_ok("x @DateTime.Now.ToString(\"u\") y");
        let expr = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::EXPR_SPAN)
            .unwrap();
        assert_eq!(expr.text().to_string(), "DateTime.Now.ToString(\"u\")");
    }

    #[test]
    fn trailing_dot_left_to_markup() {
        let root = parse_ok("foo @bar. baz");
        let expr = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::EXPR_SPAN)
            .unwrap();
        assert_eq!(expr.text().to_string(), "bar");
    }

    #[test]
    fn trailing_dot_kept_in_statement_context() {
        let root = parse_ok("@{ @foo. }");
        let expr = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::EXPR_SPAN)
            .unwrap();
        assert_eq!(expr.text().to_string(), "foo.");
    }

    #[test]
    fn statement_block_shape() {
        let root = parse_ok("@{ var x = 1; }");
        assert_eq!(
            node_kinds(&root),
            vec![
                SyntaxKind::DOCUMENT,
                SyntaxKind::STMT_BLOCK,
                SyntaxKind::STMT_SPAN,
            ]
        );
        assert_eq!(root.text().to_string(), "@{ var x = 1; }");
    }

    #[test]
    fn escaped_at_stays_markup() {
        let root = parse_ok("mail@@example.com");
        assert_eq!(
            node_kinds(&root),
            vec![SyntaxKind::DOCUMENT, SyntaxKind::MARKUP_SPAN]
        );
        assert_eq!(root.text().to_string(), "mail@@example.com");
    }

    #[test]
    fn keyword_block_is_opaque() {
        let root = parse_ok("a @if (x) { y } b");
        let kw = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::KEYWORD_SPAN)
            .unwrap();
        assert_eq!(kw.text().to_string(), "if (x) { y }");
        assert_eq!(root.text().to_string(), "a @if (x) { y } b");
    }

    #[test]
    fn directive_runs_to_end_of_line() {
        let root = parse_ok("@inherits Foo.Bar\nrest");
        let dir = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::DIRECTIVE_SPAN)
            .unwrap();
        assert_eq!(dir.text().to_string(), "inherits Foo.Bar");
    }

    #[test]
    fn stray_at_is_an_error() {
        let parse = parse_document("foo @ bar");
        assert!(!parse.ok());
        assert_eq!(parse.syntax().text().to_string(), "foo @ bar");
    }

    #[test]
    fn unterminated_statement_block_is_an_error() {
        let parse = parse_document("@{ var x");
        assert!(!parse.ok());
        assert_eq!(parse.syntax().text().to_string(), "@{ var x");
    }
}
