//! Reserved words of the template grammar.
//!
//! Block keywords and directive names change the parse grammar of the content
//! around them, so the incremental layer must never patch them in place: an
//! edit that introduces one always forces a full reparse.

/// Keywords that open a code block when they follow `@`.
pub const BLOCK_KEYWORDS: &[&str] = &[
    "if", "else", "for", "foreach", "while", "do", "switch", "try", "lock", "using",
];

/// Directive names: `@inherits`, `@functions`, ...
pub const DIRECTIVES: &[&str] = &["inherits", "functions", "section", "class", "namespace"];

pub fn is_block_keyword(word: &str) -> bool {
    BLOCK_KEYWORDS.contains(&word)
}

pub fn is_directive(word: &str) -> bool {
    DIRECTIVES.contains(&word)
}

/// Check if `word` is reserved in any position the grammar treats specially.
pub fn is_reserved(word: &str) -> bool {
    is_block_keyword(word) || is_directive(word)
}
