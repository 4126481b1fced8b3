use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::error::LexError;
use crate::language::ExprKind;

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    /// `;` up to the end of the line
    Comment,
    Open,
    Close,
    Number,
    String,
    Identifier,
}

/// A lexed token: its kind and the exact source text it matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
        }
    }

    /// The expression kind introduced or closed by a bracket token
    pub fn bracket_kind(&self) -> Option<ExprKind> {
        match (self.kind, self.text.as_str()) {
            (TokenKind::Open, "(") | (TokenKind::Close, ")") => Some(ExprKind::S),
            (TokenKind::Open, "{") | (TokenKind::Close, "}") => Some(ExprKind::Q),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

// ============================================================================
// Lexer
// ============================================================================

/// Token patterns in tie-breaking order. Every pattern is anchored to the
/// start of the remaining input.
static PATTERNS: Lazy<Vec<(TokenKind, Regex)>> = Lazy::new(|| {
    [
        (TokenKind::Whitespace, r"^[ \t\r\n]+"),
        (TokenKind::Comment, r"^;[^\n]*"),
        (TokenKind::Open, r"^[({]"),
        (TokenKind::Close, r"^[)}]"),
        (TokenKind::Number, r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)"),
        (TokenKind::String, r#"^"(?s:\\.|[^"\\])*""#),
        (
            TokenKind::Identifier,
            r"^[A-Za-z_+\-*/\\=<>!&][A-Za-z0-9_+\-*/\\=<>!&]*",
        ),
    ]
    .into_iter()
    .map(|(kind, pattern)| {
        let regex = Regex::new(pattern).unwrap_or_else(|e| panic!("bad {kind:?} pattern: {e}"));
        (kind, regex)
    })
    .collect()
});

/// Split `input` into tokens. Whitespace and comments are recognised and
/// dropped.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let (kind, len) = longest_match(rest)
            .ok_or_else(|| LexError::UnrecognizedCharacter(rest.chars().next().unwrap_or('\0')))?;

        if !matches!(kind, TokenKind::Whitespace | TokenKind::Comment) {
            tokens.push(Token::new(kind, &rest[..len]));
        }
        rest = &rest[len..];
    }

    Ok(tokens)
}

fn longest_match(rest: &str) -> Option<(TokenKind, usize)> {
    let mut best: Option<(TokenKind, usize)> = None;
    for (kind, regex) in PATTERNS.iter() {
        if let Some(m) = regex.find(rest) {
            // Strictly longer only: on a tie the earlier pattern wins.
            if best.is_none_or(|(_, len)| m.end() > len) {
                best = Some((*kind, m.end()));
            }
        }
    }
    best
}
