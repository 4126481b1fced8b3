use crate::error::{Error, ParseError};
use crate::language::{ExprKind, Expression, Value};
use crate::lexer::{Token, TokenKind, tokenize};

// ============================================================================
// Parser
// ============================================================================

/// Parse a token slice into one expression of the given kind. Each bracketed
/// span inside becomes a child expression whose kind follows its bracket.
pub fn parse_expression(tokens: &[Token], kind: ExprKind) -> Result<Expression, ParseError> {
    let mut children = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        match token.kind {
            TokenKind::Whitespace | TokenKind::Comment => {
                i += 1;
            }
            TokenKind::Identifier => {
                children.push(Value::identifier(&token.text));
                i += 1;
            }
            TokenKind::Number => {
                let n = token
                    .text
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| ParseError::UnexpectedToken(token.clone()))?;
                children.push(Value::number(n));
                i += 1;
            }
            TokenKind::String => {
                children.push(Value::string(unescape(&token.text)?));
                i += 1;
            }
            TokenKind::Open => {
                let close = i + find_matching_close(&tokens[i..])
                    .ok_or(ParseError::UnexpectedEndOfInput)?;
                let child_kind = token
                    .bracket_kind()
                    .ok_or_else(|| ParseError::UnexpectedToken(token.clone()))?;
                if tokens[close].bracket_kind() != Some(child_kind) {
                    return Err(ParseError::UnexpectedToken(tokens[close].clone()));
                }

                let child = parse_expression(&tokens[i + 1..close], child_kind)?;
                children.push(Value::Expression(child));
                i = close + 1;
            }
            TokenKind::Close => return Err(ParseError::UnexpectedToken(token.clone())),
        }
    }

    Ok(Expression::new(kind, children))
}

/// Tokenize and parse `input` as a single expression of `kind`
pub fn parse(input: &str, kind: ExprKind) -> Result<Expression, Error> {
    let tokens = tokenize(input)?;
    Ok(parse_expression(&tokens, kind)?)
}

/// Index of the close bracket matching the open bracket at `tokens[0]`
fn find_matching_close(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Open => depth += 1,
            TokenKind::Close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip the quotes from a string literal and resolve its escape sequences
fn unescape(literal: &str) -> Result<String, ParseError> {
    let malformed = |reason: String| ParseError::MalformedString {
        literal: literal.to_string(),
        reason,
    };

    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| malformed("missing quotes".to_string()))?;

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('\'') => '\'',
            Some(other) => return Err(malformed(format!("unknown escape sequence \\{other}"))),
            None => return Err(malformed("trailing backslash".to_string())),
        };
        result.push(escaped);
    }

    Ok(result)
}
