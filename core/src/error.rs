//! Error types for the three stages of running qlisp source.
//!
//! Lexing and parsing fail with ordinary `Result`s. Evaluation never fails
//! that way: a `RuntimeError` is wrapped in `Value::Error` and travels through
//! the evaluator like any other value until something reports it.

use std::fmt;

use thiserror::Error;

use crate::lexer::Token;

/// Lexical error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// No token pattern matches at the current input position
    #[error("unrecognized character in input: {0:?}")]
    UnrecognizedCharacter(char),
}

/// Syntactic error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A token that cannot start an item, or a close bracket of the wrong kind
    #[error("unexpected token in input: {0}")]
    UnexpectedToken(Token),

    /// An open bracket without its matching close
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    /// A string literal with an escape sequence that cannot be unescaped
    #[error("malformed string literal {literal}: {reason}")]
    MalformedString {
        /// The literal as written, quotes included
        literal: String,
        /// What went wrong while unescaping
        reason: String,
    },
}

/// How many arguments a builtin accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Semantic error produced while evaluating
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("unknown identifier `{name}`")]
    UnknownIdentifier { name: String },

    #[error("S-expressions should start with a function, got {actual}")]
    NotAFunction { actual: &'static str },

    #[error("`{function}` expected {expected}, got {actual}")]
    TypeMismatch {
        function: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("`{function}` expected {expected} argument(s), got {actual}")]
    ArityMismatch {
        function: &'static str,
        expected: Arity,
        actual: usize,
    },

    /// A closure applied to more arguments than it has formals
    #[error("function expected at most {expected} argument(s), got {actual}")]
    TooManyArguments { expected: usize, actual: usize },

    #[error("`&` must be followed by exactly one formal parameter")]
    MalformedVariadic,

    #[error("cannot take {function} of empty {what}")]
    EmptyInput {
        function: &'static str,
        what: &'static str,
    },

    #[error("`{function}` division by zero")]
    DivisionByZero { function: &'static str },

    /// Overflow to infinity, which has no source form
    #[error("`{function}` result is out of range")]
    OutOfRange { function: &'static str },

    #[error("`{function}` got {identifiers} identifier(s) but {values} value(s)")]
    BindingCountMismatch {
        function: &'static str,
        identifiers: usize,
        values: usize,
    },

    #[error("cannot compare values of type {type_name}")]
    Incomparable { type_name: &'static str },

    #[error("cannot load module `{name}`: {message}")]
    Module { name: String, message: String },

    #[error("`{function}` I/O error: {message}")]
    Io {
        function: &'static str,
        message: String,
    },

    /// Raised from source code through the `error` builtin
    #[error("{0}")]
    User(String),
}

/// Any failure surfaced by [`crate::evaluate`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
