//! Argument checking helpers for native functions
//!
//! Every builtin validates its own arguments. These helpers turn a wrong
//! count or a wrong type into the matching structured `RuntimeError`, named
//! after the builtin that rejected it.

use crate::error::{Arity, RuntimeError};
use crate::interner::InternedSymbol;
use crate::language::{ExprKind, Expression, Value};

// ============================================================================
// Arity
// ============================================================================

pub fn check_arity(
    function: &'static str,
    args: &[Value],
    expected: Arity,
) -> Result<(), RuntimeError> {
    if expected.accepts(args.len()) {
        Ok(())
    } else {
        Err(RuntimeError::ArityMismatch {
            function,
            expected,
            actual: args.len(),
        })
    }
}

// ============================================================================
// Value Extraction Helpers
// ============================================================================

fn mismatch(function: &'static str, expected: &'static str, value: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch {
        function,
        expected,
        actual: value.type_name(),
    }
}

pub fn extract_number(function: &'static str, value: &Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(mismatch(function, "Number", value)),
    }
}

pub fn extract_string<'a>(function: &'static str, value: &'a Value) -> Result<&'a str, RuntimeError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(mismatch(function, "String", value)),
    }
}

pub fn extract_qexpr<'a>(
    function: &'static str,
    value: &'a Value,
) -> Result<&'a Expression, RuntimeError> {
    match value {
        Value::Expression(e) if e.kind == ExprKind::Q => Ok(e),
        _ => Err(mismatch(function, "Q-Expression", value)),
    }
}

pub fn extract_identifier(
    function: &'static str,
    value: &Value,
) -> Result<InternedSymbol, RuntimeError> {
    match value {
        Value::Identifier(id) => Ok(*id),
        _ => Err(mismatch(function, "Identifier", value)),
    }
}

/// Every child of a Q-expression as an identifier, e.g. `{x y}` for `def`
pub fn extract_identifiers(
    function: &'static str,
    value: &Value,
) -> Result<Vec<InternedSymbol>, RuntimeError> {
    extract_qexpr(function, value)?
        .children()
        .iter()
        .map(|child| extract_identifier(function, child))
        .collect()
}
