//! Tree-walking evaluator.
//!
//! Evaluation is total: every input produces a `Value`, and failures are
//! `Value::Error`s that short-circuit whatever expression contains them.
//! Recursion depth follows expression nesting and user recursion; there is no
//! depth guard, so runaway recursion exhausts the host stack.

use std::iter;
use std::rc::Rc;

use tracing::trace;

use crate::environment::Environment;
use crate::error::{Error, RuntimeError};
use crate::interner::InternedSymbol;
use crate::language::{Closure, ExprKind, Expression, Function, Value};
use crate::parser::parse;

/// Formal parameter that collects all remaining arguments into a Q-expression
pub const VARIADIC_MARKER: &str = "&";

// ============================================================================
// Evaluator
// ============================================================================

pub fn eval(value: Value, env: &Environment) -> Value {
    match value {
        Value::Identifier(id) => env.get(id).unwrap_or_else(|| {
            RuntimeError::UnknownIdentifier {
                name: id.resolve(),
            }
            .into()
        }),
        Value::Expression(expr) => match expr.kind {
            ExprKind::Q => Value::Expression(expr),
            ExprKind::S => eval_sexpr(&expr, env),
        },
        // Numbers, strings, functions and errors are self-evaluating
        other => other,
    }
}

/// Evaluate `expr` as an application, whatever its stored kind
pub fn eval_sexpr(expr: &Expression, env: &Environment) -> Value {
    if expr.is_empty() {
        return Value::Expression(expr.clone());
    }
    try_eval_sexpr(expr, env).into()
}

fn try_eval_sexpr(expr: &Expression, env: &Environment) -> Result<Value, RuntimeError> {
    let mut values = Vec::with_capacity(expr.len());
    for child in expr.children() {
        values.push(eval(child.clone(), env).into_result()?);
    }

    if values.len() == 1 {
        return Ok(values.swap_remove(0));
    }

    let mut values = values.into_iter();
    match values.next() {
        Some(Value::Function(function)) => call(&function, env, values.collect()).into_result(),
        Some(other) => Err(RuntimeError::NotAFunction {
            actual: other.type_name(),
        }),
        None => Ok(Value::Expression(expr.clone())),
    }
}

// ============================================================================
// Function Application
// ============================================================================

/// Apply `function` to already-evaluated `args` on behalf of the caller `env`
pub fn call(function: &Function, env: &Environment, args: Vec<Value>) -> Value {
    match function {
        Function::Builtin(builtin) => (builtin.op)(env, args).into(),
        Function::Closure(closure) => apply_closure(closure, env, args).into(),
    }
}

fn apply_closure(
    closure: &Closure,
    caller: &Environment,
    args: Vec<Value>,
) -> Result<Value, RuntimeError> {
    let given = args.len();
    let frame = Environment::frame(caller, closure.bound.clone());
    let formals = closure.formals.as_slice();
    let mut bound = 0;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let Some(&formal) = formals.get(bound) else {
            return Err(RuntimeError::TooManyArguments {
                expected: formals.len(),
                actual: given,
            });
        };

        if formal.is(VARIADIC_MARKER) {
            let rest_name = variadic_name(&formals[bound..])?;
            let rest = iter::once(arg).chain(args.by_ref()).collect();
            frame.put(rest_name, Value::qexpr(rest));
            bound = formals.len();
            break;
        }

        frame.put(formal, arg);
        bound += 1;
    }

    let mut remaining = &formals[bound..];
    if remaining.first().is_some_and(|f| f.is(VARIADIC_MARKER)) {
        // Variadic tail never triggered: it collects nothing
        frame.put(variadic_name(remaining)?, Value::qexpr(Vec::new()));
        remaining = &[];
    }

    if remaining.is_empty() {
        trace!(args = given, "applying closure");
        return eval_sexpr(&closure.body, &frame).into_result();
    }

    trace!(args = given, waiting = remaining.len(), "partially applying closure");
    Ok(Value::Function(Function::Closure(Rc::new(Closure {
        bound: frame.local_bindings(),
        formals: remaining.to_vec(),
        body: closure.body.clone(),
    }))))
}

/// Given formals starting at `&`, the single name that follows it
fn variadic_name(formals: &[InternedSymbol]) -> Result<InternedSymbol, RuntimeError> {
    match formals {
        [_, name] if !name.is(VARIADIC_MARKER) => Ok(*name),
        _ => Err(RuntimeError::MalformedVariadic),
    }
}

// ============================================================================
// Entry Point
// ============================================================================

/// Parse and evaluate `input` in `env`.
///
/// With `multi_statement`, the input is read as a sequence of top-level
/// statements evaluated in order; the first one producing an Error aborts the
/// rest, and success yields `()`. Otherwise the input is one S-expression.
pub fn evaluate(env: &Environment, input: &str, multi_statement: bool) -> Result<Value, Error> {
    if multi_statement {
        let program = parse(input, ExprKind::Q)?;
        for statement in program.children() {
            eval(statement.clone(), env).into_result()?;
        }
        Ok(Value::unit())
    } else {
        let expr = parse(input, ExprKind::S)?;
        Ok(eval_sexpr(&expr, env).into_result()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::register_builtins;
    use crate::environment::Bindings;

    fn root() -> Environment {
        let env = Environment::new();
        register_builtins(&env);
        env
    }

    fn closure(formals: &[&str], body: Vec<Value>) -> Function {
        Function::Closure(Rc::new(Closure {
            bound: Bindings::default(),
            formals: formals.iter().map(|f| InternedSymbol::new(f)).collect(),
            body: Expression::new(ExprKind::Q, body),
        }))
    }

    #[test]
    fn test_self_evaluating() {
        let env = Environment::new();
        assert_eq!(eval(Value::number(3.0), &env), Value::number(3.0));
        assert_eq!(eval(Value::string("s"), &env), Value::string("s"));
        let q = Value::qexpr(vec![Value::identifier("undefined")]);
        assert_eq!(eval(q.clone(), &env), q);
    }

    #[test]
    fn test_unknown_identifier() {
        let env = Environment::new();
        assert_eq!(
            eval(Value::identifier("nope"), &env),
            Value::Error(RuntimeError::UnknownIdentifier {
                name: "nope".to_string()
            })
        );
    }

    #[test]
    fn test_single_child_is_unwrapped() {
        let env = Environment::new();
        let expr = Expression::new(ExprKind::S, vec![Value::number(5.0)]);
        assert_eq!(eval_sexpr(&expr, &env), Value::number(5.0));
    }

    #[test]
    fn test_head_must_be_function() {
        let env = Environment::new();
        let expr = Expression::new(ExprKind::S, vec![Value::number(1.0), Value::number(2.0)]);
        assert_eq!(
            eval_sexpr(&expr, &env),
            Value::Error(RuntimeError::NotAFunction { actual: "Number" })
        );
    }

    #[test]
    fn test_error_short_circuits_remaining_children() {
        let env = root();
        // The second child would define `x`; it must never run.
        let result = evaluate(&env, "(+ nope (def {x} 1))", false);
        assert!(matches!(
            result,
            Err(Error::Runtime(RuntimeError::UnknownIdentifier { .. }))
        ));
        assert_eq!(env.get(InternedSymbol::new("x")), None);
    }

    #[test]
    fn test_closure_currying() {
        let env = root();
        let add = closure(
            &["a", "b"],
            vec![
                Value::identifier("+"),
                Value::identifier("a"),
                Value::identifier("b"),
            ],
        );
        let Value::Function(partial) = call(&add, &env, vec![Value::number(5.0)]) else {
            panic!("expected a function");
        };
        assert_eq!(partial.to_string(), "(fn (b) (+ a b))");
        assert_eq!(call(&partial, &env, vec![Value::number(3.0)]), Value::number(8.0));
        // The original closure is untouched by partial application
        assert_eq!(
            call(&add, &env, vec![Value::number(1.0), Value::number(1.0)]),
            Value::number(2.0)
        );
    }

    #[test]
    fn test_too_many_arguments() {
        let env = root();
        let id = closure(&["x"], vec![Value::identifier("x")]);
        assert_eq!(
            call(&id, &env, vec![Value::number(1.0), Value::number(2.0)]),
            Value::Error(RuntimeError::TooManyArguments {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn test_variadic_collects_rest() {
        let env = root();
        let f = closure(&["x", "&", "rest"], vec![Value::identifier("rest")]);
        let args = vec![Value::number(1.0), Value::number(2.0), Value::number(3.0)];
        assert_eq!(
            call(&f, &env, args),
            Value::qexpr(vec![Value::number(2.0), Value::number(3.0)])
        );
        assert_eq!(call(&f, &env, vec![Value::number(1.0)]), Value::qexpr(vec![]));
    }

    #[test]
    fn test_malformed_variadic() {
        let env = root();
        let f = closure(&["&"], vec![Value::number(1.0)]);
        assert_eq!(
            call(&f, &env, vec![Value::number(1.0)]),
            Value::Error(RuntimeError::MalformedVariadic)
        );
        let f = closure(&["&", "a", "b"], vec![Value::number(1.0)]);
        assert_eq!(
            call(&f, &env, vec![Value::number(1.0)]),
            Value::Error(RuntimeError::MalformedVariadic)
        );
    }

    #[test]
    fn test_multi_statement_returns_unit() {
        let env = root();
        let result = evaluate(&env, "(def {a} 1) (def {b} (+ a 1))", true).unwrap();
        assert_eq!(result, Value::unit());
        assert_eq!(env.get(InternedSymbol::new("b")), Some(Value::number(2.0)));
    }

    #[test]
    fn test_multi_statement_aborts_on_first_error() {
        let env = root();
        let result = evaluate(&env, "(def {a} 1) (head {}) (def {b} 2)", true);
        assert!(matches!(
            result,
            Err(Error::Runtime(RuntimeError::EmptyInput { .. }))
        ));
        assert_eq!(env.get(InternedSymbol::new("a")), Some(Value::number(1.0)));
        assert_eq!(env.get(InternedSymbol::new("b")), None);
    }
}
