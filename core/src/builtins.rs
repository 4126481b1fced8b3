//! Builtin native functions
//!
//! The builtin set is a fixed table installed into the root environment once
//! by [`register_builtins`]. Each function receives the calling environment
//! and its already-evaluated arguments.

use std::io::{self, Write};

use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::environment::{Bindings, Environment};
use crate::error::{Arity, Error, RuntimeError};
use crate::interner::InternedSymbol;
use crate::interpreter::{VARIADIC_MARKER, eval, eval_sexpr, evaluate};
use crate::language::{Builtin, Closure, Function, Value};
use crate::native::{
    check_arity, extract_identifiers, extract_number, extract_qexpr, extract_string,
};

const BUILTINS: &[Builtin] = &[
    // Arithmetic
    Builtin { name: "+", op: add },
    Builtin { name: "-", op: sub },
    Builtin { name: "*", op: mul },
    Builtin { name: "/", op: div },
    Builtin { name: "mod", op: modulo },
    // Comparison
    Builtin { name: "<", op: lt },
    Builtin { name: "<=", op: lte },
    Builtin { name: ">", op: gt },
    Builtin { name: ">=", op: gte },
    Builtin { name: "=", op: equal },
    // Lists and strings
    Builtin { name: "head", op: head },
    Builtin { name: "tail", op: tail },
    Builtin { name: "list", op: list },
    Builtin { name: "eval", op: eval_fn },
    Builtin { name: "join", op: join },
    // Bindings and functions
    Builtin { name: "def", op: def },
    Builtin { name: "let", op: let_fn },
    Builtin { name: "fn", op: fn_fn },
    // Control
    Builtin { name: "if", op: if_fn },
    Builtin { name: "error", op: error },
    // Modules and I/O
    Builtin { name: "import", op: import },
    Builtin { name: "print", op: print },
];

/// Define every builtin in the root of `env`
pub fn register_builtins(env: &Environment) {
    for builtin in BUILTINS {
        env.def(
            InternedSymbol::new(builtin.name),
            Value::Function(Function::Builtin(*builtin)),
        );
    }
}

pub fn lookup_builtin(name: &str) -> Option<Builtin> {
    BUILTINS.iter().find(|b| b.name == name).copied()
}

// ============================================================================
// Arithmetic
// ============================================================================

fn fold_numbers(
    function: &'static str,
    args: &[Value],
    op: fn(f64, f64) -> Result<f64, RuntimeError>,
) -> Result<Value, RuntimeError> {
    check_arity(function, args, Arity::AtLeast(1))?;
    let mut numbers = args.iter().map(|arg| extract_number(function, arg));
    // Arity was checked, the first element exists
    let mut result = numbers.next().unwrap_or(Ok(0.0))?;
    for n in numbers {
        result = op(result, n?)?;
        if !result.is_finite() {
            return Err(RuntimeError::OutOfRange { function });
        }
    }
    Ok(Value::number(result))
}

pub fn add(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    fold_numbers("+", &args, |a, b| Ok(a + b))
}

/// Subtraction; with a single argument, negation
pub fn sub(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    if let [only] = args.as_slice() {
        return Ok(Value::number(-extract_number("-", only)?));
    }
    fold_numbers("-", &args, |a, b| Ok(a - b))
}

pub fn mul(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    fold_numbers("*", &args, |a, b| Ok(a * b))
}

pub fn div(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    fold_numbers("/", &args, |a, b| {
        if b == 0.0 {
            Err(RuntimeError::DivisionByZero { function: "/" })
        } else {
            Ok(a / b)
        }
    })
}

/// Floating-point remainder, sign follows the dividend
pub fn modulo(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity("mod", &args, Arity::Exactly(2))?;
    let a = extract_number("mod", &args[0])?;
    let b = extract_number("mod", &args[1])?;
    if b == 0.0 {
        return Err(RuntimeError::DivisionByZero { function: "mod" });
    }
    Ok(Value::number(a % b))
}

// ============================================================================
// Comparison
// ============================================================================

fn compare_numbers(
    function: &'static str,
    args: &[Value],
    op: fn(f64, f64) -> bool,
) -> Result<Value, RuntimeError> {
    check_arity(function, args, Arity::Exactly(2))?;
    let a = extract_number(function, &args[0])?;
    let b = extract_number(function, &args[1])?;
    Ok(Value::truth(op(a, b)))
}

pub fn lt(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    compare_numbers("<", &args, |a, b| a < b)
}

pub fn lte(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    compare_numbers("<=", &args, |a, b| a <= b)
}

pub fn gt(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    compare_numbers(">", &args, |a, b| a > b)
}

pub fn gte(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    compare_numbers(">=", &args, |a, b| a >= b)
}

/// Structural equality of all arguments with the first
pub fn equal(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity("=", &args, Arity::AtLeast(2))?;
    let Some((first, rest)) = args.split_first() else {
        return Ok(Value::truth(true));
    };
    for other in rest {
        if !values_equal(first, other)? {
            return Ok(Value::truth(false));
        }
    }
    Ok(Value::truth(true))
}

fn values_equal(a: &Value, b: &Value) -> Result<bool, RuntimeError> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(x == y),
        (Value::String(x), Value::String(y)) => Ok(x == y),
        (Value::Identifier(x), Value::Identifier(y)) => Ok(x == y),
        (Value::Expression(x), Value::Expression(y)) => {
            if x.kind != y.kind || x.len() != y.len() {
                return Ok(false);
            }
            for (cx, cy) in x.children().iter().zip(y.children()) {
                if !values_equal(cx, cy)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (Value::Function(_), Value::Function(_)) | (Value::Error(_), Value::Error(_)) => {
            Err(RuntimeError::Incomparable {
                type_name: a.type_name(),
            })
        }
        _ => Ok(false),
    }
}

// ============================================================================
// Lists and Strings
// ============================================================================

/// First element as a one-element Q-expression, or first grapheme of a string
pub fn head(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity("head", &args, Arity::Exactly(1))?;
    match &args[0] {
        Value::String(s) => {
            let first = s.graphemes(true).next().ok_or(RuntimeError::EmptyInput {
                function: "head",
                what: "string",
            })?;
            Ok(Value::string(first))
        }
        other => {
            let list = extract_qexpr("head", other)?;
            let first = list.children().first().ok_or(RuntimeError::EmptyInput {
                function: "head",
                what: "list",
            })?;
            Ok(Value::qexpr(vec![first.clone()]))
        }
    }
}

/// Everything but the first element (or grapheme)
pub fn tail(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity("tail", &args, Arity::Exactly(1))?;
    match &args[0] {
        Value::String(s) => {
            let first = s.graphemes(true).next().ok_or(RuntimeError::EmptyInput {
                function: "tail",
                what: "string",
            })?;
            Ok(Value::string(&s[first.len()..]))
        }
        other => {
            let list = extract_qexpr("tail", other)?;
            match list.children() {
                [] => Err(RuntimeError::EmptyInput {
                    function: "tail",
                    what: "list",
                }),
                [_, rest @ ..] => Ok(Value::qexpr(rest.to_vec())),
            }
        }
    }
}

pub fn list(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::qexpr(args))
}

/// Evaluate an expression as an S-expression whatever its kind
pub fn eval_fn(env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity("eval", &args, Arity::Exactly(1))?;
    match args.into_iter().next() {
        Some(Value::Expression(expr)) => eval_sexpr(&expr, env).into_result(),
        Some(other) => eval(other, env).into_result(),
        None => Ok(Value::unit()),
    }
}

/// Concatenate Q-expressions, or strings; the first argument picks which
pub fn join(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity("join", &args, Arity::AtLeast(1))?;
    match &args[0] {
        Value::String(_) => {
            let mut joined = String::new();
            for arg in &args {
                joined.push_str(extract_string("join", arg)?);
            }
            Ok(Value::string(joined))
        }
        _ => {
            let mut joined = Vec::new();
            for arg in &args {
                joined.extend_from_slice(extract_qexpr("join", arg)?.children());
            }
            Ok(Value::qexpr(joined))
        }
    }
}

// ============================================================================
// Bindings and Functions
// ============================================================================

fn bind(
    function: &'static str,
    args: Vec<Value>,
    mut put: impl FnMut(InternedSymbol, Value),
) -> Result<Value, RuntimeError> {
    check_arity(function, &args, Arity::AtLeast(1))?;
    let mut args = args.into_iter();
    let names = match args.next() {
        Some(first) => extract_identifiers(function, &first)?,
        None => Vec::new(),
    };
    let values: Vec<Value> = args.collect();

    if names.len() != values.len() {
        return Err(RuntimeError::BindingCountMismatch {
            function,
            identifiers: names.len(),
            values: values.len(),
        });
    }

    for (name, value) in names.into_iter().zip(values) {
        put(name, value);
    }
    Ok(Value::unit())
}

/// Bind in the root scope: `(def {x y} 1 2)`
pub fn def(env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    bind("def", args, |name, value| env.def(name, value))
}

/// Bind in the calling scope: `(let {x} 1)`
pub fn let_fn(env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    bind("let", args, |name, value| env.put(name, value))
}

/// Build a closure: `(fn {x & rest} {body})`
pub fn fn_fn(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity("fn", &args, Arity::Exactly(2))?;
    let formals = extract_identifiers("fn", &args[0])?;
    let body = extract_qexpr("fn", &args[1])?.clone();

    // `&` may appear once, and only right before the last formal
    let markers = formals.iter().filter(|f| f.is(VARIADIC_MARKER)).count();
    let well_placed = formals.len() >= 2 && formals[formals.len() - 2].is(VARIADIC_MARKER);
    if markers > 1 || (markers == 1 && !well_placed) {
        return Err(RuntimeError::MalformedVariadic);
    }

    Ok(Value::Function(Function::Closure(
        Closure {
            bound: Bindings::default(),
            formals,
            body,
        }
        .into(),
    )))
}

// ============================================================================
// Control
// ============================================================================

/// `(if cond {then} {else})`: nonzero is true
pub fn if_fn(env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity("if", &args, Arity::Exactly(3))?;
    let condition = extract_number("if", &args[0])?;
    let then_branch = extract_qexpr("if", &args[1])?;
    let else_branch = extract_qexpr("if", &args[2])?;

    let branch = if condition != 0.0 {
        then_branch
    } else {
        else_branch
    };
    eval_sexpr(branch, env).into_result()
}

/// Raise a user error: `(error "message")`
pub fn error(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity("error", &args, Arity::Exactly(1))?;
    Err(RuntimeError::User(extract_string("error", &args[0])?.to_string()))
}

// ============================================================================
// Modules and I/O
// ============================================================================

/// Load a module's statements into the environment. A module that does not
/// exist is skipped.
pub fn import(env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity("import", &args, Arity::Exactly(1))?;
    let name = extract_string("import", &args[0])?;

    let Some(modules) = env.modules() else {
        debug!(module = name, "no module source configured, skipping import");
        return Ok(Value::unit());
    };

    let source = modules.read(name).map_err(|e| RuntimeError::Module {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    let Some(source) = source else {
        debug!(module = name, "module not found, skipping import");
        return Ok(Value::unit());
    };

    debug!(module = name, bytes = source.len(), "importing module");
    match evaluate(env, &source, true) {
        Ok(value) => Ok(value),
        Err(Error::Runtime(e)) => Err(e),
        Err(e) => Err(RuntimeError::Module {
            name: name.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Print arguments separated by spaces; strings are printed without quotes
pub fn print(_env: &Environment, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let io_error = |e: io::Error| RuntimeError::Io {
        function: "print",
        message: e.to_string(),
    };

    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(handle, " ").map_err(io_error)?;
        }
        let written = match arg {
            Value::String(s) => write!(handle, "{s}"),
            other => write!(handle, "{other}"),
        };
        written.map_err(io_error)?;
    }
    writeln!(handle).map_err(io_error)?;

    Ok(Value::unit())
}
