use std::fmt;
use std::rc::Rc;

use crate::environment::{Bindings, Environment};
use crate::error::RuntimeError;
use crate::interner::InternedSymbol;

// ============================================================================
// Core Type System
// ============================================================================

/// Whether an expression is applied on evaluation (S) or quoted (Q)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    S,
    Q,
}

impl ExprKind {
    pub fn open(self) -> char {
        match self {
            ExprKind::S => '(',
            ExprKind::Q => '{',
        }
    }

    pub fn close(self) -> char {
        match self {
            ExprKind::S => ')',
            ExprKind::Q => '}',
        }
    }
}

/// An ordered list of values tagged with its kind. The children are shared,
/// so cloning an expression never copies the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExprKind,
    children: Rc<[Value]>,
}

impl Expression {
    pub fn new(kind: ExprKind, children: Vec<Value>) -> Self {
        Expression {
            kind,
            children: children.into(),
        }
    }

    pub fn children(&self) -> &[Value] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn fmt_as(&self, kind: ExprKind, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", kind.open())?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{child}")?;
        }
        write!(f, "{}", kind.close())
    }
}

/// Native operation signature: the calling environment and the evaluated
/// arguments in, a value or a diagnostic out
pub type BuiltinFn = fn(&Environment, Vec<Value>) -> Result<Value, RuntimeError>;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub op: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

// Builtins are unique per name, comparing the pointers would add nothing
impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A user-defined function. `bound` holds the arguments already supplied by
/// partial application; `formals` are the parameters still waiting for one.
#[derive(Debug, Clone, PartialEq)]
pub struct Closure {
    pub bound: Bindings,
    pub formals: Vec<InternedSymbol>,
    pub body: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    Builtin(Builtin),
    Closure(Rc<Closure>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(Rc<str>),
    Identifier(InternedSymbol),
    Expression(Expression),
    Function(Function),
    Error(RuntimeError),
}

impl Value {
    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn identifier(name: &str) -> Self {
        Value::Identifier(InternedSymbol::new(name))
    }

    pub fn sexpr(children: Vec<Value>) -> Self {
        Value::Expression(Expression::new(ExprKind::S, children))
    }

    pub fn qexpr(children: Vec<Value>) -> Self {
        Value::Expression(Expression::new(ExprKind::Q, children))
    }

    /// `()`, the value of statements evaluated for their effect
    pub fn unit() -> Self {
        Value::sexpr(Vec::new())
    }

    /// Truth as the language spells it: 1 or 0
    pub fn truth(b: bool) -> Self {
        Value::Number(if b { 1.0 } else { 0.0 })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Identifier(_) => "Identifier",
            Value::Expression(e) => match e.kind {
                ExprKind::S => "S-Expression",
                ExprKind::Q => "Q-Expression",
            },
            Value::Function(_) => "Function",
            Value::Error(_) => "Error",
        }
    }

    /// Lift an Error value into `Err` so callers can short-circuit with `?`
    pub fn into_result(self) -> Result<Value, RuntimeError> {
        match self {
            Value::Error(e) => Err(e),
            v => Ok(v),
        }
    }
}

impl From<RuntimeError> for Value {
    fn from(e: RuntimeError) -> Self {
        Value::Error(e)
    }
}

impl From<Result<Value, RuntimeError>> for Value {
    fn from(r: Result<Value, RuntimeError>) -> Self {
        r.unwrap_or_else(Value::Error)
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            '\0' => result.push_str("\\0"),
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            c => result.push(c),
        }
    }
    result
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_as(self.kind, f)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Function::Builtin(_) => write!(f, "<builtin>"),
            Function::Closure(closure) => {
                write!(f, "(fn (")?;
                for (i, formal) in closure.formals.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{formal}")?;
                }
                write!(f, ") ")?;
                closure.body.fmt_as(ExprKind::S, f)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Value::Identifier(name) => write!(f, "{name}"),
            Value::Expression(e) => write!(f, "{e}"),
            Value::Function(func) => write!(f, "{func}"),
            Value::Error(e) => write!(f, "Error: {e}"),
        }
    }
}
