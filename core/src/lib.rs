//! Core language definition for qlisp
//!
//! This crate contains the lexer, parser, environment model and evaluator of
//! qlisp, a small Lisp with quoted Q-expressions and automatically curried
//! functions. It does not include the interactive shell; that lives in the
//! `qlisp-repl` crate.
//!
//! ```
//! use qlisp::{Environment, Value, evaluate, register_builtins};
//!
//! let env = Environment::new();
//! register_builtins(&env);
//! evaluate(&env, "(def {add} (fn {a b} {+ a b}))", true).unwrap();
//! let add5 = evaluate(&env, "add 5", false).unwrap();
//! assert_eq!(add5.to_string(), "(fn (b) (+ a b))");
//! assert_eq!(evaluate(&env, "(add 5) 3", false), Ok(Value::number(8.0)));
//! ```

pub mod builtins;
pub mod environment;
pub mod error;
pub mod interner;
pub mod interpreter;
pub mod language;
pub mod lexer;
pub mod modules;
pub mod native;
pub mod parser;

// Re-export commonly used items for convenience
pub use builtins::{lookup_builtin, register_builtins};
pub use environment::{Bindings, Environment};
pub use error::{Arity, Error, LexError, ParseError, RuntimeError};
pub use interner::InternedSymbol;
pub use interpreter::{VARIADIC_MARKER, call, eval, eval_sexpr, evaluate};
pub use language::{Builtin, BuiltinFn, Closure, ExprKind, Expression, Function, Value};
pub use lexer::{Token, TokenKind, tokenize};
pub use modules::{FileModules, MemoryModules, ModuleSource};
pub use parser::{parse, parse_expression};
