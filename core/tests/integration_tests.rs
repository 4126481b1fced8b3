use qlisp::{Environment, Error, Value, evaluate, register_builtins};

fn new_env() -> Environment {
    let env = Environment::new();
    register_builtins(&env);
    env
}

fn render(result: Result<Value, Error>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(Error::Runtime(e)) => Value::Error(e).to_string(),
        Err(e) => format!("Parse error: {e}"),
    }
}

fn eval_expr(expr: &str) -> String {
    render(evaluate(&new_env(), expr, false))
}

/// Load `program` as a sequence of statements, then evaluate `expr`
fn eval_after(program: &str, expr: &str) -> String {
    let env = new_env();
    evaluate(&env, program, true).unwrap();
    render(evaluate(&env, expr, false))
}

#[test]
fn test_arithmetic() {
    assert_eq!(eval_expr("(+ 1 2 3)"), "6");
    assert_eq!(eval_expr("+ 1 2 3"), "6");
    assert_eq!(eval_expr("(- 10 4 3)"), "3");
    assert_eq!(eval_expr("(- 5)"), "-5");
    assert_eq!(eval_expr("(* 2 (+ 1 2))"), "6");
    assert_eq!(eval_expr("(/ 9 2)"), "4.5");
    assert_eq!(eval_expr("(mod 7 3)"), "1");
    assert_eq!(eval_expr("(+ 1.5 -0.5)"), "1");
}

#[test]
fn test_qexpr_is_not_evaluated() {
    assert_eq!(eval_expr("{1 2 3}"), "{1 2 3}");
    assert_eq!(eval_expr("{+ 1 2}"), "{+ 1 2}");
    assert_eq!(eval_expr("{undefined (also undefined)}"), "{undefined (also undefined)}");
}

#[test]
fn test_single_element_and_empty_expressions() {
    assert_eq!(eval_expr("(5)"), "5");
    assert_eq!(eval_expr("((((5))))"), "5");
    assert_eq!(eval_expr("()"), "()");
    assert_eq!(eval_expr(""), "()");
}

#[test]
fn test_list_operations() {
    assert_eq!(eval_expr("(head {1 2 3})"), "{1}");
    assert_eq!(eval_expr("(tail {1 2 3})"), "{2 3}");
    assert_eq!(eval_expr("(tail {1})"), "{}");
    assert_eq!(eval_expr("(list 1 (+ 1 1) {3})"), "{1 2 {3}}");
    assert_eq!(eval_expr("(join {1 2} {3 4})"), "{1 2 3 4}");
    assert_eq!(eval_expr("(join {1} {} {2})"), "{1 2}");
}

#[test]
fn test_string_operations() {
    assert_eq!(eval_expr(r#"(head "hello")"#), r#""h""#);
    assert_eq!(eval_expr(r#"(tail "hello")"#), r#""ello""#);
    assert_eq!(eval_expr(r#"(join "foo" "bar")"#), r#""foobar""#);
    assert_eq!(eval_expr(r#""line\nbreak""#), r#""line\nbreak""#);
}

#[test]
fn test_eval() {
    assert_eq!(eval_expr("(eval {+ 1 2})"), "3");
    assert_eq!(eval_expr("(eval {5})"), "5");
    assert_eq!(eval_expr("(eval (head {(+ 1 2) 4}))"), "3");
    assert_eq!(eval_expr("(eval (tail {tail tail {5 6 7}}))"), "{6 7}");
    assert_eq!(eval_expr("(eval 4)"), "4");
}

#[test]
fn test_eval_of_quote_matches_direct_evaluation() {
    for literal in ["42", "\"text\"", "(+ 1 2)", "(head {1 2})", "{a b}"] {
        assert_eq!(
            eval_expr(&format!("(eval {{{literal}}})")),
            eval_expr(literal),
            "literal: {literal}"
        );
    }
}

#[test]
fn test_comparisons_and_if() {
    assert_eq!(eval_expr("(if (> 3 2) {1} {2})"), "1");
    assert_eq!(eval_expr("(if (< 3 2) {1} {2})"), "2");
    assert_eq!(eval_expr("(if 0 {1} {+ 1 1})"), "2");
    assert_eq!(eval_expr("(= {1 {2}} {1 {2}})"), "1");
    assert_eq!(eval_expr("(= 1 \"1\")"), "0");
    assert_eq!(eval_expr("(>= 2 2)"), "1");
}

#[test]
fn test_if_evaluates_one_branch() {
    assert_eq!(eval_expr("(if 1 {1} {undefined})"), "1");
    assert_eq!(eval_after("(if 0 {def {x} 1} {def {x} 2})", "x"), "2");
}

#[test]
fn test_def_and_lookup() {
    assert_eq!(eval_after("(def {x y} 1 2)", "(+ x y)"), "3");
    assert_eq!(eval_after("(def {x} 1) (def {x} 5)", "x"), "5");
    assert_eq!(eval_expr("(def {x} 1)"), "()");
}

#[test]
fn test_currying() {
    let program = "(def {add} (fn {a b} {+ a b})) (def {add5} (add 5))";
    assert_eq!(eval_after(program, "(add5 3)"), "8");
    assert_eq!(eval_after(program, "add5"), "(fn (b) (+ a b))");
    assert_eq!(eval_after(program, "add"), "(fn (a b) (+ a b))");
    assert_eq!(eval_after(program, "(add 1 2)"), "3");
}

#[test]
fn test_partial_application_of_anonymous_function() {
    let env = new_env();
    let partial = evaluate(&env, "(fn {x y} {+ x y}) 2", false).unwrap();
    assert!(matches!(partial, Value::Function(_)));
    assert_eq!(eval_expr("(((fn {x y} {+ x y}) 2) 3)"), "5");
}

#[test]
fn test_variadic_functions() {
    let program = "(def {f} (fn {x & rest} {list x rest}))";
    assert_eq!(eval_after(program, "(f 1 2 3)"), "{1 {2 3}}");
    assert_eq!(eval_after(program, "(f 1)"), "{1 {}}");
    assert_eq!(eval_after("(def {all} (fn {& xs} {xs}))", "(all 1 2)"), "{1 2}");
}

#[test]
fn test_recursion() {
    let program = "(def {fact} (fn {n} {if (= n 0) {1} {* n (fact (- n 1))}}))";
    assert_eq!(eval_after(program, "(fact 5)"), "120");
}

#[test]
fn test_def_inside_function_is_global() {
    let program = "(def {set-g} (fn {x} {def {g} x})) (set-g 5)";
    assert_eq!(eval_after(program, "g"), "5");
}

#[test]
fn test_let_inside_function_is_local() {
    let program = "(def {set-l} (fn {x} {let {l} x})) (set-l 5)";
    assert_eq!(eval_after(program, "l"), "Error: unknown identifier `l`");
}

#[test]
fn test_function_sees_callers_bindings() {
    let program = "
        (def {get-y} (fn {_} {y}))
        (def {with-y} (fn {y} {get-y 0}))
    ";
    assert_eq!(eval_after(program, "(with-y 7)"), "7");
    assert_eq!(eval_after(program, "(get-y 0)"), "Error: unknown identifier `y`");
}

#[test]
fn test_runtime_errors() {
    assert_eq!(eval_expr("(head {})"), "Error: cannot take head of empty list");
    assert_eq!(eval_expr("(+ 1 \"a\")"), "Error: `+` expected Number, got String");
    assert_eq!(eval_expr("(foo 1)"), "Error: unknown identifier `foo`");
    assert_eq!(
        eval_expr("(1 2)"),
        "Error: S-expressions should start with a function, got Number"
    );
    assert_eq!(
        eval_expr("(head {1} {2})"),
        "Error: `head` expected exactly 1 argument(s), got 2"
    );
    assert_eq!(eval_expr("(/ 1 0)"), "Error: `/` division by zero");
    assert_eq!(
        eval_expr("((fn {x} {x}) 1 2)"),
        "Error: function expected at most 1 argument(s), got 2"
    );
    assert_eq!(eval_expr("(error \"custom\")"), "Error: custom");
    assert_eq!(
        eval_expr(&format!("(* {})", ["1000000000000000000000000"; 14].join(" "))),
        "Error: `*` result is out of range"
    );
}

#[test]
fn test_errors_propagate_through_nesting() {
    assert_eq!(
        eval_expr("(+ 1 (* 2 (head {})))"),
        "Error: cannot take head of empty list"
    );
    assert_eq!(
        eval_expr("(list 1 (error \"first\") (error \"second\"))"),
        "Error: first"
    );
}

#[test]
fn test_parse_errors() {
    assert_eq!(eval_expr("(+ 1"), "Parse error: unexpected end of input");
    assert_eq!(eval_expr("(+ 1 2))"), "Parse error: unexpected token in input: )");
    assert_eq!(
        eval_expr("(+ 1 $)"),
        "Parse error: unrecognized character in input: '$'"
    );
}

#[test]
fn test_builtins_display() {
    assert_eq!(eval_expr("head"), "<builtin>");
    assert_eq!(eval_expr("(list head)"), "{<builtin>}");
}
