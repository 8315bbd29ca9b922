//! Every runtime error kind, driven through full programs

use std::cell::RefCell;
use std::rc::Rc;

use rulox::analizer::resolver::Resolver;
use rulox::lexer::{parser::Parser, scanner::Scanner};
use rulox::runtime::{Interpreter, RuntimeError};

fn run_with(src: &str, mut interpreter: Interpreter) -> Result<Vec<String>, RuntimeError> {
    let (tokens, scan_errors) = Scanner::new(src).scan();
    assert!(scan_errors.is_empty(), "scan errors: {:?}", scan_errors);
    let (stmts, parse_errors) = Parser::new(&tokens).parse();
    assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);

    {
        let mut resolver = Resolver::new(&mut interpreter.caches);
        resolver.resolve_stmts(&stmts).expect("resolve error");
    }

    let sink = Rc::new(RefCell::new(Vec::new()));
    interpreter.capture_prints(Rc::clone(&sink));
    interpreter.execute(&stmts)?;

    let lines = sink.borrow().clone();
    Ok(lines)
}

fn run_err(src: &str) -> RuntimeError {
    match run_with(src, Interpreter::new()) {
        Ok(lines) => panic!("expected a runtime error, printed {:?}", lines),
        Err(why) => why,
    }
}

#[test]
fn adding_mixed_operands() {
    let why = run_err("print 1 + true;");
    assert!(matches!(why, RuntimeError::TypeMismatch(_)));
    assert_eq!(
        why.to_string(),
        "TypeMismatch: Operands must be two numbers or two strings."
    );
}

#[test]
fn negating_a_string() {
    assert_eq!(
        run_err(r#"print -"a";"#).to_string(),
        "TypeMismatch: Operand must be a number."
    );
}

#[test]
fn comparing_a_number_with_a_string() {
    assert_eq!(
        run_err(r#"print 1 < "a";"#).to_string(),
        "TypeMismatch: Operands must be numbers."
    );
}

#[test]
fn division_by_zero() {
    assert!(matches!(run_err("print 1 / 0;"), RuntimeError::DivisionByZero));
}

#[test]
fn reading_an_undefined_variable() {
    assert!(matches!(
        run_err("print missing;"),
        RuntimeError::UndefinedVariable(name) if name == "missing"
    ));
}

#[test]
fn assigning_an_undefined_variable() {
    assert!(matches!(
        run_err("missing = 1;"),
        RuntimeError::UndefinedVariable(_)
    ));
}

#[test]
fn reading_an_undefined_property() {
    assert!(matches!(
        run_err("class A {} print A().nope;"),
        RuntimeError::UndefinedProperty(name) if name == "nope"
    ));
}

#[test]
fn super_method_missing_in_the_base() {
    assert!(matches!(
        run_err(
            r#"
            class A {}
            class B < A { m() { super.m(); } }
            B().m();
            "#
        ),
        RuntimeError::UndefinedProperty(name) if name == "m"
    ));
}

#[test]
fn property_access_on_a_number() {
    assert!(matches!(
        run_err("var x = 1; print x.y;"),
        RuntimeError::FieldOnNonInstance
    ));
}

#[test]
fn field_write_on_a_string() {
    assert!(matches!(
        run_err(r#"var s = "str"; s.len = 3;"#),
        RuntimeError::FieldOnNonInstance
    ));
}

#[test]
fn calling_a_string() {
    assert!(matches!(
        run_err(r#""nope"();"#),
        RuntimeError::CallOfNonCallable
    ));
}

#[test]
fn function_arity_is_checked() {
    assert!(matches!(
        run_err("fun f(a) { return a; } f();"),
        RuntimeError::ArityMismatch { expected: 1, got: 0 }
    ));
}

#[test]
fn construction_arity_without_init() {
    assert!(matches!(
        run_err("class A {} A(1, 2);"),
        RuntimeError::ArityMismatch { expected: 0, got: 2 }
    ));
}

#[test]
fn construction_arity_follows_init() {
    assert!(matches!(
        run_err("class A { init(x, y) {} } A(1);"),
        RuntimeError::ArityMismatch { expected: 2, got: 1 }
    ));
}

#[test]
fn native_arity_is_checked() {
    assert!(matches!(
        run_err("clock(1);"),
        RuntimeError::ArityMismatch { expected: 0, got: 1 }
    ));
}

#[test]
fn superclass_must_be_a_class() {
    assert!(matches!(
        run_err("var NotClass = 1; class B < NotClass {}"),
        RuntimeError::SuperclassNotAClass
    ));
}

#[test]
fn runaway_recursion_overflows() {
    let why = run_with(
        "fun f() { return f(); } f();",
        Interpreter::with_max_call_depth(32),
    )
    .unwrap_err();
    assert!(matches!(why, RuntimeError::StackOverflow(32)));
}

#[test]
fn deep_but_bounded_recursion_is_fine() {
    let lines = run_with(
        "fun down(n) { if (n <= 0) return 0; return down(n - 1); } print down(100);",
        Interpreter::new(),
    )
    .unwrap();
    assert_eq!(lines, ["0"]);
}
