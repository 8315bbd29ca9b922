//! Resolver rejections: these programs never start executing

use std::collections::HashMap;

use rulox::analizer::{Resolver, SemanticError};
use rulox::lexer::{parser::Parser, scanner::Scanner};

fn resolve(src: &str) -> Result<(), SemanticError> {
    let (tokens, scan_errors) = Scanner::new(src).scan();
    assert!(scan_errors.is_empty(), "scan errors: {:?}", scan_errors);
    let (stmts, parse_errors) = Parser::new(&tokens).parse();
    assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);

    let mut caches = HashMap::new();
    Resolver::new(&mut caches).resolve_stmts(&stmts)
}

fn resolve_err(src: &str) -> SemanticError {
    resolve(src).expect_err("expected a semantic error")
}

#[test]
fn this_at_top_level() {
    assert_eq!(resolve_err("print this;"), SemanticError::ThisOutsideClass);
}

#[test]
fn this_in_a_free_function() {
    assert_eq!(
        resolve_err("fun f() { return this; }"),
        SemanticError::ThisOutsideClass
    );
}

#[test]
fn super_outside_any_class() {
    assert_eq!(
        resolve_err("fun f() { super.m(); }"),
        SemanticError::SuperOutsideSubclass
    );
}

#[test]
fn super_in_a_class_without_a_base() {
    assert_eq!(
        resolve_err("class A { m() { super.m(); } }"),
        SemanticError::SuperOutsideSubclass
    );
}

#[test]
fn return_at_top_level() {
    assert_eq!(
        resolve_err("return 1;"),
        SemanticError::ReturnOutsideFunction
    );
}

#[test]
fn returning_a_value_from_init() {
    assert_eq!(
        resolve_err("class A { init() { return 1; } }"),
        SemanticError::ReturnValueFromInitializer
    );
}

#[test]
fn bare_return_from_init_is_allowed() {
    assert!(resolve("class A { init() { return; } }").is_ok());
}

#[test]
fn duplicate_declaration_in_a_block() {
    assert_eq!(
        resolve_err("{ var a = 1; var a = 2; }"),
        SemanticError::AlreadyDeclared("a".to_string())
    );
}

#[test]
fn duplicate_parameter_names() {
    assert_eq!(
        resolve_err("fun f(a, a) {}"),
        SemanticError::AlreadyDeclared("a".to_string())
    );
}

#[test]
fn global_redefinition_is_allowed() {
    assert!(resolve("var a = 1; var a = 2;").is_ok());
}

#[test]
fn local_variable_in_its_own_initializer() {
    assert_eq!(
        resolve_err("{ var a = a; }"),
        SemanticError::SelfReferencingInitializer("a".to_string())
    );
}

#[test]
fn shadowing_an_outer_variable_is_allowed() {
    assert!(resolve("var a = 1; { var b = a + 1; var a = 2; }").is_ok());
}

#[test]
fn initializer_reading_the_outer_binding_is_still_an_error() {
    // even though `a` exists outside, the inner declaration shadows it
    // before the initializer runs
    assert_eq!(
        resolve_err(r#"var a = "outer"; { var a = a; }"#),
        SemanticError::SelfReferencingInitializer("a".to_string())
    );
}
