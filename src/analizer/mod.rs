//! Semantic analysis for the AST, run after parsing and before
//! interpretation. Takes O(n) time and no side effects on the tree; scope
//! distances are recorded in a side table owned by the interpreter.

pub mod resolver;

pub use resolver::Resolver;

pub type Result<T> = ::std::result::Result<T, SemanticError>;
use thiserror::Error;

/// Error found by static analysis, before any statement runs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("SemanticError: 'this' outside of a class")]
    ThisOutsideClass,
    #[error("SemanticError: 'super' outside of a class with no base")]
    SuperOutsideSubclass,
    #[error("SemanticError: 'return' outside a function")]
    ReturnOutsideFunction,
    #[error("SemanticError: cannot return a value from an initializer")]
    ReturnValueFromInitializer,
    #[error("SemanticError: variable already declared in this scope: \"{0}\"")]
    AlreadyDeclared(String),
    #[error("SemanticError: cannot read local variable in its own initializer: \"{0}\"")]
    SelfReferencingInitializer(String),
}
