pub mod env;
pub mod obj;

mod interpreter;
pub use interpreter::{new_globals, Interpreter};

pub type Result<T> = ::std::result::Result<T, RuntimeError>;
use thiserror::Error;

/// Error when evaluating. All of these unwind the evaluator to the
/// top-level `execute` call; nothing is caught inside the runtime.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// Operator applied to operands of the wrong type
    #[error("TypeMismatch: {0}")]
    TypeMismatch(&'static str),
    #[error("DivisionByZero: Division by zero.")]
    DivisionByZero,
    /// Tried to look up or assign an undefined variable
    #[error("UndefinedVariable: Undefined variable '{0}'.")]
    UndefinedVariable(String),
    #[error("UndefinedProperty: Undefined property '{0}'.")]
    UndefinedProperty(String),
    #[error("FieldOnNonInstance: Only instances have fields.")]
    FieldOnNonInstance,
    #[error("CallOfNonCallable: Can only call functions and classes.")]
    CallOfNonCallable,
    #[error("ArityMismatch: Expected {expected} arguments but got {got}.")]
    ArityMismatch { expected: usize, got: usize },
    #[error("SuperclassNotAClass: Superclass must be a class.")]
    SuperclassNotAClass,
    #[error("StackOverflow: Exceeded the maximum call depth of {0}.")]
    StackOverflow(usize),
}
