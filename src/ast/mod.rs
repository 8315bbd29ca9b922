pub mod expr;
mod pretty_printer;
pub mod stmt;
mod visitor;

pub use pretty_printer::PrettyPrint;
pub use visitor::{ExprVisitor, StmtVisitor};
