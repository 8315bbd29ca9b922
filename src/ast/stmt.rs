use crate::ast::expr::{Expr, VarUseData};
use std::rc::Rc;

pub type Params = Vec<String>;

/// Function declaration translated to AST
///
/// Methods in a class body reuse this shape. The body is reference counted
/// so that bound methods can share it with the declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct FnDeclArgs {
    pub name: String,
    pub params: Params,
    pub body: Rc<Vec<Stmt>>,
}

impl FnDeclArgs {
    pub fn new(name: String, params: Params, body: Rc<Vec<Stmt>>) -> Self {
        Self {
            name: name,
            params: params,
            body: body,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDeclArgs {
    pub name: String,
    /// Use site of the superclass name (if any); resolved like a variable
    pub superclass: Option<VarUseData>,
    pub methods: Vec<FnDeclArgs>,
}

impl ClassDeclArgs {
    pub fn new(name: String, superclass: Option<VarUseData>, methods: Vec<FnDeclArgs>) -> Self {
        Self {
            name: name,
            superclass: superclass,
            methods: methods,
        }
    }
}

/// stmt → expr | print | var | if | return | while | block | fn | class ;
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Print(PrintArgs),
    Var(VarDeclArgs),
    If(Box<IfArgs>),
    Return(Return),
    While(Box<WhileArgs>),
    Block(BlockArgs),
    Fn(FnDeclArgs),
    Class(ClassDeclArgs),
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    pub fn print(expr: Expr) -> Self {
        Stmt::Print(PrintArgs { expr: expr })
    }

    pub fn var_decl(name: String, init: Expr) -> Self {
        Stmt::Var(VarDeclArgs {
            name: name,
            init: init,
        })
    }

    pub fn if_then_else(condition: Expr, if_true: Stmt, if_false: Option<Stmt>) -> Self {
        Stmt::If(Box::new(IfArgs {
            condition: condition,
            if_true: if_true,
            if_false: if_false,
        }))
    }

    pub fn return_(expr: Expr) -> Self {
        Stmt::Return(Return { expr: expr })
    }

    pub fn while_(condition: Expr, body: Stmt) -> Self {
        Stmt::While(Box::new(WhileArgs {
            condition: condition,
            body: body,
        }))
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Stmt::Block(BlockArgs { stmts: stmts })
    }
}

impl From<PrintArgs> for Stmt {
    fn from(item: PrintArgs) -> Self {
        Stmt::Print(item)
    }
}

impl From<VarDeclArgs> for Stmt {
    fn from(item: VarDeclArgs) -> Self {
        Stmt::Var(item)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrintArgs {
    pub expr: Expr,
}

/// `var` declaration
///
/// An omitted initializer is parsed as a `nil` literal.
#[derive(Clone, Debug, PartialEq)]
pub struct VarDeclArgs {
    pub name: String,
    pub init: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfArgs {
    pub condition: Expr,
    pub if_true: Stmt,
    /// May itself be an `if` (`else if` chains)
    pub if_false: Option<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockArgs {
    pub stmts: Vec<Stmt>,
}

impl BlockArgs {
    pub fn into_stmt(self) -> Stmt {
        Stmt::Block(self)
    }
}

/// An omitted return value is parsed as a `nil` literal.
#[derive(Clone, Debug, PartialEq)]
pub struct Return {
    pub expr: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileArgs {
    pub condition: Expr,
    pub body: Stmt,
}
