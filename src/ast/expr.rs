use crate::lexer::token::TokenKind;
use std::convert::From;

// `Expr` nodes that refer to variables are hashable (via `VarUseData`) so
// that the `Resolver` can map each use site to a scope distance.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(LiteralData),
    Unary(Box<UnaryData>),
    Binary(Box<BinaryData>),
    Logic(Box<LogicData>),
    Grouping(Box<GroupData>),
    Variable(VarUseData),
    /// Assignment to a variable
    Assign(Box<AssignData>),
    Call(Box<CallData>),
    /// Reads a field or method of an instance
    Get(Box<GetUseData>),
    /// Assignment to a field of an instance
    Set(Box<SetUseData>),
    This(VarUseData),
    Super(SuperUseData),
}

/// Helpers for constructing / right recursive parsing
impl Expr {
    pub fn literal(args: LiteralData) -> Expr {
        Expr::Literal(args)
    }

    pub fn unary(oper: UnaryOper, expr: Expr) -> Expr {
        Expr::Unary(Box::new(UnaryData {
            oper: oper,
            expr: expr,
        }))
    }

    /// comparison, addition, or multiplication
    pub fn binary(left: Expr, oper: BinaryOper, right: Expr) -> Expr {
        Expr::Binary(Box::new(BinaryData {
            left: left,
            oper: oper,
            right: right,
        }))
    }

    pub fn logic(left: Expr, oper: LogicOper, right: Expr) -> Expr {
        Expr::Logic(Box::new(LogicData {
            left: left,
            oper: oper,
            right: right,
        }))
    }

    pub fn group(expr: Expr) -> Expr {
        Expr::Grouping(Box::new(GroupData { expr: expr }))
    }

    pub fn var(name: &str, id: VarUseId) -> Expr {
        Expr::Variable(VarUseData::new(name, id))
    }

    /// Assignment to a variable
    pub fn assign(name: &str, expr: Expr, id: VarUseId) -> Expr {
        Expr::Assign(Box::new(AssignData {
            assigned: VarUseData::new(name, id),
            expr: expr,
        }))
    }

    pub fn get(body: Expr, name: &str) -> Expr {
        Expr::Get(Box::new(GetUseData::new(body, name)))
    }

    /// Assignment to a field of an instance
    pub fn set(body: Expr, name: &str, value: Expr) -> Expr {
        Expr::Set(Box::new(SetUseData::new(body, name, value)))
    }

    pub fn call(callee: Expr, args: Args) -> Self {
        Expr::Call(Box::new(CallData {
            callee: callee,
            args: args,
        }))
    }

    pub fn this(id: VarUseId) -> Expr {
        Expr::This(VarUseData::new("this", id))
    }

    pub fn super_(method: &str, id: VarUseId) -> Expr {
        Expr::Super(SuperUseData {
            keyword: VarUseData::new("super", id),
            method: method.to_string(),
        })
    }
}

impl From<LiteralData> for Expr {
    fn from(item: LiteralData) -> Self {
        Expr::Literal(item)
    }
}

#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub enum LiteralData {
    Nil,
    Bool(bool),
    StringLit(String),
    Number(f64),
}

impl LiteralData {
    /// Maps specific tokens to `Option::Some(LiteralData)`
    pub fn from_token(kind: &TokenKind) -> Option<LiteralData> {
        use TokenKind::*;
        Some(match kind {
            Nil => LiteralData::Nil,
            True => LiteralData::Bool(true),
            False => LiteralData::Bool(false),
            Str(ref s) => LiteralData::StringLit(s.clone()),
            Num(n) => LiteralData::Number(n.clone()),
            _ => return None,
        })
    }
}

// They are convenient for writing tests.
impl From<f64> for LiteralData {
    fn from(item: f64) -> Self {
        LiteralData::Number(item)
    }
}

impl From<String> for LiteralData {
    fn from(item: String) -> Self {
        LiteralData::StringLit(item)
    }
}

impl From<bool> for LiteralData {
    fn from(item: bool) -> Self {
        LiteralData::Bool(item)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryData {
    pub oper: UnaryOper,
    pub expr: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UnaryOper {
    Not,
    Minus,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryData {
    pub left: Expr,
    pub oper: BinaryOper,
    pub right: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BinaryOper {
    Minus,
    Plus,
    Div,
    Mul,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl From<TokenKind> for Option<BinaryOper> {
    fn from(item: TokenKind) -> Self {
        use TokenKind::*;
        Some(match item {
            Minus => BinaryOper::Minus,
            Plus => BinaryOper::Plus,
            Star => BinaryOper::Mul,
            Slash => BinaryOper::Div,
            EqEq => BinaryOper::Equal,
            BangEq => BinaryOper::NotEqual,
            Less => BinaryOper::Less,
            LessEq => BinaryOper::LessEqual,
            Greater => BinaryOper::Greater,
            GreaterEq => BinaryOper::GreaterEqual,
            _ => return None,
        })
    }
}

/// `and` or `or`, distinct from `BinaryData` for short-circuit semantics
#[derive(Clone, Debug, PartialEq)]
pub struct LogicData {
    pub left: Expr,
    pub oper: LogicOper,
    pub right: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LogicOper {
    Or,
    And,
}

impl From<TokenKind> for Option<LogicOper> {
    fn from(item: TokenKind) -> Self {
        use TokenKind::*;
        match item {
            Or => Some(LogicOper::Or),
            And => Some(LogicOper::And),
            _ => None,
        }
    }
}

/// `()`
#[derive(Clone, Debug, PartialEq)]
pub struct GroupData {
    pub expr: Expr,
}

/// Enables to track each variable use. It's required by the `Resolver`.
///
/// Source positions would also work, but the AST doesn't track them, so an
/// ID is embedded instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VarUseId {
    id: usize,
}

/// Creates new IDs
pub struct VarUseIdCounter {
    id: usize,
}

impl VarUseIdCounter {
    pub fn new() -> Self {
        Self { id: 0 }
    }

    pub fn next(&mut self) -> VarUseId {
        self.id += 1;
        VarUseId { id: self.id - 1 }
    }
}

/// Represents a variable use
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VarUseData {
    pub name: String,
    /// Unique identity of each variable use
    pub id: VarUseId,
}

impl VarUseData {
    pub fn new(name: &str, id: VarUseId) -> Self {
        Self {
            name: name.to_string(),
            id: id,
        }
    }
}

/// `=`
///
/// It doesn't contain the LHS object; that is looked up in an `Env`.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignData {
    pub assigned: VarUseData,
    pub expr: Expr,
}

pub type Args = Vec<Expr>;

#[derive(Clone, Debug, PartialEq)]
pub struct CallData {
    pub callee: Expr,
    pub args: Args,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GetUseData {
    pub body: Expr,
    pub name: String,
}

impl GetUseData {
    pub fn new(body: Expr, name: &str) -> Self {
        Self {
            body: body,
            name: name.to_string(),
        }
    }
}

/// Similar to an assignment, but writes through to an instance field
#[derive(Clone, Debug, PartialEq)]
pub struct SetUseData {
    pub body: Expr,
    pub name: String,
    pub value: Expr,
}

impl SetUseData {
    pub fn new(body: Expr, name: &str, value: Expr) -> Self {
        Self {
            body: body,
            name: name.to_string(),
            value: value,
        }
    }
}

/// `super.method`, e.g. in an overriding method
///
/// The `keyword` use site resolves to the implicit scope where the
/// superclass is bound; `this` is looked up one scope below it.
#[derive(Clone, Debug, PartialEq)]
pub struct SuperUseData {
    pub keyword: VarUseData,
    pub method: String,
}
