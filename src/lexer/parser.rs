//! Creates an AST from a token stream
//!
//! We just need to peek one `Token` at a time

use crate::ast::expr::*;
use crate::ast::stmt::*;
use crate::lexer::token::*;
use std::iter::Peekable;
use std::rc::Rc;
use thiserror::Error;

// --------------------------------------------------------------------------------
// Errors

type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("ParseError: Unexpected end of file.")]
    UnexpectedEof,
    #[error("ParseError: {0}")]
    UnexpectedToken(UnexpectedTokenErrorArgs),
    #[error("ParseError: Invalid assignment target.")]
    NotAssignable(Expr),
}

impl ParseError {
    pub fn unexpected(found: &Token, expected: &[TokenKind]) -> Self {
        ParseError::UnexpectedToken(UnexpectedTokenErrorArgs::from_token(found, expected))
    }

    pub fn eof() -> Self {
        ParseError::UnexpectedEof
    }
}

#[derive(Debug, Clone)]
pub struct UnexpectedTokenErrorArgs {
    pos: Location,
    expected: Vec<TokenKind>,
    found: TokenKind,
}

impl UnexpectedTokenErrorArgs {
    pub fn from_token(tk: &Token, expected: &[TokenKind]) -> Self {
        UnexpectedTokenErrorArgs {
            pos: tk.pos,
            expected: expected.iter().cloned().collect(),
            found: tk.kind.clone(),
        }
    }
}

use std::fmt;
impl fmt::Display for UnexpectedTokenErrorArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expected one of {:?}, found {:?} at {}:{}.",
            self.expected,
            self.found,
            self.pos.ln(),
            self.pos.col()
        )
    }
}

// --------------------------------------------------------------------------------
// Parser

pub struct Parser<'a, I>
where
    I: Iterator<Item = &'a Token> + Sized,
{
    tks: Peekable<I>,
    counter: VarUseIdCounter,
}

impl<'a> Parser<'a, std::slice::Iter<'a, Token>> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            tks: tokens.iter().peekable(),
            counter: VarUseIdCounter::new(),
        }
    }
}

/// Iterator methods around `Peekable<I>`
impl<'a, I> Parser<'a, I>
where
    I: Iterator<Item = &'a Token> + Sized,
{
    fn peek(&mut self) -> Option<&&Token> {
        self.tks.peek()
    }

    fn next(&mut self) -> Option<&Token> {
        self.tks.next()
    }

    fn advance(&mut self) -> bool {
        self.tks.next().is_some()
    }

    /// Peek or else error
    fn try_peek(&mut self) -> Result<&&Token> {
        self.peek().ok_or(ParseError::eof())
    }

    /// Just a wrapper around `Iterator::find`.
    fn _find(tk: &Token, expected: &[TokenKind]) -> Option<TokenKind> {
        expected.iter().find(|t| t == &&tk.kind).map(|t| t.clone())
    }

    /// Safely tries to advance the token iterator
    fn consume(&mut self, expected: &TokenKind) -> Option<&Token> {
        match self.peek() {
            Some(tk) if tk.kind == *expected => Some(self.next().unwrap()),
            _ => None,
        }
    }

    /// Tries to consume the expected token or cause an error
    fn try_consume(&mut self, expected: &TokenKind) -> Result<&Token> {
        match self.peek() {
            Some(tk) if tk.kind == *expected => Ok(self.next().unwrap()),
            Some(tk) => Err(ParseError::unexpected(tk, &[expected.clone()])),
            None => Err(ParseError::eof()),
        }
    }

    fn try_consume_identifier(&mut self) -> Result<String> {
        if let Some(tk) = self.peek() {
            if let TokenKind::Ident(ref name) = tk.kind {
                let name = name.clone();
                self.advance();
                Ok(name)
            } else {
                Err(ParseError::unexpected(tk, &[TokenKind::Ident("".into())]))
            }
        } else {
            Err(ParseError::eof())
        }
    }

    // cannot identify tokens with fields
    fn consume_one_of(&mut self, expected: &[TokenKind]) -> Option<TokenKind> {
        let opt = Self::_find(self.peek()?, expected);
        if opt.is_some() {
            self.next();
        }
        opt
    }
}

/// Statement / declaration parsing
impl<'a, I> Parser<'a, I>
where
    I: Iterator<Item = &'a Token> + Sized,
{
    /// program → decl* EOF ;
    ///
    /// The entry point of the predictive parsing.
    pub fn parse(&mut self) -> (Vec<Stmt>, Vec<ParseError>) {
        let mut stmts = Vec::<Stmt>::new();
        let mut errors = Vec::<ParseError>::new();

        while let Some(tk) = self.decl() {
            match tk {
                Ok(stmt) => stmts.push(stmt),
                Err(why) => {
                    errors.push(why);
                    self.synchronize();
                }
            }
        }

        return (stmts, errors);
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            match self.try_peek()?.kind {
                TokenKind::RightBrace => {
                    self.advance();
                    break;
                }
                _ => {
                    let stmt = self
                        .decl()
                        .unwrap_or_else(|| Err(ParseError::UnexpectedEof))?;
                    stmts.push(stmt);
                }
            };
        }
        Ok(stmts)
    }

    /// Enters "panic mode" and tries to go to next statement.
    ///
    /// It goes to a next semicolon or declaration keyword.
    fn synchronize(&mut self) {
        while let Some(tk) = self.peek() {
            let result = SyncPeekChecker::check_token(&tk.kind);
            if result.needs_advance {
                self.next();
            }
            if result.ends {
                break;
            }
        }
    }

    /// decl → declClass | declFn | declVar | stmt ;
    ///
    /// The root of parsing.
    fn decl(&mut self) -> Option<Result<Stmt>> {
        Some(match self.peek()?.kind {
            TokenKind::Class => {
                self.advance();
                self.decl_class().map(|c| Stmt::Class(c))
            }
            TokenKind::Fun => {
                self.advance();
                self.decl_fn().map(|f| Stmt::Fn(f))
            }
            TokenKind::Var => {
                self.advance();
                self.decl_var()
            }
            _ => self.stmt(),
        })
    }

    /// declClass → "class" IDENTIFIER ( "<" IDENTIFIER )? "{" method* "}" ;
    ///
    /// Methods use the function rule without a leading `fun`.
    fn decl_class(&mut self) -> Result<ClassDeclArgs> {
        let name = self.try_consume_identifier()?;

        let superclass = if self.consume(&TokenKind::Less).is_some() {
            let sup = self.try_consume_identifier()?;
            Some(VarUseData::new(&sup, self.counter.next()))
        } else {
            None
        };

        self.try_consume(&TokenKind::LeftBrace)?;
        let mut methods = Vec::new();
        while self.try_peek()?.kind != TokenKind::RightBrace {
            let method = self.decl_fn()?;
            methods.push(method);
        }
        self.try_consume(&TokenKind::RightBrace)?;

        Ok(ClassDeclArgs::new(name, superclass, methods))
    }

    /// declFn → IDENTIFIER "(" params? ")" block ;
    ///
    /// Call it after consuming `fun` (or directly for methods).
    fn decl_fn(&mut self) -> Result<FnDeclArgs> {
        let name = self.try_consume_identifier()?;

        self.try_consume(&TokenKind::LeftParen)?;
        let params = match self.try_peek()?.kind {
            TokenKind::RightParen => Vec::new(),
            _ => self.params()?,
        };
        self.try_consume(&TokenKind::RightParen)?;

        // we must first consume `{` to parse a block
        self.try_consume(&TokenKind::LeftBrace)?;
        let body = self.parse_block()?;

        Ok(FnDeclArgs::new(name, params, Rc::new(body)))
    }

    /// params → IDENTIFIER ( "," IDENTIFIER )* ;
    fn params(&mut self) -> Result<Params> {
        let mut params = Vec::new();
        params.push(self.try_consume_identifier()?);
        while self.consume(&TokenKind::Comma).is_some() {
            params.push(self.try_consume_identifier()?);
        }
        Ok(params)
    }

    /// declVar → "var" IDENTIFIER ( "=" expression )? ";" ;
    ///
    /// An omitted initializer defaults to `nil`. Call it after consuming
    /// `var`.
    fn decl_var(&mut self) -> Result<Stmt> {
        let name = self.try_consume_identifier()?;
        let init = if self.consume(&TokenKind::Eq).is_some() {
            self.expr()?
        } else {
            Expr::literal(LiteralData::Nil)
        };
        self.try_consume(&TokenKind::Semicolon)?;
        Ok(Stmt::var_decl(name, init))
    }

    /// stmt → exprStmt | printStmt | ifStmt | returnStmt | whileStmt
    ///       | forStmt | block ;
    ///
    /// The root of predictive statement parsing. Sub rules are named as
    /// `stmt_xxx`. Note that sub rules don't consume unexpected tokens.
    pub fn stmt(&mut self) -> Result<Stmt> {
        use TokenKind::*;
        match &self.try_peek()?.kind {
            Print => {
                self.next();
                self.stmt_print()
            }
            LeftBrace => {
                self.next();
                Ok(self.stmt_block()?.into_stmt())
            }
            If => {
                self.next();
                self.stmt_if()
            }
            Return => {
                self.next();
                self.stmt_return()
            }
            While => {
                self.next();
                self.stmt_while()
            }
            For => {
                self.next();
                self.stmt_for()
            }
            _ => self.stmt_expr(),
        }
    }

    /// printStmt → "print" expression ";" ;
    ///
    /// To be called after consuming `print` (predictive parsing).
    fn stmt_print(&mut self) -> Result<Stmt> {
        let expr = self.expr()?;
        self.try_consume(&TokenKind::Semicolon)?;
        Ok(Stmt::print(expr))
    }

    /// block → "{" declaration* "}" ;
    ///
    /// Left brace `{` must be consumed before calling this.
    pub fn stmt_block(&mut self) -> Result<BlockArgs> {
        Ok(BlockArgs {
            stmts: self.parse_block()?,
        })
    }

    /// ifStmt → "if" "(" expression ")" statement ( "else" statement )? ;
    fn stmt_if(&mut self) -> Result<Stmt> {
        self.try_consume(&TokenKind::LeftParen)?;
        let condition = self.expr()?;
        self.try_consume(&TokenKind::RightParen)?;

        let if_true = self.stmt()?;
        let if_false = if self.consume(&TokenKind::Else).is_some() {
            Some(self.stmt()?)
        } else {
            None
        };

        Ok(Stmt::if_then_else(condition, if_true, if_false))
    }

    /// returnStmt → "return" expression? ";" ;
    ///
    /// An omitted value defaults to `nil`.
    fn stmt_return(&mut self) -> Result<Stmt> {
        let expr = match self.try_peek()?.kind {
            TokenKind::Semicolon => Expr::literal(LiteralData::Nil),
            _ => self.expr()?,
        };
        self.try_consume(&TokenKind::Semicolon)?;
        Ok(Stmt::return_(expr))
    }

    /// whileStmt → "while" "(" expression ")" statement ;
    fn stmt_while(&mut self) -> Result<Stmt> {
        self.try_consume(&TokenKind::LeftParen)?;
        let condition = self.expr()?;
        self.try_consume(&TokenKind::RightParen)?;
        let body = self.stmt()?;
        Ok(Stmt::while_(condition, body))
    }

    /// forStmt → "for" "(" ( declVar | exprStmt | ";" ) expression? ";"
    ///           expression? ")" statement ;
    ///
    /// Lowered right here to `Block` and `While` nodes; the runtime never
    /// sees a `for` loop.
    fn stmt_for(&mut self) -> Result<Stmt> {
        self.try_consume(&TokenKind::LeftParen)?;

        let init = match self.try_peek()?.kind {
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            TokenKind::Var => {
                self.advance();
                Some(self.decl_var()?)
            }
            _ => Some(self.stmt_expr()?),
        };

        let condition = match self.try_peek()?.kind {
            TokenKind::Semicolon => Expr::literal(LiteralData::Bool(true)),
            _ => self.expr()?,
        };
        self.try_consume(&TokenKind::Semicolon)?;

        let increment = match self.try_peek()?.kind {
            TokenKind::RightParen => None,
            _ => Some(self.expr()?),
        };
        self.try_consume(&TokenKind::RightParen)?;

        let mut body = self.stmt()?;
        if let Some(inc) = increment {
            body = Stmt::block(vec![body, Stmt::expr(inc)]);
        }
        body = Stmt::while_(condition, body);
        if let Some(init) = init {
            body = Stmt::block(vec![init, body]);
        }
        Ok(body)
    }

    /// Expression statement
    fn stmt_expr(&mut self) -> Result<Stmt> {
        let expr = self.expr()?;
        self.try_consume(&TokenKind::Semicolon)?;
        Ok(Stmt::expr(expr))
    }
}

/// Expression parsing
impl<'a, I> Parser<'a, I>
where
    I: Iterator<Item = &'a Token> + Sized,
{
    /// rrp → Subrule (Oper Subrule)*
    ///
    /// Abstracts right recursive parsing.
    #[inline]
    fn rrp<Oper, SubRule, Folder>(
        &mut self,
        sub_rule: SubRule,
        delimiters: &[TokenKind],
        folder: Folder,
    ) -> Result<Expr>
    where
        TokenKind: Into<Option<Oper>>,
        SubRule: Fn(&mut Self) -> Result<Expr>,
        Folder: Fn(Expr, Oper, Expr) -> Expr,
    {
        let mut expr = sub_rule(self)?;
        while let Some(token) = self.consume_one_of(delimiters) {
            let right = sub_rule(self)?;
            let oper = token.into().unwrap();
            expr = folder(expr, oper, right);
        }
        Ok(expr)
    }

    /// expr → assignment
    pub fn expr(&mut self) -> Result<Expr> {
        self.expr_assign()
    }

    /// assignment → ( call "." )? IDENTIFIER "=" assignment
    ///            | logicOr ;
    fn expr_assign(&mut self) -> Result<Expr> {
        let lhs = self.expr_or()?;

        // peek to see if it's an assignment
        if self.consume(&TokenKind::Eq).is_none() {
            return Ok(lhs);
        };

        match lhs {
            // assign
            Expr::Variable(ref var) => {
                let rhs = self.expr_assign()?;
                Ok(Expr::assign(&var.name, rhs, self.counter.next()))
            }
            // set (assign to a get expression)
            Expr::Get(get) => {
                // e.g. x.y.z = 3;  // x, y are Expr::Get, z is Expr::Set
                let name = get.name.clone();
                let rhs = self.expr_assign()?;
                Ok(Expr::set(get.body, &name, rhs))
            }
            // error
            _ => Err(ParseError::NotAssignable(lhs)),
        }
    }

    /// logicOr → logicAnd ( "or" logicAnd )*
    fn expr_or(&mut self) -> Result<Expr> {
        self.rrp(&Self::expr_and, &[TokenKind::Or], &Expr::logic)
    }

    /// logicAnd → eq ( "and" eq )*
    fn expr_and(&mut self) -> Result<Expr> {
        self.rrp(&Self::expr_eq, &[TokenKind::And], &Expr::logic)
    }

    /// eq → cmp ( ( "!=" | "==" ) cmp )* ;
    fn expr_eq(&mut self) -> Result<Expr> {
        use TokenKind::*;
        self.rrp(&Self::expr_cmp, &[EqEq, BangEq], &Expr::binary)
    }

    /// cmp → add ( ( ">" | ">=" | "<" | "<=" ) add )* ;
    fn expr_cmp(&mut self) -> Result<Expr> {
        use TokenKind::*;
        self.rrp(
            &Self::expr_add,
            &[Greater, GreaterEq, Less, LessEq],
            &Expr::binary,
        )
    }

    /// add → mul ( ( "-" | "+" ) mul )* ;
    fn expr_add(&mut self) -> Result<Expr> {
        use TokenKind::*;
        self.rrp(&Self::expr_mul, &[Plus, Minus], &Expr::binary)
    }

    /// mul → unary ( ( "/" | "*" ) unary )* ;
    fn expr_mul(&mut self) -> Result<Expr> {
        use TokenKind::*;
        self.rrp(&Self::expr_unary, &[Slash, Star], &Expr::binary)
    }

    /// unary → ( "!" | "-" ) unary | call ;
    fn expr_unary(&mut self) -> Result<Expr> {
        use TokenKind::*;
        match self.try_peek()?.kind {
            Bang => {
                self.advance();
                Ok(Expr::unary(UnaryOper::Not, self.expr_unary()?))
            }
            Minus => {
                self.advance();
                Ok(Expr::unary(UnaryOper::Minus, self.expr_unary()?))
            }
            _ => self.expr_call(),
        }
    }

    /// call → primary ( invoke | prop )* ;
    fn expr_call(&mut self) -> Result<Expr> {
        let mut expr = self.expr_prim()?;

        loop {
            match self.peek().map(|tk| tk.kind.clone()) {
                Some(TokenKind::LeftParen) => {
                    // invoke → "(" args? ")"
                    self.advance();
                    let args = if self.try_peek()?.kind == TokenKind::RightParen {
                        self.advance();
                        Vec::new()
                    } else {
                        self.expr_call_args()?
                    };
                    expr = Expr::call(expr, args);
                }

                Some(TokenKind::Dot) => {
                    self.advance();
                    let name = self.try_consume_identifier()?;
                    expr = Expr::get(expr, &name);
                }

                _ => {
                    return Ok(expr);
                }
            }
        }
    }

    /// args → expr ( "," expr )* ")" ;
    fn expr_call_args(&mut self) -> Result<Args> {
        let mut args = Args::new();
        args.push(self.expr()?);
        loop {
            match self.try_peek()? {
                tk if tk.kind == TokenKind::Comma => {
                    self.advance();
                    args.push(self.expr()?);
                }
                tk if tk.kind == TokenKind::RightParen => {
                    self.advance();
                    return Ok(args);
                }
                tk => {
                    return Err(ParseError::unexpected(
                        tk,
                        &[TokenKind::Comma, TokenKind::RightParen],
                    ));
                }
            }
        }
    }

    /// primary → literal | group | identifier | "this" | "super" "." IDENTIFIER ;
    ///
    /// literal → NUMBER | STRING | "false" | "true" | "nil" ;
    /// group   → "(" expression ")" ;
    ///
    /// Make sure that there exists a next token (predictive parsing).
    fn expr_prim(&mut self) -> Result<Expr> {
        let tk = self.try_peek()?;
        use TokenKind::*;
        match tk.kind {
            Ident(ref name) => {
                let name = name.clone();
                self.advance();
                Ok(Expr::var(&name, self.counter.next()))
            }
            LeftParen => {
                self.advance();
                self.expr_group()
            }
            This => {
                self.advance();
                Ok(Expr::this(self.counter.next()))
            }
            Super => {
                self.advance();
                self.try_consume(&TokenKind::Dot)?;
                let method = self.try_consume_identifier()?;
                Ok(Expr::super_(&method, self.counter.next()))
            }
            _ => {
                if let Some(literal) = LiteralData::from_token(&tk.kind) {
                    self.advance();
                    return Ok(literal.into());
                }
                Err(ParseError::unexpected(
                    tk,
                    &[Num(0.0), Str("".into()), False, True, Nil, LeftParen],
                ))
            }
        }
    }

    /// group → "(" expression ")" ;
    ///
    /// To be called after consuming "(" (predictive parsing).
    fn expr_group(&mut self) -> Result<Expr> {
        let expr = self.expr()?;
        self.try_consume(&TokenKind::RightParen)?;
        Ok(Expr::group(expr))
    }
}

/// This is for panic mode (synchronizing)
struct SyncPeekChecker {
    pub needs_advance: bool,
    pub ends: bool,
}

use std::borrow::Borrow;
impl SyncPeekChecker {
    pub fn check_token<T: Borrow<TokenKind>>(token: T) -> Self {
        use TokenKind::*;
        match token.borrow() {
            Class | Fun | Var | If | For | While | Print | Return => Self {
                needs_advance: false,
                ends: true,
            },
            Semicolon => Self {
                needs_advance: true,
                ends: true,
            },
            _ => Self {
                needs_advance: true,
                ends: false,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ast::PrettyPrint;
    use crate::lexer::scanner::Scanner;

    fn parse(src: &str) -> Vec<Stmt> {
        let (tks, scan_errs) = Scanner::new(src).scan();
        assert!(scan_errs.is_empty(), "scan errors: {:?}", scan_errs);
        let (stmts, errs) = Parser::new(&tks).parse();
        assert!(errs.is_empty(), "parse errors: {:?}", errs);
        stmts
    }

    fn parse_one(src: &str) -> Stmt {
        let mut stmts = parse(src);
        assert_eq!(stmts.len(), 1);
        stmts.remove(0)
    }

    #[test]
    fn precedence() {
        assert_eq!(
            parse_one("print 1 + 2 * 3;").pretty_print(),
            "(print (+ 1 (* 2 3)))"
        );
    }

    #[test]
    fn var_without_initializer_defaults_to_nil() {
        assert_eq!(parse_one("var a;").pretty_print(), "(var a nil)");
    }

    #[test]
    fn for_loop_is_lowered_to_while() {
        let stmt = parse_one("for (var i = 0; i < 3; i = i + 1) print i;");
        assert_eq!(
            stmt.pretty_print(),
            "(block (var i 0) (while (< i 3) (block (print i) (expr (= i (+ i 1))))))"
        );
    }

    #[test]
    fn for_loop_without_clauses_runs_forever() {
        assert_eq!(
            parse_one("for (;;) print 1;").pretty_print(),
            "(while true (print 1))"
        );
    }

    #[test]
    fn assignment_to_property_is_a_set() {
        assert_eq!(
            parse_one("a.b.c = 1;").pretty_print(),
            "(expr (.c= (.b a) 1))"
        );
    }

    #[test]
    fn class_declaration_with_superclass() {
        assert_eq!(
            parse_one("class B < A { m(x) { return x; } }").pretty_print(),
            "(class B (< A) (fun m (x) (return x)))"
        );
    }

    #[test]
    fn literal_is_not_an_assignment_target() {
        let (tks, _) = Scanner::new("1 = 2;").scan();
        let (_, errs) = Parser::new(&tks).parse();
        assert!(matches!(errs[0], ParseError::NotAssignable(_)));
    }
}
