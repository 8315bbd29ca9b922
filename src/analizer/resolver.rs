//! Static variable resolution
//!
//! Walks the AST recording, for every variable use site, the number of
//! scopes between the use and the declaration. The interpreter then looks
//! locals up by distance instead of searching by name, which is what makes
//! closures and methods copied out of instances behave correctly.
//!
//! Top-level (global) bindings are not tracked; a use that matches no local
//! scope is assumed to be global.

use ::std::collections::HashMap;

use crate::analizer::{Result, SemanticError};
use crate::ast::{expr::*, stmt::*, ExprVisitor, StmtVisitor};

/// Tracks what kind of function body we are currently resolving
#[derive(Clone, Copy, Debug)]
enum FnKind {
    None,
    Function,
    Method,
    /// A method named exactly `init`
    Initializer,
}

#[derive(Clone, Copy, Debug)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

pub struct Resolver<'a> {
    /// Maps each local variable use to the distance to the scope it's in.
    /// Owned by the interpreter; shared so that resolution survives this
    /// pass.
    caches: &'a mut HashMap<VarUseData, usize>,
    /// Innermost scope last. The `bool` is false while the name is declared
    /// but its initializer is not finished yet.
    scopes: Vec<HashMap<String, bool>>,
    current_fn: FnKind,
    current_class: ClassKind,
}

impl<'a> Resolver<'a> {
    pub fn new(caches: &'a mut HashMap<VarUseData, usize>) -> Self {
        Self {
            caches: caches,
            scopes: Vec::new(),
            current_fn: FnKind::None,
            current_class: ClassKind::None,
        }
    }

    pub fn resolve_stmts(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            self.resolve_stmt(stmt)?;
        }
        Ok(())
    }

    /// Implemented with Visitor pattern
    fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        self.visit_stmt(stmt)
    }

    fn resolve_expr(&mut self, expr: &Expr) -> Result<()> {
        self.visit_expr(expr)
    }

    // Lexical scopes nest in both the interpreter and the resolver. The
    // interpreter implements the stack with a chain of `Env`s; here a
    // vector is enough.
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Adds the name to the innermost scope, not yet usable. Duplicate
    /// declarations in one local scope are rejected; the global scope is
    /// not tracked and allows redefinition.
    fn declare(&mut self, name: &str) -> Result<()> {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(name) {
                return Err(SemanticError::AlreadyDeclared(name.to_string()));
            }
            scope.insert(name.to_string(), false);
        }
        Ok(())
    }

    /// Marks the name as fully initialized and usable. Also used for the
    /// implicit `this` / `super` bindings, which have no declaration.
    fn define(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    /// Records the scope distance of a use site. Starts at the innermost
    /// scope and stops at the first match; no match means the use is
    /// global and stays out of the cache.
    fn resolve_local(&mut self, var: &VarUseData) {
        for (i, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&var.name) {
                self.caches.insert(var.clone(), i);
                return;
            }
        }
    }

    /// Resolves a function body right away, unlike the interpreter which
    /// defers bodies until the call
    fn resolve_fn(&mut self, f: &FnDeclArgs, kind: FnKind) -> Result<()> {
        let enclosing = self.current_fn;
        self.current_fn = kind;

        self.begin_scope();
        for param in f.params.iter() {
            self.declare(param)?;
            self.define(param);
        }
        self.resolve_stmts(&f.body)?;
        self.end_scope();

        self.current_fn = enclosing;
        Ok(())
    }
}

impl<'a> StmtVisitor<Result<()>> for Resolver<'a> {
    fn visit_var_decl(&mut self, var: &VarDeclArgs) -> Result<()> {
        // declaring and defining are split so that the initializer can be
        // checked for reading the name it is about to bind
        self.declare(&var.name)?;
        self.resolve_expr(&var.init)?;
        self.define(&var.name);
        Ok(())
    }

    fn visit_expr_stmt(&mut self, expr: &Expr) -> Result<()> {
        self.resolve_expr(expr)
    }

    fn visit_print_stmt(&mut self, print: &PrintArgs) -> Result<()> {
        self.resolve_expr(&print.expr)
    }

    fn visit_if_stmt(&mut self, if_: &IfArgs) -> Result<()> {
        self.resolve_expr(&if_.condition)?;
        self.resolve_stmt(&if_.if_true)?;
        if let Some(ref if_false) = if_.if_false {
            self.resolve_stmt(if_false)?;
        }
        Ok(())
    }

    fn visit_block_stmt(&mut self, stmts: &[Stmt]) -> Result<()> {
        self.begin_scope();
        self.resolve_stmts(stmts)?;
        self.end_scope();
        Ok(())
    }

    fn visit_return_stmt(&mut self, ret: &Return) -> Result<()> {
        match self.current_fn {
            FnKind::None => return Err(SemanticError::ReturnOutsideFunction),
            FnKind::Initializer => {
                // a bare `return;` is parsed as `return nil;` and allowed;
                // anything else would smuggle a value out of `init`
                if ret.expr != Expr::Literal(LiteralData::Nil) {
                    return Err(SemanticError::ReturnValueFromInitializer);
                }
            }
            _ => {}
        }
        self.resolve_expr(&ret.expr)
    }

    fn visit_while_stmt(&mut self, while_: &WhileArgs) -> Result<()> {
        self.resolve_expr(&while_.condition)?;
        self.resolve_stmt(&while_.body)
    }

    fn visit_fn_decl(&mut self, f: &FnDeclArgs) -> Result<()> {
        // the name is defined eagerly so the function can recurse
        self.declare(&f.name)?;
        self.define(&f.name);
        self.resolve_fn(f, FnKind::Function)
    }

    fn visit_class_decl(&mut self, c: &ClassDeclArgs) -> Result<()> {
        let enclosing = self.current_class;
        self.current_class = if c.superclass.is_some() {
            ClassKind::Subclass
        } else {
            ClassKind::Class
        };

        self.declare(&c.name)?;
        self.define(&c.name);

        if let Some(ref sup) = c.superclass {
            self.resolve_local(sup);
            // implicit scope carrying `super` around all methods
            self.begin_scope();
            self.define("super");
        }

        // implicit scope carrying `this` just outside each method body
        self.begin_scope();
        self.define("this");

        for method in c.methods.iter() {
            let kind = if method.name == "init" {
                FnKind::Initializer
            } else {
                FnKind::Method
            };
            self.resolve_fn(method, kind)?;
        }

        self.end_scope();
        if c.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing;
        Ok(())
    }
}

impl<'a> ExprVisitor<Result<()>> for Resolver<'a> {
    fn visit_literal_expr(&mut self, _literal: &LiteralData) -> Result<()> {
        Ok(())
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> Result<()> {
        self.resolve_expr(&unary.expr)
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) -> Result<()> {
        self.resolve_expr(&binary.left)?;
        self.resolve_expr(&binary.right)
    }

    // static analysis does no short-circuiting
    fn visit_logic_expr(&mut self, logic: &LogicData) -> Result<()> {
        self.resolve_expr(&logic.left)?;
        self.resolve_expr(&logic.right)
    }

    fn visit_var_expr(&mut self, var: &VarUseData) -> Result<()> {
        if let Some(scope) = self.scopes.last() {
            if scope.get(&var.name) == Some(&false) {
                return Err(SemanticError::SelfReferencingInitializer(var.name.clone()));
            }
        }
        self.resolve_local(var);
        Ok(())
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> Result<()> {
        // the assigned value may itself refer to variables
        self.resolve_expr(&assign.expr)?;
        self.resolve_local(&assign.assigned);
        Ok(())
    }

    fn visit_call_expr(&mut self, call: &CallData) -> Result<()> {
        self.resolve_expr(&call.callee)?;
        for arg in call.args.iter() {
            self.resolve_expr(arg)?;
        }
        Ok(())
    }

    // property names are looked up dynamically; only the receiver resolves
    fn visit_get_expr(&mut self, get: &GetUseData) -> Result<()> {
        self.resolve_expr(&get.body)
    }

    fn visit_set_expr(&mut self, set: &SetUseData) -> Result<()> {
        self.resolve_expr(&set.value)?;
        self.resolve_expr(&set.body)
    }

    fn visit_this_expr(&mut self, this: &VarUseData) -> Result<()> {
        if let ClassKind::None = self.current_class {
            return Err(SemanticError::ThisOutsideClass);
        }
        self.resolve_local(this);
        Ok(())
    }

    fn visit_super_expr(&mut self, sup: &SuperUseData) -> Result<()> {
        match self.current_class {
            ClassKind::Subclass => {
                self.resolve_local(&sup.keyword);
                Ok(())
            }
            _ => Err(SemanticError::SuperOutsideSubclass),
        }
    }
}
