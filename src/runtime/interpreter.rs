//! The tree-walk evaluator
//!
//! Statement visitors return `Result<Option<LoxObj>>`: `Some` is the
//! non-local `return` signal travelling up to the nearest call frame,
//! where it turns back into a plain value. Errors unwind all the way out.

use ::std::cell::RefCell;
use ::std::collections::HashMap;
use ::std::rc::Rc;
use ::std::time::{SystemTime, UNIX_EPOCH};

use log::trace;

use crate::ast::expr::*;
use crate::ast::stmt::*;
use crate::ast::{ExprVisitor, StmtVisitor};
use crate::runtime::env::Env;
use crate::runtime::{
    obj::{LoxClass, LoxFn, LoxInstance, LoxObj, LoxUserFn, LoxValue},
    Result, RuntimeError,
};

const MSG_NUM_OPERAND: &str = "Operand must be a number.";
const MSG_NUM_OPERANDS: &str = "Operands must be numbers.";
const MSG_ADD_OPERANDS: &str = "Operands must be two numbers or two strings.";

/// Lox recursion eats host stack, so calls deeper than this fail with
/// `StackOverflow`. Adjustable via `Interpreter::with_max_call_depth`.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 255;

/// Creates a global environment seeded with the native functions
pub fn new_globals() -> Rc<RefCell<Env>> {
    let mut env = Env::new();
    env.define("clock", LoxObj::Callable(LoxFn::Clock));
    Rc::new(RefCell::new(env))
}

pub struct Interpreter {
    /// Points at the global `Env`
    globals: Rc<RefCell<Env>>,
    /// The scope evaluation currently happens in
    pub env: Rc<RefCell<Env>>,
    /// Maps each identifier use in local scope to the distance to the
    /// scope it's in. Filled by the `Resolver`.
    pub caches: HashMap<VarUseData, usize>,
    /// Lox call frames currently on the host stack
    call_depth: usize,
    max_call_depth: usize,
    /// Print output capture; stdout when `None`
    sink: Option<Rc<RefCell<Vec<String>>>>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_globals(self::new_globals())
    }

    pub fn with_globals(globals: Rc<RefCell<Env>>) -> Self {
        let env = Rc::clone(&globals);
        Self {
            globals: globals,
            env: env,
            caches: HashMap::new(),
            call_depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            sink: None,
        }
    }

    pub fn with_max_call_depth(max_call_depth: usize) -> Self {
        let mut me = Self::new();
        me.max_call_depth = max_call_depth;
        me
    }

    /// Redirects `print` output into the given buffer. Tests assert on the
    /// buffer instead of process stdout.
    pub fn capture_prints(&mut self, sink: Rc<RefCell<Vec<String>>>) {
        self.sink = Some(sink);
    }

    fn print_obj(&mut self, obj: &LoxObj) {
        match self.sink {
            Some(ref sink) => sink.borrow_mut().push(format!("{}", obj)),
            None => println!("{}", obj),
        }
    }
}

/// Capabilities provided by `Resolver`
impl Interpreter {
    /// Reads a variable through its resolved distance; uses not in the
    /// cache are global
    fn lookup_resolved(&self, var: &VarUseData) -> Result<LoxObj> {
        if let Some(distance) = self.caches.get(var) {
            self.env.borrow().get_resolved(&var.name, distance.clone())
        } else {
            self.globals.borrow().get(&var.name)
        }
    }

    /// Writes a variable through its resolved distance
    fn assign_resolved(&mut self, var: &VarUseData, obj: LoxObj) -> Result<()> {
        if let Some(distance) = self.caches.get(var) {
            self.env
                .borrow_mut()
                .assign_resolved(&var.name, distance.clone(), obj)
        } else {
            self.globals.borrow_mut().assign(&var.name, obj)
        }
    }
}

impl Interpreter {
    /// Runs a whole program. Statements produce no values; a top-level
    /// `return` is rejected by the resolver before we get here.
    pub fn execute(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            self.interpret(stmt)?;
        }
        Ok(())
    }

    /// The entry point of statement interpretation
    pub fn interpret(&mut self, stmt: &Stmt) -> Result<Option<LoxObj>> {
        self.visit_stmt(stmt)
    }

    /// Interprets a block of statements, stopping early on `return`
    fn interpret_stmts(&mut self, stmts: &[Stmt]) -> Result<Option<LoxObj>> {
        for stmt in stmts.iter() {
            if let Some(obj) = self.interpret(stmt)? {
                return Ok(Some(obj));
            }
        }
        Ok(None)
    }

    /// Interprets a block in a scope
    fn interpret_stmts_with_scope(&mut self, stmts: &[Stmt], scope: Env) -> Result<Option<LoxObj>> {
        let prev = Rc::clone(&self.env);
        self.env = Rc::new(RefCell::new(scope));
        let result = self.interpret_stmts(stmts);
        self.env = prev;
        result
    }

    /// Invokes a given function object (native or user-defined) with
    /// already-evaluated arguments
    pub fn invoke(&mut self, fn_obj: &LoxFn, args: &[LoxObj]) -> Result<LoxObj> {
        match fn_obj {
            LoxFn::User(ref def) => self.invoke_user_fn(def, args),
            LoxFn::Clock => {
                Self::ensure_arity(0, args.len())?;
                Ok(LoxObj::Value(LoxValue::Number(self.native_clock())))
            }
        }
    }

    pub fn invoke_user_fn(&mut self, def: &LoxUserFn, args: &[LoxObj]) -> Result<LoxObj> {
        Self::ensure_arity(def.params.len(), args.len())?;
        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeError::StackOverflow(self.max_call_depth));
        }
        trace!("invoking {} with {} args", def.name, args.len());

        // each call gets its own environment; otherwise recursion breaks
        let mut scope = Env::from_parent(&def.closure);
        for (param, arg) in def.params.iter().zip(args.iter()) {
            scope.define(param, arg.clone());
        }

        self.call_depth += 1;
        let result = self.interpret_stmts_with_scope(&def.body, scope);
        self.call_depth -= 1;

        let returned = result?;
        if def.is_initializer {
            // `init` always evaluates to the instance under construction,
            // even through an early `return;`
            return def.closure.borrow().get_resolved("this", 0);
        }
        Ok(returned.unwrap_or_else(LoxObj::nil))
    }

    /// Calling a class constructs an instance. A class without `init`
    /// takes no arguments.
    pub fn construct(&mut self, class: &Rc<LoxClass>, args: &[LoxObj]) -> Result<LoxObj> {
        let instance = Rc::new(RefCell::new(LoxInstance::new(class)));
        match class.find_method("init") {
            Some(init) => {
                self.invoke_user_fn(&init.bind(&instance), args)?;
            }
            None => Self::ensure_arity(0, args.len())?,
        }
        Ok(LoxObj::Instance(instance))
    }

    fn ensure_arity(expected: usize, got: usize) -> Result<()> {
        if expected != got {
            Err(RuntimeError::ArityMismatch {
                expected: expected,
                got: got,
            })
        } else {
            Ok(())
        }
    }

    /// Seconds since the Unix epoch
    fn native_clock(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the Unix epoch")
            .as_secs_f64()
    }
}

/// Implements statement interpretation via Visitor pattern
///
/// If something is returned, it's by `return` so we finish interpreting
impl StmtVisitor<Result<Option<LoxObj>>> for Interpreter {
    fn visit_expr_stmt(&mut self, expr: &Expr) -> Result<Option<LoxObj>> {
        self.eval_expr(expr)?;
        Ok(None)
    }

    fn visit_print_stmt(&mut self, print: &PrintArgs) -> Result<Option<LoxObj>> {
        let obj = self.eval_expr(&print.expr)?;
        self.print_obj(&obj);
        Ok(None)
    }

    fn visit_var_decl(&mut self, var: &VarDeclArgs) -> Result<Option<LoxObj>> {
        let obj = self.eval_expr(&var.init)?;
        self.env.borrow_mut().define(&var.name, obj);
        Ok(None)
    }

    fn visit_if_stmt(&mut self, if_: &IfArgs) -> Result<Option<LoxObj>> {
        if self.eval_expr(&if_.condition)?.is_truthy() {
            self.interpret(&if_.if_true)
        } else if let Some(if_false) = if_.if_false.as_ref() {
            self.interpret(if_false)
        } else {
            Ok(None)
        }
    }

    fn visit_block_stmt(&mut self, stmts: &[Stmt]) -> Result<Option<LoxObj>> {
        self.interpret_stmts_with_scope(stmts, Env::from_parent(&self.env))
    }

    fn visit_return_stmt(&mut self, ret: &Return) -> Result<Option<LoxObj>> {
        let obj = self.eval_expr(&ret.expr)?;
        Ok(Some(obj))
    }

    fn visit_while_stmt(&mut self, while_: &WhileArgs) -> Result<Option<LoxObj>> {
        while self.eval_expr(&while_.condition)?.is_truthy() {
            // a `return` inside the body must keep travelling up
            if let Some(obj) = self.interpret(&while_.body)? {
                return Ok(Some(obj));
            }
        }
        Ok(None)
    }

    fn visit_fn_decl(&mut self, f: &FnDeclArgs) -> Result<Option<LoxObj>> {
        let def = LoxUserFn::from_decl(f, &self.env, false);
        let obj = LoxObj::Callable(LoxFn::User(Rc::new(def)));
        self.env.borrow_mut().define(&f.name, obj);
        Ok(None)
    }

    fn visit_class_decl(&mut self, c: &ClassDeclArgs) -> Result<Option<LoxObj>> {
        let superclass = match c.superclass {
            Some(ref sup) => match self.lookup_resolved(sup)? {
                LoxObj::Class(class) => Some(class),
                _ => return Err(RuntimeError::SuperclassNotAClass),
            },
            None => None,
        };

        // defined before the methods are created so they can refer to the
        // class recursively
        self.env.borrow_mut().define(&c.name, LoxObj::nil());

        // methods of a subclass capture an extra scope binding `super`
        let method_env = match superclass {
            Some(ref sup) => {
                let scope = Rc::new(RefCell::new(Env::from_parent(&self.env)));
                scope
                    .borrow_mut()
                    .define("super", LoxObj::Class(Rc::clone(sup)));
                scope
            }
            None => Rc::clone(&self.env),
        };

        let mut methods = HashMap::<String, Rc<LoxUserFn>>::new();
        for method in c.methods.iter() {
            let f = LoxUserFn::from_decl(method, &method_env, method.name == "init");
            methods.insert(method.name.clone(), Rc::new(f));
        }

        let class = LoxClass {
            name: c.name.clone(),
            superclass: superclass,
            methods: methods,
        };
        self.env
            .borrow_mut()
            .assign(&c.name, LoxObj::Class(Rc::new(class)))?;
        Ok(None)
    }
}

pub trait EvalExpr {
    /// Dispatches a sub function to a specific Expr
    fn eval_expr(&mut self, expr: &Expr) -> Result<LoxObj>;
}

impl EvalExpr for Interpreter {
    fn eval_expr(&mut self, expr: &Expr) -> Result<LoxObj> {
        self.visit_expr(expr)
    }
}

mod logic {
    //! Operator implementations for specific LoxObj_s

    use crate::runtime::obj::{LoxObj, LoxValue};

    pub fn num_pair(left: &LoxObj, right: &LoxObj) -> Option<(f64, f64)> {
        match (left.as_num(), right.as_num()) {
            (Some(n1), Some(n2)) => Some((n1, n2)),
            _ => None,
        }
    }

    /// `+` adds numbers and concatenates strings; nothing else
    pub fn obj_plus(left: &LoxObj, right: &LoxObj) -> Option<LoxObj> {
        use LoxValue::*;
        Some(LoxObj::Value(match (left.as_value()?, right.as_value()?) {
            (Number(n1), Number(n2)) => Number(n1 + n2),
            (StringLit(s1), StringLit(s2)) => StringLit(format!("{}{}", s1, s2)),
            _ => return None,
        }))
    }
}

/// Visitors for implementing `eval_expr`
impl ExprVisitor<Result<LoxObj>> for Interpreter {
    fn visit_literal_expr(&mut self, lit: &LiteralData) -> Result<LoxObj> {
        Ok(LoxObj::from_lit(lit))
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> Result<LoxObj> {
        let obj = self.eval_expr(&unary.expr)?;
        use UnaryOper::*;
        match &unary.oper {
            Minus => {
                let n = obj
                    .as_num()
                    .ok_or(RuntimeError::TypeMismatch(MSG_NUM_OPERAND))?;
                Ok(LoxObj::Value(LoxValue::Number(-n)))
            }
            Not => Ok(LoxObj::bool(!obj.is_truthy())),
        }
    }

    /// `==`, `!=`, `<`, `<=`, `>`, `>=`, `+`, `-`, `*`, `/`
    fn visit_binary_expr(&mut self, binary: &BinaryData) -> Result<LoxObj> {
        use BinaryOper::*;

        let left = self.eval_expr(&binary.left)?;
        let right = self.eval_expr(&binary.right)?;

        match binary.oper {
            // equality is defined for every pair of values and never fails
            Equal => Ok(LoxObj::bool(left.equals(&right))),
            NotEqual => Ok(LoxObj::bool(!left.equals(&right))),

            Plus => logic::obj_plus(&left, &right)
                .ok_or(RuntimeError::TypeMismatch(MSG_ADD_OPERANDS)),

            Minus | Mul | Div => {
                let (n1, n2) = logic::num_pair(&left, &right)
                    .ok_or(RuntimeError::TypeMismatch(MSG_NUM_OPERANDS))?;
                Ok(LoxObj::Value(LoxValue::Number(match binary.oper {
                    Minus => n1 - n2,
                    Mul => n1 * n2,
                    _ => {
                        if n2 == 0.0 {
                            return Err(RuntimeError::DivisionByZero);
                        }
                        n1 / n2
                    }
                })))
            }

            Less | LessEqual | Greater | GreaterEqual => {
                // IEEE comparisons, so every comparison with NaN is false
                let (n1, n2) = logic::num_pair(&left, &right)
                    .ok_or(RuntimeError::TypeMismatch(MSG_NUM_OPERANDS))?;
                Ok(LoxObj::bool(match binary.oper {
                    Less => n1 < n2,
                    LessEqual => n1 <= n2,
                    Greater => n1 > n2,
                    _ => n1 >= n2,
                }))
            }
        }
    }

    /// `and`, `or`: short-circuit, returning the deciding operand itself
    fn visit_logic_expr(&mut self, logic: &LogicData) -> Result<LoxObj> {
        let left = self.eval_expr(&logic.left)?;
        match logic.oper {
            LogicOper::Or if left.is_truthy() => Ok(left),
            LogicOper::And if !left.is_truthy() => Ok(left),
            _ => self.eval_expr(&logic.right),
        }
    }

    fn visit_var_expr(&mut self, var: &VarUseData) -> Result<LoxObj> {
        self.lookup_resolved(var)
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> Result<LoxObj> {
        let obj = self.eval_expr(&assign.expr)?;
        self.assign_resolved(&assign.assigned, obj.clone())?;
        Ok(obj)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> Result<LoxObj> {
        let callee = self.eval_expr(&call.callee)?;

        // arguments evaluate left to right, before dispatch
        let mut args = Vec::with_capacity(call.args.len());
        for arg in call.args.iter() {
            args.push(self.eval_expr(arg)?);
        }

        match callee {
            LoxObj::Callable(ref fn_obj) => self.invoke(fn_obj, &args),
            // a class name is its constructor
            LoxObj::Class(ref class) => self.construct(class, &args),
            _ => Err(RuntimeError::CallOfNonCallable),
        }
    }

    fn visit_get_expr(&mut self, get: &GetUseData) -> Result<LoxObj> {
        let body = self.eval_expr(&get.body)?;
        match body {
            LoxObj::Instance(ref instance) => LoxInstance::get(instance, &get.name),
            _ => Err(RuntimeError::FieldOnNonInstance),
        }
    }

    fn visit_set_expr(&mut self, set: &SetUseData) -> Result<LoxObj> {
        let body = self.eval_expr(&set.body)?;
        match body {
            LoxObj::Instance(instance) => {
                let obj = self.eval_expr(&set.value)?;
                instance.borrow_mut().set(&set.name, obj.clone());
                Ok(obj)
            }
            _ => Err(RuntimeError::FieldOnNonInstance),
        }
    }

    fn visit_this_expr(&mut self, this: &VarUseData) -> Result<LoxObj> {
        self.lookup_resolved(this)
    }

    /// Looks up the superclass at the resolved distance, `this` one scope
    /// below it, and returns the superclass method bound to `this`
    fn visit_super_expr(&mut self, sup: &SuperUseData) -> Result<LoxObj> {
        let distance = match self.caches.get(&sup.keyword) {
            Some(distance) => distance.clone(),
            None => return Err(RuntimeError::UndefinedVariable("super".to_string())),
        };

        let superclass = self.env.borrow().get_resolved("super", distance)?;
        let this = self.env.borrow().get_resolved("this", distance - 1)?;

        let bound = match (superclass, this) {
            (LoxObj::Class(class), LoxObj::Instance(instance)) => class
                .find_method(&sup.method)
                .map(|method| method.bind(&instance)),
            _ => None,
        };
        bound
            .map(|method| LoxObj::Callable(LoxFn::User(Rc::new(method))))
            .ok_or_else(|| RuntimeError::UndefinedProperty(sup.method.clone()))
    }
}
