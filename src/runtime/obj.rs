//! Object (value, function, class or instance) definitions
//!
//! Everything a Lox expression can evaluate to. Functions, classes and
//! instances are shared by reference; closures, bound methods and fields
//! may all retain the same object, and cycles among them are expected.

use ::std::cell::RefCell;
use ::std::collections::HashMap;
use ::std::fmt;
use ::std::rc::Rc;

use crate::ast::expr::LiteralData;
use crate::ast::stmt::{FnDeclArgs, Params, Stmt};
use crate::runtime::env::Env;
use crate::runtime::{Result, RuntimeError};

/// Anything at runtime
#[derive(Clone)]
pub enum LoxObj {
    Value(LoxValue),
    Callable(LoxFn),
    Class(Rc<LoxClass>),
    Instance(Rc<RefCell<LoxInstance>>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoxValue {
    Nil,
    Bool(bool),
    StringLit(String),
    Number(f64),
}

impl LoxValue {
    pub fn from_lit(lit: &LiteralData) -> Self {
        match lit {
            LiteralData::Nil => LoxValue::Nil,
            LiteralData::Bool(b) => LoxValue::Bool(b.clone()),
            LiteralData::StringLit(s) => LoxValue::StringLit(s.clone()),
            LiteralData::Number(n) => LoxValue::Number(n.clone()),
        }
    }
}

impl From<LoxValue> for LoxObj {
    fn from(value: LoxValue) -> Self {
        LoxObj::Value(value)
    }
}

impl LoxObj {
    pub fn nil() -> Self {
        LoxObj::Value(LoxValue::Nil)
    }

    pub fn bool(b: bool) -> Self {
        LoxObj::Value(LoxValue::Bool(b))
    }

    pub fn from_lit(lit: &LiteralData) -> Self {
        LoxObj::Value(LoxValue::from_lit(lit))
    }

    /// Only `nil` and `false` are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            LoxObj::Value(LoxValue::Nil) => false,
            LoxObj::Value(LoxValue::Bool(b)) => *b,
            _ => true,
        }
    }

    pub fn as_value(&self) -> Option<&LoxValue> {
        match self {
            LoxObj::Value(ref value) => Some(value),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            LoxObj::Value(LoxValue::Number(n)) => Some(n.clone()),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        match self {
            LoxObj::Value(LoxValue::Nil) => true,
            _ => false,
        }
    }

    /// Type-strict equality; never fails.
    ///
    /// Values of different variants are never equal. Numbers use IEEE
    /// equality (`NaN != NaN`), strings compare by content, and functions,
    /// classes and instances compare by reference identity. This is
    /// deliberately not a `PartialEq` impl: deriving one would compare
    /// instances structurally.
    pub fn equals(&self, other: &LoxObj) -> bool {
        use LoxObj::*;
        match (self, other) {
            (Value(v1), Value(v2)) => match (v1, v2) {
                (LoxValue::Nil, LoxValue::Nil) => true,
                (LoxValue::Bool(b1), LoxValue::Bool(b2)) => b1 == b2,
                (LoxValue::Number(n1), LoxValue::Number(n2)) => n1 == n2,
                (LoxValue::StringLit(s1), LoxValue::StringLit(s2)) => s1 == s2,
                _ => false,
            },
            (Callable(f1), Callable(f2)) => match (f1, f2) {
                (LoxFn::User(u1), LoxFn::User(u2)) => Rc::ptr_eq(u1, u2),
                (LoxFn::Clock, LoxFn::Clock) => true,
                _ => false,
            },
            (Class(c1), Class(c2)) => Rc::ptr_eq(c1, c2),
            (Instance(i1), Instance(i2)) => Rc::ptr_eq(i1, i2),
            _ => false,
        }
    }
}

/// Display rules for the `print` statement
///
/// `f64`'s `Display` already prints mathematically integral numbers
/// without a decimal point and everything else as the shortest decimal
/// that round-trips.
impl fmt::Display for LoxObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxObj::Value(value) => match value {
                LoxValue::Nil => write!(f, "nil"),
                LoxValue::Bool(b) => write!(f, "{}", b),
                LoxValue::StringLit(s) => write!(f, "{}", s),
                LoxValue::Number(n) => write!(f, "{}", n),
            },
            LoxObj::Callable(call) => match call {
                LoxFn::User(u) => write!(f, "<fn {}>", u.name),
                LoxFn::Clock => write!(f, "<native fn>"),
            },
            LoxObj::Class(class) => write!(f, "{}", class.name),
            LoxObj::Instance(instance) => {
                write!(f, "{} instance", instance.borrow().class.name)
            }
        }
    }
}

impl fmt::Debug for LoxObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[derive(Clone, Debug)]
pub enum LoxFn {
    User(Rc<LoxUserFn>),
    /// A native function: seconds since the Unix epoch
    Clock,
}

/// A user-defined function or method, closed over its defining scope
pub struct LoxUserFn {
    pub name: String,
    pub params: Params,
    /// Shared with the declaration and with every bound copy
    pub body: Rc<Vec<Stmt>>,
    pub closure: Rc<RefCell<Env>>,
    /// True iff this is a method named exactly `init`
    pub is_initializer: bool,
}

// the closure environment is neither printable nor comparable, so this
// cannot be derived
impl fmt::Debug for LoxUserFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name)
    }
}

impl LoxUserFn {
    pub fn from_decl(decl: &FnDeclArgs, closure: &Rc<RefCell<Env>>, is_initializer: bool) -> Self {
        Self {
            name: decl.name.clone(),
            params: decl.params.clone(),
            body: Rc::clone(&decl.body),
            closure: Rc::clone(closure),
            is_initializer: is_initializer,
        }
    }

    /// Creates a copy whose closure is extended with `this` bound to the
    /// given instance. A closure-within-a-closure: when the method is
    /// called, the new scope becomes the parent of the call scope.
    pub fn bind(&self, instance: &Rc<RefCell<LoxInstance>>) -> Self {
        let scope = Rc::new(RefCell::new(Env::from_parent(&self.closure)));
        scope
            .borrow_mut()
            .define("this", LoxObj::Instance(Rc::clone(instance)));
        Self {
            name: self.name.clone(),
            params: self.params.clone(),
            body: Rc::clone(&self.body),
            closure: scope,
            is_initializer: self.is_initializer,
        }
    }
}

/// The class stores the behaviour; instances store the state
#[derive(Debug)]
pub struct LoxClass {
    pub name: String,
    pub superclass: Option<Rc<LoxClass>>,
    /// Only this class's own methods; inherited ones are found by walking
    /// `superclass`
    pub methods: HashMap<String, Rc<LoxUserFn>>,
}

impl LoxClass {
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxUserFn>> {
        match self.methods.get(name) {
            Some(method) => Some(Rc::clone(method)),
            None => self
                .superclass
                .as_ref()
                .and_then(|sup| sup.find_method(name)),
        }
    }

}

#[derive(Debug)]
pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    fields: HashMap<String, LoxObj>,
}

impl LoxInstance {
    pub fn new(class: &Rc<LoxClass>) -> Self {
        Self {
            class: Rc::clone(class),
            fields: HashMap::new(),
        }
    }

    /// Returns a field, or a method bound to this instance. Fields shadow
    /// methods.
    pub fn get(instance: &Rc<RefCell<Self>>, name: &str) -> Result<LoxObj> {
        let me = instance.borrow();
        if let Some(field) = me.fields.get(name) {
            Ok(field.clone())
        } else if let Some(method) = me.class.find_method(name) {
            Ok(LoxObj::Callable(LoxFn::User(Rc::new(
                method.bind(instance),
            ))))
        } else {
            Err(RuntimeError::UndefinedProperty(name.to_string()))
        }
    }

    /// Lox allows freely creating new fields, so there's no need to check
    /// whether the key is already present
    pub fn set(&mut self, name: &str, obj: LoxObj) {
        self.fields.insert(name.to_string(), obj);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn num(n: f64) -> LoxObj {
        LoxObj::Value(LoxValue::Number(n))
    }

    #[test]
    fn truthiness() {
        assert!(!LoxObj::nil().is_truthy());
        assert!(!LoxObj::bool(false).is_truthy());
        assert!(LoxObj::bool(true).is_truthy());
        assert!(num(0.0).is_truthy());
        assert!(LoxObj::Value(LoxValue::StringLit("".into())).is_truthy());
    }

    #[test]
    fn equality_is_type_strict() {
        assert!(num(1.0).equals(&num(1.0)));
        assert!(!num(0.0).equals(&LoxObj::bool(false)));
        assert!(!LoxObj::nil().equals(&LoxObj::bool(false)));
        assert!(!num(::std::f64::NAN).equals(&num(::std::f64::NAN)));
        assert!(LoxObj::nil().equals(&LoxObj::nil()));
    }

    #[test]
    fn display_follows_print_rules() {
        assert_eq!(format!("{}", LoxObj::nil()), "nil");
        assert_eq!(format!("{}", num(7.0)), "7");
        assert_eq!(format!("{}", num(2.5)), "2.5");
        assert_eq!(format!("{}", LoxObj::Callable(LoxFn::Clock)), "<native fn>");

        let class = Rc::new(LoxClass {
            name: "Bagel".into(),
            superclass: None,
            methods: HashMap::new(),
        });
        assert_eq!(format!("{}", LoxObj::Class(Rc::clone(&class))), "Bagel");

        let instance = Rc::new(RefCell::new(LoxInstance::new(&class)));
        assert_eq!(format!("{}", LoxObj::Instance(instance)), "Bagel instance");
    }

    #[test]
    fn instances_compare_by_identity() {
        let class = Rc::new(LoxClass {
            name: "Bagel".into(),
            superclass: None,
            methods: HashMap::new(),
        });
        let a = LoxObj::Instance(Rc::new(RefCell::new(LoxInstance::new(&class))));
        let b = LoxObj::Instance(Rc::new(RefCell::new(LoxInstance::new(&class))));
        assert!(a.equals(&a.clone()));
        assert!(!a.equals(&b));
    }
}
