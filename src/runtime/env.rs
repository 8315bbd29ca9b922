//! Lexical scope as a chain of environments
//!
//! Each function call, block and method bind pushes a new `Env` whose
//! parent is the enclosing scope. Parents are strong references: a closure
//! keeps its defining chain alive for as long as the closure itself lives,
//! and every closure over the same scope sees mutations through any other.

use ::std::cell::RefCell;
use ::std::collections::HashMap;
use ::std::rc::Rc;

use crate::runtime::obj::LoxObj;
use crate::runtime::{Result, RuntimeError};

pub struct Env {
    map: HashMap<String, LoxObj>,
    /// Enclosing environment (if any)
    parent: Option<Rc<RefCell<Self>>>,
}

impl Env {
    pub fn new() -> Self {
        Env {
            map: HashMap::new(),
            parent: None,
        }
    }

    pub fn from_parent(parent: &Rc<RefCell<Self>>) -> Self {
        Env {
            map: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }
    }

    /// Creates or overwrites a binding in this scope.
    ///
    /// Overwriting is how the global scope permits redefinition; local
    /// scopes never get here with a duplicate because the resolver rejects
    /// them first.
    pub fn define(&mut self, name: &str, obj: LoxObj) {
        self.map.insert(name.to_owned(), obj);
    }

    /// Looks up enclosing environments and clones the found object
    pub fn get(&self, name: &str) -> Result<LoxObj> {
        match self.map.get(name) {
            Some(obj) => Ok(obj.clone()),
            None => match self.parent {
                Some(ref parent) => parent.borrow().get(name),
                None => Err(RuntimeError::UndefinedVariable(name.to_string())),
            },
        }
    }

    /// Overwrites the binding in the nearest scope that has it. Assignment
    /// never creates a binding.
    pub fn assign(&mut self, name: &str, obj: LoxObj) -> Result<()> {
        if self.map.contains_key(name) {
            self.map.insert(name.to_owned(), obj);
            Ok(())
        } else {
            match self.parent {
                Some(ref parent) => parent.borrow_mut().assign(name, obj),
                None => Err(RuntimeError::UndefinedVariable(name.to_string())),
            }
        }
    }

    /// Reads a binding at the scope exactly `distance` hops up the chain,
    /// as computed by the `Resolver`
    pub fn get_resolved(&self, name: &str, distance: usize) -> Result<LoxObj> {
        if distance == 0 {
            self.map
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))
        } else {
            match self.parent {
                Some(ref parent) => parent.borrow().get_resolved(name, distance - 1),
                None => Err(RuntimeError::UndefinedVariable(name.to_string())),
            }
        }
    }

    /// Writes a binding at the scope exactly `distance` hops up the chain
    pub fn assign_resolved(&mut self, name: &str, distance: usize, obj: LoxObj) -> Result<()> {
        if distance == 0 {
            if self.map.contains_key(name) {
                self.map.insert(name.to_owned(), obj);
                Ok(())
            } else {
                Err(RuntimeError::UndefinedVariable(name.to_string()))
            }
        } else {
            match self.parent {
                Some(ref parent) => parent.borrow_mut().assign_resolved(name, distance - 1, obj),
                None => Err(RuntimeError::UndefinedVariable(name.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::runtime::obj::LoxValue;

    fn num(n: f64) -> LoxObj {
        LoxObj::Value(LoxValue::Number(n))
    }

    #[test]
    fn define_overwrites_in_one_scope() {
        let mut env = Env::new();
        env.define("a", num(1.0));
        env.define("a", num(2.0));
        assert!(env.get("a").unwrap().equals(&num(2.0)));
    }

    #[test]
    fn lookup_walks_the_chain() {
        let root = Rc::new(RefCell::new(Env::new()));
        root.borrow_mut().define("a", num(1.0));
        let child = Env::from_parent(&root);
        assert!(child.get("a").unwrap().equals(&num(1.0)));
        assert!(matches!(
            child.get("b"),
            Err(RuntimeError::UndefinedVariable(_))
        ));
    }

    #[test]
    fn assignment_never_creates_a_binding() {
        let root = Rc::new(RefCell::new(Env::new()));
        root.borrow_mut().define("a", num(1.0));
        let mut child = Env::from_parent(&root);

        child.assign("a", num(2.0)).unwrap();
        assert!(root.borrow().get("a").unwrap().equals(&num(2.0)));
        assert!(matches!(
            child.assign("b", num(3.0)),
            Err(RuntimeError::UndefinedVariable(_))
        ));
    }

    #[test]
    fn resolved_access_skips_shadowing_scopes() {
        let root = Rc::new(RefCell::new(Env::new()));
        root.borrow_mut().define("a", num(1.0));
        let mid = Rc::new(RefCell::new(Env::from_parent(&root)));
        mid.borrow_mut().define("a", num(2.0));
        let leaf = Env::from_parent(&mid);

        assert!(leaf.get_resolved("a", 1).unwrap().equals(&num(2.0)));
        assert!(leaf.get_resolved("a", 2).unwrap().equals(&num(1.0)));
        assert!(leaf.get_resolved("a", 0).is_err());
    }
}
