//! Lexically-scoped chain of name → value bindings.
//!
//! Shared by reference so a closure's declaring scope can outlive the
//! block that created it: every `Environment` is a cheap handle around an
//! `Rc<RefCell<_>>`, and cloning it shares the same underlying scope
//! rather than copying bindings.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::value::Value;

struct Binding {
    value: Value,
    is_const: bool,
}

struct Scope {
    bindings: HashMap<String, Binding>,
    parent: Option<Environment>,
}

/// A single positionless failure mode from a scope lookup or definition.
/// The interpreter attaches the AST node's position before this reaches
/// a caller as a `RuntimeError`.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvError {
    Undefined(String),
    Redefinition(String),
    ConstantRedefinition(String),
}

#[derive(Clone)]
pub struct Environment(Rc<RefCell<Scope>>);

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Environment(..)")
    }
}

impl Environment {
    pub fn global() -> Self {
        Self(Rc::new(RefCell::new(Scope {
            bindings: HashMap::new(),
            parent: None,
        })))
    }

    pub fn child(parent: &Environment) -> Self {
        Self(Rc::new(RefCell::new(Scope {
            bindings: HashMap::new(),
            parent: Some(parent.clone()),
        })))
    }

    /// `var`/`const` declaration: fails if `name` already exists in this scope.
    pub fn define(&self, name: String, value: Value, is_const: bool) -> Result<(), EnvError> {
        let mut scope = self.0.borrow_mut();
        if scope.bindings.contains_key(&name) {
            return Err(EnvError::Redefinition(name));
        }
        scope.bindings.insert(name, Binding { value, is_const });
        Ok(())
    }

    /// Function declaration: a non-const binding of the same name in this
    /// scope is overwritten (self-shadowing on re-declaration); a const
    /// one is rejected.
    pub fn define_function(&self, name: String, value: Value) -> Result<(), EnvError> {
        let mut scope = self.0.borrow_mut();
        if let Some(existing) = scope.bindings.get(&name) {
            if existing.is_const {
                return Err(EnvError::ConstantRedefinition(name));
            }
        }
        scope.bindings.insert(name, Binding { value, is_const: false });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Value, EnvError> {
        let scope = self.0.borrow();
        if let Some(binding) = scope.bindings.get(name) {
            return Ok(binding.value.clone());
        }
        match &scope.parent {
            Some(parent) => parent.get(name),
            None => Err(EnvError::Undefined(name.to_string())),
        }
    }

    pub fn assign(&self, name: &str, value: Value) -> Result<(), EnvError> {
        let mut scope = self.0.borrow_mut();
        if let Some(binding) = scope.bindings.get_mut(name) {
            if binding.is_const {
                return Err(EnvError::ConstantRedefinition(name.to_string()));
            }
            binding.value = value;
            return Ok(());
        }
        let parent = scope.parent.clone();
        drop(scope);
        match parent {
            Some(parent) => parent.assign(name, value),
            None => Err(EnvError::Undefined(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redefinition_in_same_scope_fails() {
        let env = Environment::global();
        env.define("x".into(), Value::Int(1), false).unwrap();
        assert_eq!(
            env.define("x".into(), Value::Int(2), false),
            Err(EnvError::Redefinition("x".into()))
        );
    }

    #[test]
    fn shadowing_in_child_scope_succeeds() {
        let parent = Environment::global();
        parent.define("x".into(), Value::Int(1), false).unwrap();
        let child = Environment::child(&parent);
        child.define("x".into(), Value::Int(2), false).unwrap();
        assert_eq!(child.get("x").unwrap(), Value::Int(2));
        assert_eq!(parent.get("x").unwrap(), Value::Int(1));
    }

    #[test]
    fn assignment_walks_parent_chain() {
        let parent = Environment::global();
        parent.define("x".into(), Value::Int(1), false).unwrap();
        let child = Environment::child(&parent);
        child.assign("x", Value::Int(9)).unwrap();
        assert_eq!(parent.get("x").unwrap(), Value::Int(9));
    }

    #[test]
    fn const_assignment_fails() {
        let env = Environment::global();
        env.define("x".into(), Value::Int(1), true).unwrap();
        assert_eq!(
            env.assign("x", Value::Int(2)),
            Err(EnvError::ConstantRedefinition("x".into()))
        );
    }

    #[test]
    fn undefined_lookup_fails() {
        let env = Environment::global();
        assert_eq!(env.get("missing"), Err(EnvError::Undefined("missing".into())));
    }

    #[test]
    fn function_redeclaration_overwrites_non_const() {
        let env = Environment::global();
        env.define_function("f".into(), Value::Int(1)).unwrap();
        env.define_function("f".into(), Value::Int(2)).unwrap();
        assert_eq!(env.get("f").unwrap(), Value::Int(2));
    }

    #[test]
    fn function_redeclaration_over_const_fails() {
        let env = Environment::global();
        env.define("f".into(), Value::Int(1), true).unwrap();
        assert_eq!(
            env.define_function("f".into(), Value::Int(2)),
            Err(EnvError::ConstantRedefinition("f".into()))
        );
    }
}
