use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope.  Closures keep the scope they were created in
/// alive after the block or call that made it has returned.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope: bindings plus a link to the enclosing scope.  The
/// global scope is the only one without an `enclosing` link.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// A fresh global scope.
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// A fresh scope nested inside `enclosing`.
    pub fn with_enclosing(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            enclosing: Some(Rc::clone(enclosing)),
        }))
    }

    /// Bind `name` in this scope, overwriting any existing binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Search this scope then each enclosing one.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Overwrite the nearest existing binding; never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// The scope exactly `distance` links above `env`.
    fn ancestor(env: &EnvRef, distance: usize, name: &Token) -> Result<EnvRef> {
        let mut current: EnvRef = Rc::clone(env);

        for _ in 0..distance {
            let next = current.borrow().enclosing.clone();
            current = next.ok_or_else(|| undefined(name))?;
        }

        Ok(current)
    }

    /// Direct lookup in the scope `distance` links up; no searching.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
        debug!("get_at '{}' distance={}", name.lexeme, distance);

        let scope: EnvRef = Self::ancestor(env, distance, name)?;
        let value = scope.borrow().values.get(&name.lexeme).cloned();

        value.ok_or_else(|| undefined(name))
    }

    /// Direct mutation in the scope `distance` links up; no searching.
    pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
        debug!("assign_at '{}' distance={}", name.lexeme, distance);

        let scope: EnvRef = Self::ancestor(env, distance, name)?;
        let mut scope = scope.borrow_mut();

        match scope.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }

    /// Number of enclosing links between this scope and the global one.
    pub fn depth(&self) -> usize {
        match &self.enclosing {
            Some(enclosing) => 1 + enclosing.borrow().depth(),
            None => 0,
        }
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}
