use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::class::LoxInstance;
use crate::environment::{EnvRef, Environment};
use crate::error::Result;
use crate::interpreter::{Flow, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// A user function or method: shared declaration plus the environment it
/// was defined in.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// A copy of this method closing over a new scope, nested in its
    /// closure, that binds `this` to `instance`.
    pub fn bind(&self, instance: &Rc<LoxInstance>) -> LoxFunction {
        let scope: EnvRef = Environment::with_enclosing(&self.closure);

        scope
            .borrow_mut()
            .define("this", Value::Instance(Rc::clone(instance)));

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: scope,
            is_initializer: self.is_initializer,
        }
    }

    /// Run the body in one new scope holding the parameters.  Initializers
    /// always yield their `this`.
    pub fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        debug!("Calling '{}' with {} args", self.name(), arguments.len());

        let scope: EnvRef = Environment::with_enclosing(&self.closure);

        {
            let mut scope = scope.borrow_mut();
            for (param, argument) in self.declaration.params.iter().zip(arguments) {
                scope.define(&param.lexeme, argument);
            }
        }

        let flow: Flow = interpreter.execute_block(&self.declaration.body, scope)?;

        if self.is_initializer {
            return self.this();
        }

        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
            Flow::Break => unreachable!("'break' escaped function '{}'", self.name()),
        }
    }

    /// The instance bound by [`LoxFunction::bind`].
    fn this(&self) -> Result<Value> {
        let this = Token::identifier("this", self.declaration.name.line);

        Environment::get_at(&self.closure, 0, &this)
    }
}

impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}
