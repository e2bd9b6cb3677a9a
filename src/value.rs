use std::fmt;
use std::rc::Rc;

use crate::class::{LoxClass, LoxInstance};
use crate::error::Result;
use crate::function::LoxFunction;
use crate::interpreter::Interpreter;
use crate::token::Token;

/// Host function exposed to Lox code.  Fixed arity, no declaration.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&Token, &[Value]) -> Result<Value>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

/// Anything that can appear left of a call's parentheses.
#[derive(Debug, Clone)]
pub enum Callable {
    Native(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::Function(function) => function.arity(),
            Callable::Class(class) => class.arity(),
        }
    }

    /// Invoke with already‑evaluated, arity‑checked arguments.  `paren` is
    /// the call site, used to locate errors raised by native code.
    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        paren: &Token,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        match self {
            Callable::Native(native) => (native.func)(paren, &arguments),
            Callable::Function(function) => function.call(interpreter, arguments),
            Callable::Class(class) => LoxClass::instantiate(class, interpreter, arguments),
        }
    }
}

impl PartialEq for Callable {
    /// Callables compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Class(a), Callable::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(native) => write!(f, "<native fn {}>", native.name),
            Callable::Function(function) => write!(f, "<fn {}>", function.name()),
            Callable::Class(class) => write!(f, "<class {}>", class.name),
        }
    }
}

/// A Lox runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Callable(Callable),
    Instance(Rc<LoxInstance>),
}

impl Value {
    /// `nil` and `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

impl PartialEq for Value {
    /// Same runtime type and host‑equal payload; no coercion.  Objects
    /// compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Callable(a), Value::Callable(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::Callable(callable) => write!(f, "{}", callable),

            Value::Instance(instance) => write!(f, "<{} instance>", instance.class().name),
        }
    }
}

impl From<Callable> for Value {
    fn from(callable: Callable) -> Self {
        Value::Callable(callable)
    }
}
