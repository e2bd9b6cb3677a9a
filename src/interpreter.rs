use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

use log::{debug, info};

use crate::ast::{Expr, ExprId, LiteralValue, Stmt, Superclass};
use crate::class::{LoxClass, INITIALIZER};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::function::LoxFunction;
use crate::token::{Token, TokenType};
use crate::value::{Callable, NativeFunction, Value};

/// How a statement finished.  `Return` and `Break` travel outward as plain
/// data until the call or loop that consumes them.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
    Break,
}

/// Tree‑walking evaluator.
pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    /// Lexical distance per resolved reference; absent ⇒ global.
    locals: HashMap<ExprId, usize>,
    out: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter printing to standard output.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    /// Interpreter printing to `out`.  The global scope is seeded with the
    /// native functions.
    pub fn with_output<W: Write + 'static>(out: W) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Environment::new();

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Callable::Native(Rc::new(NativeFunction {
                name: "clock",
                arity: 0,
                func: clock,
            }))
            .into(),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out: Box::new(out),
        }
    }

    /// Record the lexical distance of a resolved reference.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Distance recorded for `id`, `None` for globals.
    pub fn local_depth(&self, id: ExprId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    /// Run a resolved program.  The first runtime error aborts the rest.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}
                // The resolver rejects top-level `return` and stray `break`.
                flow => unreachable!("{:?} escaped top-level code", flow),
            }
        }

        self.out.flush()?;

        info!("Interpretation completed successfully");

        Ok(())
    }

    // ───────────────────────── statements ─────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let scope: EnvRef = Environment::with_enclosing(&self.environment);
                self.execute_block(statements, scope)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Normal => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                self.environment.borrow_mut().define(
                    &declaration.name.lexeme,
                    Callable::Function(Rc::new(function)).into(),
                );
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }

            Stmt::Break { .. } => Ok(Flow::Break),

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                debug!("Declaring class '{}'", name.lexeme);

                let superclass: Option<Rc<LoxClass>> = match superclass {
                    Some(superclass) => Some(self.superclass(superclass)?),
                    None => None,
                };

                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Nil);

                // Methods of a subclass close over one extra scope binding `super`.
                let method_scope: EnvRef = match &superclass {
                    Some(superclass) => {
                        let scope = Environment::with_enclosing(&self.environment);
                        scope.borrow_mut().define(
                            "super",
                            Callable::Class(Rc::clone(superclass)).into(),
                        );
                        scope
                    }
                    None => Rc::clone(&self.environment),
                };

                let methods: HashMap<String, Rc<LoxFunction>> = methods
                    .iter()
                    .map(|method| {
                        let function = LoxFunction::new(
                            Rc::clone(method),
                            Rc::clone(&method_scope),
                            method.name.lexeme == INITIALIZER,
                        );
                        (method.name.lexeme.clone(), Rc::new(function))
                    })
                    .collect();

                let class = LoxClass::new(name.lexeme.clone(), superclass, methods);

                self.environment
                    .borrow_mut()
                    .assign(name, Callable::Class(Rc::new(class)).into())?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Execute `statements` with `scope` as the current environment.  The
    /// previous environment is restored however the block exits.
    pub fn execute_block(&mut self, statements: &[Stmt], scope: EnvRef) -> Result<Flow> {
        debug!("Entering scope at depth {}", scope.borrow().depth());

        let previous: EnvRef = std::mem::replace(&mut self.environment, scope);

        let result = self.execute_all(statements);

        self.environment = previous;

        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }

        Ok(Flow::Normal)
    }

    /// Evaluate a class's `< Superclass` clause, which must name a class.
    fn superclass(&self, superclass: &Superclass) -> Result<Rc<LoxClass>> {
        match self.look_up_variable(superclass.id, &superclass.name)? {
            Value::Callable(Callable::Class(class)) => Ok(class),
            _ => Err(LoxError::runtime(
                &superclass.name,
                "Superclass must be a class.",
            )),
        }
    }

    // ───────────────────────── expressions ────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right: Value = self.evaluate(right)?;

                match operator.token_type {
                    TokenType::MINUS => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
                    },
                    TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
                    _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;
                let right: Value = self.evaluate(right)?;

                binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;

                let short_circuits = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value = self.evaluate(callee)?;

                let mut values: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                let Value::Callable(callable) = callee else {
                    return Err(LoxError::runtime(
                        paren,
                        "Can only call functions and classes.",
                    ));
                };

                if values.len() != callable.arity() {
                    return Err(LoxError::runtime(
                        paren,
                        format!(
                            "Expected {} arguments but got {}.",
                            callable.arity(),
                            values.len()
                        ),
                    ));
                }

                debug!("Calling {}", callable);

                callable.call(self, paren, values)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => instance.get(name),
                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name, "Only instances have fields."));
                };

                let value: Value = self.evaluate(value)?;
                instance.set(name, value.clone());

                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => {
                let distance: usize = self.locals.get(id).copied().ok_or_else(|| {
                    LoxError::runtime(keyword, "Can't use 'super' outside of a class.")
                })?;

                // `this` lives one scope inside the one binding `super`, so
                // `distance` is at least 1 here.
                let superclass = Environment::get_at(&self.environment, distance, keyword)?;
                let this = Token::identifier("this", keyword.line);
                let object = Environment::get_at(&self.environment, distance - 1, &this)?;

                let found = match (&superclass, &object) {
                    (Value::Callable(Callable::Class(class)), Value::Instance(instance)) => class
                        .find_method(&method.lexeme)
                        .map(|found| found.bind(instance)),
                    _ => None,
                };

                match found {
                    Some(bound) => Ok(Callable::Function(Rc::new(bound)).into()),
                    None => Err(LoxError::runtime(
                        method,
                        format!("Undefined property '{}'.", method.lexeme),
                    )),
                }
            }
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }
}

/// Native `clock()`: seconds since the Unix epoch.
fn clock(paren: &Token, _args: &[Value]) -> Result<Value> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e: SystemTimeError| LoxError::runtime(paren, format!("Clock error: {}", e)))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}

/// Arithmetic, comparison and equality on evaluated operands.
fn binary(operator: &Token, left: Value, right: Value) -> Result<Value> {
    match operator.token_type {
        TokenType::PLUS => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            _ => Err(LoxError::runtime(
                operator,
                "Operands must be two numbers or two strings.",
            )),
        },

        TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

        TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

        _ => {
            let (a, b) = match (left, right) {
                (Value::Number(a), Value::Number(b)) => (a, b),
                _ => return Err(LoxError::runtime(operator, "Operands must be numbers.")),
            };

            match operator.token_type {
                TokenType::MINUS => Ok(Value::Number(a - b)),
                TokenType::STAR => Ok(Value::Number(a * b)),
                // IEEE‑754: division by zero yields ±inf or NaN.
                TokenType::SLASH => Ok(Value::Number(a / b)),
                TokenType::LESS => Ok(Value::Bool(a < b)),
                TokenType::LESS_EQUAL => Ok(Value::Bool(a <= b)),
                TokenType::GREATER => Ok(Value::Bool(a > b)),
                TokenType::GREATER_EQUAL => Ok(Value::Bool(a >= b)),
                _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
            }
        }
    }
}
