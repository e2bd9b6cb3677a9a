//! Syntax tree produced by the [`Parser`](crate::parser::Parser) and consumed
//! by the resolver, the interpreter and the printer.
//!
//! Both node families are closed enums; every consumer matches on them
//! exhaustively.  Nodes that refer to a variable binding (`Variable`,
//! `Assign`, `This`, `Super`) carry an [`ExprId`] so the resolver can record
//! a lexical distance for that exact occurrence.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use crate::token::Token;

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Stable identity of a binding‑referencing expression node.
///
/// Ids come from a process‑wide counter, so trees parsed separately (one
/// per REPL line, say) can share one interpreter's side table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ExprId(usize);

impl ExprId {
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A **literal constant** that appears directly in the source code.
///
/// The parser copies the value out of the token, so the literal does not
/// keep its token around.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal, always an `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// Every kind of Lox *expression*.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(LiteralValue),

    /// Parenthesised sub‑expression.
    Grouping(Box<Expr>),

    /// Prefix operator: `!ready`, `-42`.
    Unary {
        operator: Token,
        right: Box<Expr>,
    },

    /// Infix arithmetic, comparison or equality operator.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Variable read.
    Variable { id: ExprId, name: Token },

    /// `name = value`
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// `callee(arguments...)`
    Call {
        callee: Box<Expr>,
        /// The closing `)`, kept for error locations.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// `object.name`
    Get { object: Box<Expr>, name: Token },

    /// `object.name = value`
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// `this` inside a method.
    This { id: ExprId, keyword: Token },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },
}

/// The `< Name` clause of a class declaration.  Resolved like a variable
/// read, so it carries its own [`ExprId`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Superclass {
    pub id: ExprId,
    pub name: Token,
}

/// A function or method declaration.  Shared (`Rc`) between the tree and
/// every runtime closure created from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

/// Every kind of Lox *statement*.  A program is a `Vec<Stmt>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    /// Expression evaluated for its side effects.
    Expression(Expr),

    Print(Expr),

    /// `var name (= initializer)?;`
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while`; `for` loops are desugared into this.
    While { condition: Expr, body: Box<Stmt> },

    Function(Rc<FunctionDecl>),

    /// `return value?;`  Absent value ⇒ `nil`.
    Return {
        keyword: Token,
        value: Option<Expr>,
    },

    Break { keyword: Token },

    Class {
        name: Token,
        superclass: Option<Superclass>,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
