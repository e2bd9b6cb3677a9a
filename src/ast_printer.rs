use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};

/// Renders syntax trees as parenthesised prefix notation, e.g.
/// `(+ 1.0 (group (* 2.0 3.0)))`.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(literal) => match literal {
                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }

                LiteralValue::Str(s) => s.to_string(),

                LiteralValue::True => "true".to_string(),

                LiteralValue::False => "false".to_string(),

                LiteralValue::Nil => "nil".to_string(),
            },

            Expr::Grouping(inner) => format!("(group {})", self.print(inner)),

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, self.print(right))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                self.print(left),
                self.print(right)
            ),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, self.print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut out = format!("(call {}", self.print(callee));
                for argument in arguments {
                    out.push(' ');
                    out.push_str(&self.print(argument));
                }
                out.push(')');
                out
            }

            Expr::Get { object, name } => format!("(. {} {})", self.print(object), name.lexeme),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(= (. {} {}) {})",
                self.print(object),
                name.lexeme,
                self.print(value)
            ),

            Expr::This { .. } => "this".to_string(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),
        }
    }

    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(; {})", self.print(expr)),

            Stmt::Print(expr) => format!("(print {})", self.print(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(init) => format!("(var {} = {})", name.lexeme, self.print(init)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => format!("(block{})", self.print_body(statements)),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch),
                    self.print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                self.print(condition),
                self.print_stmt(body)
            ),

            Stmt::Function(declaration) => format!("(fun {})", self.print_function(declaration)),

            Stmt::Return { value, .. } => match value {
                Some(value) => format!("(return {})", self.print(value)),
                None => "(return)".to_string(),
            },

            Stmt::Break { .. } => "(break)".to_string(),

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                let mut out = format!("(class {}", name.lexeme);
                if let Some(superclass) = superclass {
                    out.push_str(&format!(" < {}", superclass.name.lexeme));
                }
                for method in methods {
                    out.push_str(&format!(" ({})", self.print_function(method)));
                }
                out.push(')');
                out
            }
        }
    }

    /// One line per top‑level statement.
    pub fn print_program(&self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|stmt| self.print_stmt(stmt))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn print_function(&self, declaration: &FunctionDecl) -> String {
        let params: Vec<&str> = declaration
            .params
            .iter()
            .map(|param| param.lexeme.as_str())
            .collect();

        format!(
            "{} ({}){}",
            declaration.name.lexeme,
            params.join(" "),
            self.print_body(&declaration.body)
        )
    }

    fn print_body(&self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|stmt| format!(" {}", self.print_stmt(stmt)))
            .collect()
    }
}
