mod common;

#[cfg(test)]
mod resolver_tests {
    use super::common::run;

    use rox::ast::{Expr, Stmt};
    use rox::error::LoxError;
    use rox::interpreter::Interpreter;
    use rox::parser::Parser;
    use rox::resolver::Resolver;
    use rox::scanner::Scanner;
    use rox::Status;

    fn static_errors(source: &str) -> Vec<String> {
        let result = run(source);

        assert_eq!(result.status, Status::StaticError);
        assert!(result.output.is_empty(), "nothing may run");

        result.errors.iter().map(ToString::to_string).collect()
    }

    fn resolved(source: &str) -> (Vec<Stmt>, Interpreter) {
        let mut errors: Vec<LoxError> = Vec::new();
        let tokens = Scanner::new(source.as_bytes()).scan_tokens(&mut errors);
        let statements = Parser::new(tokens).parse(&mut errors);
        let mut interpreter = Interpreter::with_output(std::io::sink());

        assert!(Resolver::new(&mut interpreter, &mut errors).resolve(&statements));
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);

        (statements, interpreter)
    }

    /// Depth recorded for the expression printed by a `print` statement.
    fn print_depth(stmt: &Stmt, interpreter: &Interpreter) -> Option<usize> {
        match stmt {
            Stmt::Print(Expr::Variable { id, .. }) | Stmt::Print(Expr::This { id, .. }) => {
                interpreter.local_depth(*id)
            }
            other => panic!("expected a print statement, got {:?}", other),
        }
    }

    #[test]
    fn top_level_return() {
        assert_eq!(
            static_errors("return 1;"),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
    }

    #[test]
    fn value_returned_from_initializer() {
        assert_eq!(
            static_errors("class A {\n  init() { return 1; }\n}"),
            vec!["[line 2] Error at 'return': Can't return a value from an initializer."]
        );
    }

    #[test]
    fn bare_return_in_initializer_is_allowed() {
        let result = run("class A { init() { return; } } A();");

        assert_eq!(result.status, Status::Completed);
    }

    #[test]
    fn local_read_in_own_initializer() {
        assert_eq!(
            static_errors("{ var a = a; }"),
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn global_read_in_own_initializer_is_a_runtime_matter() {
        let result = run("var a = a;");

        assert_eq!(result.status, Status::RuntimeError);
        assert_eq!(result.messages(), vec!["Undefined variable 'a'."]);
    }

    #[test]
    fn local_redeclaration() {
        assert_eq!(
            static_errors("fun f(a) { var a; }"),
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );
    }

    #[test]
    fn global_redeclaration_is_allowed() {
        let result = run("var a = 1; var a = 2; print a;");

        assert_eq!(result.output, vec!["2"]);
    }

    #[test]
    fn this_outside_class() {
        assert_eq!(
            static_errors("fun f() { print this; }"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );
    }

    #[test]
    fn super_outside_class_and_without_superclass() {
        assert_eq!(
            static_errors("super.m();\nclass A { m() { super.m(); } }"),
            vec![
                "[line 1] Error at 'super': Can't use 'super' outside of a class.",
                "[line 2] Error at 'super': Can't use 'super' in a class with no superclass.",
            ]
        );
    }

    #[test]
    fn class_inheriting_from_itself() {
        assert_eq!(
            static_errors("class A < A {}"),
            vec!["[line 1] Error at 'A': A class can't inherit from itself."]
        );
    }

    #[test]
    fn break_outside_loop() {
        assert_eq!(
            static_errors("break;"),
            vec!["[line 1] Error at 'break': Can't use 'break' outside of a loop."]
        );
    }

    #[test]
    fn break_does_not_cross_function_boundary() {
        assert_eq!(
            static_errors("while (true) { fun f() { break; } }"),
            vec!["[line 1] Error at 'break': Can't use 'break' outside of a loop."]
        );
    }

    #[test]
    fn errors_accumulate_across_the_program() {
        let errors = static_errors("return;\n{ var x = x; }\nprint this;");

        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("[line 1]"));
        assert!(errors[1].starts_with("[line 2]"));
        assert!(errors[2].starts_with("[line 3]"));
    }

    #[test]
    fn syntax_and_static_errors_are_reported_together() {
        let result = run("var = 1;\nreturn 2;");

        assert_eq!(result.status, Status::StaticError);
        assert_eq!(
            result.messages(),
            vec!["Expected variable name.", "Can't return from top-level code."]
        );
    }

    #[test]
    fn globals_get_no_distance() {
        let (statements, interpreter) = resolved("var g = 1; print g;");

        assert_eq!(print_depth(&statements[1], &interpreter), None);
    }

    #[test]
    fn block_locals_count_scopes_outward() {
        let (statements, interpreter) = resolved("{ var a = 1; { { print a; } print a; } }");

        let Stmt::Block(outer) = &statements[0] else {
            panic!("expected block");
        };
        let Stmt::Block(middle) = &outer[1] else {
            panic!("expected block");
        };
        let Stmt::Block(inner) = &middle[0] else {
            panic!("expected block");
        };

        assert_eq!(print_depth(&inner[0], &interpreter), Some(2));
        assert_eq!(print_depth(&middle[1], &interpreter), Some(1));
    }

    #[test]
    fn parameters_share_the_body_scope() {
        let (statements, interpreter) = resolved("fun f(x) { print x; { print x; } }");

        let Stmt::Function(declaration) = &statements[0] else {
            panic!("expected function");
        };
        let Stmt::Block(inner) = &declaration.body[1] else {
            panic!("expected block");
        };

        assert_eq!(print_depth(&declaration.body[0], &interpreter), Some(0));
        assert_eq!(print_depth(&inner[0], &interpreter), Some(1));
    }

    #[test]
    fn this_sits_one_scope_outside_method_body() {
        let (statements, interpreter) = resolved("class A { m() { print this; } }");

        let Stmt::Class { methods, .. } = &statements[0] else {
            panic!("expected class");
        };

        assert_eq!(print_depth(&methods[0].body[0], &interpreter), Some(1));
    }

    #[test]
    fn super_sits_one_scope_outside_this() {
        let (statements, interpreter) =
            resolved("class A { m() {} } class B < A { m() { super.m; } }");

        let Stmt::Class { methods, .. } = &statements[1] else {
            panic!("expected class");
        };
        let Stmt::Expression(Expr::Super { id, .. }) = &methods[0].body[0] else {
            panic!("expected super expression");
        };

        assert_eq!(interpreter.local_depth(*id), Some(2));
    }
}
