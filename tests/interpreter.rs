mod common;

#[cfg(test)]
mod interpreter_tests {
    use super::common::{output_of, run, SharedBuffer};

    use rox::error::LoxError;
    use rox::interpreter::Interpreter;
    use rox::Status;

    fn runtime_error(source: &str) -> (Vec<String>, String) {
        let result = run(source);

        assert_eq!(result.status, Status::RuntimeError);
        assert_eq!(result.errors.len(), 1);

        (result.output, result.errors[0].message())
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(
            output_of("print 1 + 2 * 3;\nprint (1 + 2) * 3;\nprint 10 / 4 - -1;"),
            vec!["7", "9", "3.5"]
        );
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(
            output_of("print 7; print 2.5; print -0.5; print 1 / 0; print -1 / 0;"),
            vec!["7", "2.5", "-0.5", "inf", "-inf"]
        );
    }

    #[test]
    fn test_strings_and_literals() {
        assert_eq!(
            output_of("print \"a\" + \"b\"; print nil; print true; print !nil;"),
            vec!["ab", "nil", "true", "true"]
        );
    }

    #[test]
    fn test_equality_never_coerces() {
        assert_eq!(
            output_of(
                "print nil == false;\nprint 1 == 1;\nprint \"1\" == 1;\nprint \"a\" != \"a\";\nprint clock == clock;"
            ),
            vec!["false", "true", "false", "false", "true"]
        );
    }

    #[test]
    fn test_logical_operators_return_operands() {
        assert_eq!(
            output_of("print nil or \"x\";\nprint 1 and 2;\nprint false and missing;\nprint 0 or missing;"),
            vec!["x", "2", "false", "0"]
        );
    }

    #[test]
    fn test_block_scoping() {
        assert_eq!(
            output_of("var a = 1;\n{\n  var a = 2;\n  print a;\n}\nprint a;"),
            vec!["2", "1"]
        );
    }

    #[test]
    fn test_assignment_is_an_expression() {
        assert_eq!(
            output_of("var a; var b; a = b = 3; print a; print b = 4;"),
            vec!["3", "4"]
        );
    }

    #[test]
    fn test_control_flow() {
        let source = r#"
            var n = 0;
            while (n < 3) { print n; n = n + 1; }
            for (var i = 10; i > 8; i = i - 1) print i;
            if (n == 3) print "three"; else print "other";
            if (nil) print "never";
        "#;

        assert_eq!(output_of(source), vec!["0", "1", "2", "10", "9", "three"]);
    }

    #[test]
    fn test_break_leaves_innermost_loop() {
        let source = r#"
            for (var i = 0; i < 3; i = i + 1) {
                var j = 0;
                while (true) {
                    if (j == i) break;
                    j = j + 1;
                }
                print j;
            }
            var k = 0;
            while (true) { k = k + 1; if (k > 4) break; }
            print k;
        "#;

        assert_eq!(output_of(source), vec!["0", "1", "2", "5"]);
    }

    #[test]
    fn test_return_unwinds_loops() {
        let source = r#"
            fun firstOver(limit) {
                for (var i = 0; ; i = i + 1) {
                    if (i * i > limit) return i;
                }
            }
            print firstOver(10);
            fun nothing() {}
            print nothing();
        "#;

        assert_eq!(output_of(source), vec!["4", "nil"]);
    }

    #[test]
    fn test_recursion() {
        let source = r#"
            fun fib(n) {
                if (n < 2) return n;
                return fib(n - 1) + fib(n - 2);
            }
            print fib(15);
        "#;

        assert_eq!(output_of(source), vec!["610"]);
    }

    #[test]
    fn test_closure_counter() {
        let source = r#"
            fun makeCounter() {
                var i = 0;
                fun count() {
                    i = i + 1;
                    print i;
                }
                return count;
            }
            var counter = makeCounter();
            counter();
            counter();
            var other = makeCounter();
            other();
        "#;

        assert_eq!(output_of(source), vec!["1", "2", "1"]);
    }

    #[test]
    fn test_closure_binds_at_declaration() {
        let source = r#"
            var a = "global";
            {
                fun showA() { print a; }
                showA();
                var a = "block";
                showA();
                print a;
            }
        "#;

        assert_eq!(output_of(source), vec!["global", "global", "block"]);
    }

    #[test]
    fn test_nested_closures_reach_outer_frames() {
        let source = r#"
            fun outer() {
                var x = "outer";
                fun middle() {
                    var y = "middle";
                    fun inner() {
                        { { print x + " " + y; } }
                    }
                    return inner;
                }
                return middle();
            }
            outer()();
        "#;

        assert_eq!(output_of(source), vec!["outer middle"]);
    }

    #[test]
    fn test_for_loop_variable_is_one_binding() {
        let source = r#"
            var f;
            for (var i = 0; i < 3; i = i + 1) {
                if (i == 1) {
                    fun show() { print i; }
                    f = show;
                }
            }
            f();
        "#;

        assert_eq!(output_of(source), vec!["3"]);
    }

    #[test]
    fn test_parameters_and_body_share_a_scope() {
        let source = r#"
            fun f(a) {
                var b = a + 1;
                { var a = 10; print a; }
                print a + b;
            }
            f(1);
        "#;

        assert_eq!(output_of(source), vec!["10", "3"]);
    }

    #[test]
    fn test_stringification_of_objects() {
        let source = r#"
            fun f() {}
            class A { m() {} }
            print f;
            print A;
            print A();
            print A().m;
            print clock;
        "#;

        assert_eq!(
            output_of(source),
            vec!["<fn f>", "<class A>", "<A instance>", "<fn m>", "<native fn clock>"]
        );
    }

    #[test]
    fn test_natives_can_be_shadowed() {
        assert_eq!(
            output_of("print clock() > 0;\nfun clock() { return 1; }\nprint clock();"),
            vec!["true", "1"]
        );
    }

    #[test]
    fn test_fields_and_methods() {
        let source = r#"
            class Point {
                init(x, y) { this.x = x; this.y = y; }
                sum() { return this.x + this.y; }
            }
            var p = Point(1, 2);
            print p.sum();
            p.x = 10;
            print p.sum();
            var s = p.sum;
            print s();
        "#;

        assert_eq!(output_of(source), vec!["3", "12", "12"]);
    }

    #[test]
    fn test_fields_shadow_methods() {
        let source = r#"
            class A { m() { return "method"; } }
            var a = A();
            a.m = "field";
            print a.m;
        "#;

        assert_eq!(output_of(source), vec!["field"]);
    }

    #[test]
    fn test_instances_compare_by_identity() {
        assert_eq!(
            output_of("class A {} var a = A(); print a == a; print a == A();"),
            vec!["true", "false"]
        );
    }

    #[test]
    fn test_initializer_always_returns_instance() {
        let source = r#"
            class A {
                init() {
                    this.v = 1;
                    return;
                    this.v = 2;
                }
            }
            var a = A();
            print a.v;
            print a.init();
            print a.init() == a;
        "#;

        assert_eq!(output_of(source), vec!["1", "<A instance>", "true"]);
    }

    #[test]
    fn test_super_calls_skip_own_override() {
        let source = r#"
            class A {
                method() { print "A method"; }
            }
            class B < A {
                method() { print "B method"; }
                test() { super.method(); }
            }
            class C < B {}
            C().test();
        "#;

        assert_eq!(output_of(source), vec!["A method"]);
    }

    #[test]
    fn test_override_then_super() {
        let source = r#"
            class A { greet() { print "A"; } }
            class B < A { greet() { print "B"; super.greet(); } }
            B().greet();
        "#;

        assert_eq!(output_of(source), vec!["B", "A"]);
    }

    #[test]
    fn test_shadowed_names_resolve_to_their_own_scope() {
        // Every level binds `v`; a distance that is off by one in either
        // direction prints the wrong level.
        let source = r#"
            var v = "global";
            fun f(v) {
                {
                    var v = "block in f";
                    for (var v = "loop"; v != "done"; v = "done") {
                        var v = "loop body";
                        print v;
                    }
                    print v;
                }
                print v;
                class K {
                    init(v) { this.v = v; }
                    show() { var v = "method"; print v; print this.v; }
                }
                K("field").show();
            }
            f("param");
            print v;
        "#;

        assert_eq!(
            output_of(source),
            vec!["loop body", "block in f", "param", "method", "field", "global"]
        );
    }

    #[test]
    fn test_inherited_initializer_and_super_init() {
        let source = r#"
            class A {
                init(x) { this.x = x; }
                describe() { return "A" + this.x; }
            }
            class B < A {
                init(x, y) { super.init(x); this.y = y; }
                describe() { return super.describe() + "B" + this.y; }
            }
            class C < A {}
            print B("1", "2").describe();
            print C("3").describe();
        "#;

        assert_eq!(output_of(source), vec!["A1B2", "A3"]);
    }

    #[test]
    fn test_unary_operand_error_keeps_earlier_output() {
        let (output, message) = runtime_error("print 1;\nprint -\"a\";\nprint 2;");

        assert_eq!(output, vec!["1"]);
        assert_eq!(message, "Operand must be a number.");
    }

    #[test]
    fn test_mixed_addition_is_runtime_error() {
        let (output, message) = runtime_error("print 1 + \"a\";");

        assert!(output.is_empty());
        assert_eq!(message, "Operands must be two numbers or two strings.");
    }

    #[test]
    fn test_runtime_error_display() {
        let result = run("var x = 1;\nprint x < \"a\";");

        assert_eq!(
            result.errors[0].to_string(),
            "Operands must be numbers.\n[line 2] at '<'"
        );
    }

    #[test]
    fn test_undefined_variables() {
        assert_eq!(runtime_error("print nope;").1, "Undefined variable 'nope'.");
        assert_eq!(runtime_error("nope = 1;").1, "Undefined variable 'nope'.");
    }

    #[test]
    fn test_call_errors() {
        assert_eq!(
            runtime_error("\"text\"();").1,
            "Can only call functions and classes."
        );
        assert_eq!(
            runtime_error("fun f(a, b) {} f(1);").1,
            "Expected 2 arguments but got 1."
        );
        assert_eq!(
            runtime_error("class A { init(x) {} } A();").1,
            "Expected 1 arguments but got 0."
        );
        assert_eq!(
            runtime_error("class A {} A(1);").1,
            "Expected 0 arguments but got 1."
        );
    }

    #[test]
    fn test_property_errors() {
        assert_eq!(
            runtime_error("class A {} print A().missing;").1,
            "Undefined property 'missing'."
        );
        assert_eq!(
            runtime_error("var n = 1; print n.x;").1,
            "Only instances have properties."
        );
        assert_eq!(
            runtime_error("var n = 1; n.x = 2;").1,
            "Only instances have fields."
        );
        assert_eq!(
            runtime_error("class A {} class B < A { m() { return super.nope; } } B().m();").1,
            "Undefined property 'nope'."
        );
    }

    #[test]
    fn test_superclass_must_be_a_class() {
        assert_eq!(
            runtime_error("var NotClass = 1;\nclass A < NotClass {}").1,
            "Superclass must be a class."
        );
    }

    #[test]
    fn test_superclass_error_points_at_its_name() {
        let result = run("var NotClass = 1;\n{\n  class A < NotClass {}\n}");

        assert_eq!(result.status, Status::RuntimeError);
        assert_eq!(
            result.errors[0].to_string(),
            "Superclass must be a class.\n[line 3] at 'NotClass'"
        );
    }

    #[test]
    fn test_deep_recursion_of_closures_in_methods() {
        let source = r#"
            class Tree {
                init(depth) { this.depth = depth; }
                walk() {
                    var self = this;
                    fun visit(n) {
                        if (n == 0) return self.depth;
                        return visit(n - 1) + 1;
                    }
                    return visit(this.depth);
                }
            }
            print Tree(20).walk();
        "#;

        assert_eq!(output_of(source), vec!["40"]);
    }

    #[test]
    fn test_session_keeps_globals_across_runs() {
        let buffer = SharedBuffer::default();
        let mut interpreter = Interpreter::with_output(buffer.clone());
        let mut errors: Vec<LoxError> = Vec::new();

        let lines = [
            "var a = 1;",
            "fun add(n) { return a + n; }",
            "{ var a = 50; nil(); }",
            "print add(2);",
            "class P { init() { this.v = a; } }",
            "print P().v;",
        ];

        let statuses: Vec<Status> = lines
            .iter()
            .map(|line| rox::run(&mut interpreter, line.as_bytes(), &mut errors))
            .collect();

        assert_eq!(statuses[2], Status::RuntimeError);
        assert_eq!(errors.len(), 1);
        assert_eq!(buffer.lines(), vec!["3", "1"]);
    }

    #[test]
    fn test_static_error_in_session_does_not_run_line() {
        let buffer = SharedBuffer::default();
        let mut interpreter = Interpreter::with_output(buffer.clone());
        let mut errors: Vec<LoxError> = Vec::new();

        let first = rox::run(&mut interpreter, b"print 1; return;", &mut errors);
        let second = rox::run(&mut interpreter, b"print 2;", &mut errors);

        assert_eq!(first, Status::StaticError);
        assert_eq!(second, Status::Completed);
        assert_eq!(buffer.lines(), vec!["2"]);
    }
}
