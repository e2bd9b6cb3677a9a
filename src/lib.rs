pub mod ast;
pub mod ast_printer;
pub mod class;
pub mod environment;
pub mod error;
pub mod function;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use error::ErrorSink;
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// How far a source text got through [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Completed,
    /// Lexical, syntax or static errors; nothing was executed.
    StaticError,
    /// Execution started and stopped at a runtime error.
    RuntimeError,
}

/// Scan, parse, resolve and execute `source` on `interpreter`.  Every error
/// goes to `sink`.  A program with any static error is not executed.
pub fn run(interpreter: &mut Interpreter, source: &[u8], sink: &mut dyn ErrorSink) -> Status {
    let mut static_errors: Vec<error::LoxError> = Vec::new();

    let tokens = Scanner::new(source).scan_tokens(&mut static_errors);
    let statements = Parser::new(tokens).parse(&mut static_errors);

    let mut had_static_error = !static_errors.is_empty();
    for e in static_errors {
        sink.report(e);
    }

    // Resolve even after syntax errors so every static error shows up at once.
    if !Resolver::new(interpreter, sink).resolve(&statements) {
        had_static_error = true;
    }

    if had_static_error {
        return Status::StaticError;
    }

    match interpreter.interpret(&statements) {
        Ok(()) => Status::Completed,
        Err(e) => {
            sink.report(e);
            Status::RuntimeError
        }
    }
}
