#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::error::LoxError;
use rox::interpreter::Interpreter;
use rox::Status;

/// Writer whose bytes stay readable after the interpreter takes ownership.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.borrow().clone())
            .expect("interpreter output is UTF-8")
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Everything observable about one program run.
pub struct Run {
    pub status: Status,
    pub output: Vec<String>,
    pub errors: Vec<LoxError>,
}

impl Run {
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(LoxError::message).collect()
    }
}

/// Run `source` on a fresh interpreter, capturing output and errors.
pub fn run(source: &str) -> Run {
    let buffer = SharedBuffer::default();
    let mut interpreter = Interpreter::with_output(buffer.clone());
    let mut errors: Vec<LoxError> = Vec::new();

    let status = rox::run(&mut interpreter, source.as_bytes(), &mut errors);

    Run {
        status,
        output: buffer.lines(),
        errors,
    }
}

/// Run `source`, asserting it completes, and return its printed lines.
pub fn output_of(source: &str) -> Vec<String> {
    let result = run(source);

    assert_eq!(
        result.status,
        Status::Completed,
        "unexpected errors: {:?}",
        result.messages()
    );

    result.output
}
