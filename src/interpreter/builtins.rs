//! Host-provided callables. `print` is the only one the language exposes.

use std::io::Write;

use super::error::RuntimeError;
use super::value::{Callable, Value};
use super::Interpreter;

#[derive(Debug)]
pub struct PrintFunction;

impl Callable for PrintFunction {
    fn name(&self) -> &str {
        "print"
    }

    fn arity(&self) -> Option<usize> {
        None
    }

    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let rendered: Vec<String> = args.iter().map(Value::stringify).collect();
        let _ = writeln!(interpreter.output, "{}", rendered.join(" "));
        Ok(Value::Nil)
    }
}
