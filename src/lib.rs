//! Library surface: wires `Stream` → `Lexer` → `Parser` → `Interpreter`
//! behind two small entry points, [`run_source`] and [`run_file`].

pub mod ast;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod stream;

use std::fmt;
use std::path::Path;

use interpreter::{Interpreter, RuntimeError};
use lexer::{LexError, Lexer};
use parser::{ParseError, Parser};
use stream::{FileStream, Position, TextStream};

/// Any failure from opening a script, lexing, parsing, or evaluating a
/// program.
#[derive(Debug)]
pub enum GlintError {
    Io(std::io::Error),
    Lex(LexError),
    Parse(ParseError),
    Runtime(RuntimeError),
}

impl GlintError {
    /// `None` only for `Io`, which has no source position to report.
    pub fn position(&self) -> Option<&Position> {
        match self {
            GlintError::Io(_) => None,
            GlintError::Lex(e) => Some(e.position()),
            GlintError::Parse(e) => Some(e.position()),
            GlintError::Runtime(e) => Some(e.position()),
        }
    }
}

impl From<std::io::Error> for GlintError {
    fn from(value: std::io::Error) -> Self {
        GlintError::Io(value)
    }
}

impl From<LexError> for GlintError {
    fn from(value: LexError) -> Self {
        GlintError::Lex(value)
    }
}

impl From<ParseError> for GlintError {
    fn from(value: ParseError) -> Self {
        GlintError::Parse(value)
    }
}

impl From<RuntimeError> for GlintError {
    fn from(value: RuntimeError) -> Self {
        GlintError::Runtime(value)
    }
}

impl fmt::Display for GlintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlintError::Io(e) => write!(f, "Io: {e}"),
            GlintError::Lex(e) => write!(f, "{e}"),
            GlintError::Parse(e) => write!(f, "{e}"),
            GlintError::Runtime(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for GlintError {}

/// Lexes, parses, and evaluates `source` as a complete program, writing
/// `print` output to stdout.
pub fn run_source(source: &str) -> Result<(), GlintError> {
    let lexer = Lexer::new(TextStream::new(source));
    let program = Parser::new(lexer)?.parse()?;
    let mut interpreter = Interpreter::new();
    interpreter.run(&program)?;
    Ok(())
}

/// Opens `path`, runs it as a complete program, and releases the handle
/// on every exit path (success, parse failure, or runtime error) since
/// `FileStream` owns it for only as long as this call runs.
pub fn run_file(path: impl AsRef<Path>) -> Result<(), GlintError> {
    let stream = FileStream::open(path.as_ref())?;
    let lexer = Lexer::new(stream);
    let program = Parser::new(lexer)?.parse()?;
    let mut interpreter = Interpreter::new();
    interpreter.run(&program)?;
    Ok(())
}
