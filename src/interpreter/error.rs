//! Runtime error taxonomy: every variant carries the position of the AST
//! node whose evaluation failed.

use std::fmt;

use crate::stream::Position;

use super::environment::EnvError;

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    UndefinedVariable { name: String, position: Position },
    UndefinedFunction { name: String, position: Position },
    Redefinition { name: String, position: Position },
    ConstantRedefinition { name: String, position: Position },
    NumberConversion { position: Position },
    DivisionByZero { position: Position },
    InvalidArgumentNumber { expected: Option<usize>, found: usize, position: Position },
    /// A `return` unwind reached the top-level driver instead of a call
    /// boundary. Surfaced as an error rather than silently accepted.
    ReturnOutsideFunction { position: Position },
}

impl RuntimeError {
    /// Attaches a position to a positionless `EnvError` raised by a
    /// variable lookup, assignment, or declaration.
    pub fn from_env(err: EnvError, position: &Position) -> Self {
        let position = position.clone();
        match err {
            EnvError::Undefined(name) => RuntimeError::UndefinedVariable { name, position },
            EnvError::Redefinition(name) => RuntimeError::Redefinition { name, position },
            EnvError::ConstantRedefinition(name) => RuntimeError::ConstantRedefinition { name, position },
        }
    }

    pub fn position(&self) -> &Position {
        match self {
            RuntimeError::UndefinedVariable { position, .. }
            | RuntimeError::UndefinedFunction { position, .. }
            | RuntimeError::Redefinition { position, .. }
            | RuntimeError::ConstantRedefinition { position, .. }
            | RuntimeError::NumberConversion { position }
            | RuntimeError::DivisionByZero { position }
            | RuntimeError::InvalidArgumentNumber { position, .. }
            | RuntimeError::ReturnOutsideFunction { position } => position,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            RuntimeError::UndefinedVariable { .. } => "UndefinedVariable",
            RuntimeError::UndefinedFunction { .. } => "UndefinedFunction",
            RuntimeError::Redefinition { .. } => "Redefinition",
            RuntimeError::ConstantRedefinition { .. } => "ConstantRedefinition",
            RuntimeError::NumberConversion { .. } => "NumberConversion",
            RuntimeError::DivisionByZero { .. } => "DivisionByZero",
            RuntimeError::InvalidArgumentNumber { .. } => "InvalidArgumentNumber",
            RuntimeError::ReturnOutsideFunction { .. } => "ReturnOutsideFunction",
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.kind_name())?;
        match self {
            RuntimeError::UndefinedVariable { name, .. } => write!(f, "undefined variable '{name}'"),
            RuntimeError::UndefinedFunction { name, .. } => write!(f, "'{name}' is not callable"),
            RuntimeError::Redefinition { name, .. } => write!(f, "'{name}' is already defined in this scope"),
            RuntimeError::ConstantRedefinition { name, .. } => write!(f, "Cannot redefine constant '{name}'"),
            RuntimeError::NumberConversion { .. } => write!(f, "value cannot be interpreted as a number"),
            RuntimeError::DivisionByZero { .. } => write!(f, "division by zero"),
            RuntimeError::InvalidArgumentNumber { expected, found, .. } => match expected {
                Some(expected) => write!(f, "expected {expected} argument(s), found {found}"),
                None => write!(f, "wrong number of arguments ({found} given)"),
            },
            RuntimeError::ReturnOutsideFunction { .. } => write!(f, "return outside of function"),
        }
    }
}

impl std::error::Error for RuntimeError {}
