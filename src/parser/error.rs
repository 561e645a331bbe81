//! Parser error taxonomy: a closed enumeration, every variant carrying
//! the position of the offending token.

use std::fmt;

use crate::lexer::LexError;
use crate::stream::Position;

/// The statement construct a missing condition/body belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    If,
    While,
    Else,
    Case,
    Function,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Construct::If => "if",
            Construct::While => "while",
            Construct::Else => "else",
            Construct::Case => "case",
            Construct::Function => "function",
        };
        f.write_str(s)
    }
}

/// What kind of identifier was expected and missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierContext {
    Declaration,
    Parameter,
    FunctionName,
    AsBinding,
}

impl fmt::Display for IdentifierContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IdentifierContext::Declaration => "variable declaration",
            IdentifierContext::Parameter => "parameter list",
            IdentifierContext::FunctionName => "function declaration",
            IdentifierContext::AsBinding => "'as' binding",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    Lex(LexError),
    MissingLParen(Position),
    MissingRParen(Position),
    MissingLBrace(Position),
    MissingRBrace(Position),
    MissingSemicolon(Position),
    MissingColon(Position),
    MissingExpression(Position),
    MissingCondition(Construct, Position),
    MissingBody(Construct, Position),
    MissingPattern(Position),
    MissingArgument(Position),
    MissingIdentifier(IdentifierContext, Position),
    DuplicateParameters(String, Position),
    DuplicatePatternNames(String, Position),
    InvalidSyntax(Position),
}

impl From<LexError> for ParseError {
    fn from(value: LexError) -> Self {
        ParseError::Lex(value)
    }
}

impl ParseError {
    pub fn position(&self) -> &Position {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::MissingLParen(p)
            | ParseError::MissingRParen(p)
            | ParseError::MissingLBrace(p)
            | ParseError::MissingRBrace(p)
            | ParseError::MissingSemicolon(p)
            | ParseError::MissingColon(p)
            | ParseError::MissingExpression(p)
            | ParseError::MissingPattern(p)
            | ParseError::MissingArgument(p)
            | ParseError::InvalidSyntax(p) => p,
            ParseError::MissingCondition(_, p) | ParseError::MissingBody(_, p) => p,
            ParseError::MissingIdentifier(_, p) => p,
            ParseError::DuplicateParameters(_, p) | ParseError::DuplicatePatternNames(_, p) => p,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ParseError::Lex(_) => "LexError",
            ParseError::MissingLParen(_) => "MissingLParen",
            ParseError::MissingRParen(_) => "MissingRParen",
            ParseError::MissingLBrace(_) => "MissingLBrace",
            ParseError::MissingRBrace(_) => "MissingRBrace",
            ParseError::MissingSemicolon(_) => "MissingSemicolon",
            ParseError::MissingColon(_) => "MissingColon",
            ParseError::MissingExpression(_) => "MissingExpression",
            ParseError::MissingCondition(_, _) => "MissingCondition",
            ParseError::MissingBody(_, _) => "MissingBody",
            ParseError::MissingPattern(_) => "MissingPattern",
            ParseError::MissingArgument(_) => "MissingArgument",
            ParseError::MissingIdentifier(_, _) => "MissingIdentifier",
            ParseError::DuplicateParameters(_, _) => "DuplicateParameters",
            ParseError::DuplicatePatternNames(_, _) => "DuplicatePatternNames",
            ParseError::InvalidSyntax(_) => "InvalidSyntax",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.kind_name())?;
        match self {
            ParseError::Lex(e) => write!(f, "{e}"),
            ParseError::MissingLParen(_) => write!(f, "expected '('"),
            ParseError::MissingRParen(_) => write!(f, "expected ')'"),
            ParseError::MissingLBrace(_) => write!(f, "expected '{{'"),
            ParseError::MissingRBrace(_) => write!(f, "expected '}}'"),
            ParseError::MissingSemicolon(_) => write!(f, "expected ';'"),
            ParseError::MissingColon(_) => write!(f, "expected ':'"),
            ParseError::MissingExpression(_) => write!(f, "expected an expression"),
            ParseError::MissingCondition(c, _) => write!(f, "expected a condition after '{c}'"),
            ParseError::MissingBody(c, _) => write!(f, "expected a body for '{c}'"),
            ParseError::MissingPattern(_) => write!(f, "expected a pattern"),
            ParseError::MissingArgument(_) => write!(f, "expected an argument"),
            ParseError::MissingIdentifier(ctx, _) => {
                write!(f, "expected an identifier in {ctx}")
            }
            ParseError::DuplicateParameters(name, _) => {
                write!(f, "duplicate parameter name '{name}'")
            }
            ParseError::DuplicatePatternNames(name, _) => {
                write!(f, "duplicate pattern binding name '{name}'")
            }
            ParseError::InvalidSyntax(_) => write!(f, "unexpected trailing input"),
        }
    }
}

impl std::error::Error for ParseError {}
