//! Parser-level invariants and boundary behaviors.

use glint::lexer::Lexer;
use glint::parser::{ParseError, Parser};
use glint::stream::TextStream;

fn parse(src: &str) -> Result<glint::ast::Program, ParseError> {
    Parser::new(Lexer::new(TextStream::new(src)))?.parse()
}

#[test]
fn empty_source_parses_to_an_empty_program() {
    let program = parse("").unwrap();
    assert!(program.statements.is_empty());
}

#[test]
fn trailing_tokens_after_a_complete_program_are_rejected() {
    let result = parse("var x = 1; )");
    assert!(matches!(result, Err(ParseError::InvalidSyntax(_)) | Err(ParseError::MissingExpression(_))));
}

#[test]
fn duplicate_parameter_names_are_rejected() {
    let result = parse("fn f(a, a) { return a; }");
    assert!(matches!(result, Err(ParseError::DuplicateParameters(name, _)) if name == "a"));
}

#[test]
fn duplicate_pattern_binding_names_are_rejected() {
    let result = parse(r#"match (1, 2) { (Num as a, Num as a): print(a); }"#);
    assert!(matches!(result, Err(ParseError::DuplicatePatternNames(name, _)) if name == "a"));
}

#[test]
fn assignment_is_disambiguated_from_bare_identifier_expression() {
    let program = parse("var x = 1; x = 2; x;").unwrap();
    assert_eq!(program.statements.len(), 3);
}

#[test]
fn while_with_empty_statement_body_is_rejected() {
    let result = parse("while (true) ;");
    assert!(matches!(result, Err(ParseError::MissingBody(_, _))));
}

#[test]
fn missing_closing_paren_reports_position() {
    let result = parse("fn f(a, b { return a; }");
    assert!(matches!(result, Err(ParseError::MissingRParen(_))));
}

#[test]
fn nested_function_calls_parse_left_to_right() {
    let program = parse("f()(1)(2, 3);").unwrap();
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn unknown_character_surfaces_as_a_lex_error() {
    let result = parse("var x = 1 @ 2;");
    assert!(matches!(result, Err(ParseError::Lex(_))));
}
