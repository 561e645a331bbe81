//! Invariants that must hold for any input, not just the examples above.

use glint::lexer::{Lexer, TokenType};
use glint::stream::{Stream, TextStream};

fn lex_all(src: &str) -> Vec<glint::lexer::Token> {
    let mut lexer = Lexer::new(TextStream::new(src));
    let mut tokens = vec![];
    loop {
        let token = lexer.next_token().expect("fixture sources are lexically valid");
        let is_eof = token.is(TokenType::Eof);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    tokens
}

#[test]
fn position_monotonicity_across_arbitrary_text() {
    let mut stream = TextStream::new("fn foo(a, b) {\n  return a + b;\n}\n");
    let mut last_offset = stream.position().offset;
    while let Some(_) = stream.advance() {
        assert!(stream.position().offset >= last_offset);
        last_offset = stream.position().offset;
    }
}

#[test]
fn line_only_increases_across_newlines() {
    let mut stream = TextStream::new("a b\nc\nd e f");
    let mut last_line = stream.position().line;
    let mut saw_newline_since_last_check = false;
    while let Some(c) = stream.advance() {
        if stream.position().line != last_line {
            assert!(saw_newline_since_last_check, "line advanced without crossing a newline");
        }
        saw_newline_since_last_check = c == '\n';
        last_line = stream.position().line;
    }
}

#[test]
fn token_position_is_lexeme_start() {
    let tokens = lex_all("  fn   bar");
    assert_eq!(tokens[0].kind, TokenType::Fn);
    assert_eq!(tokens[0].position.column, 3);
    assert_eq!(tokens[1].position.column, 8);
}

#[test]
fn eof_is_idempotent_across_many_calls() {
    let mut lexer = Lexer::new(TextStream::new("var x;"));
    for _ in 0..5 {
        let _ = lexer.next_token();
    }
    assert_eq!(lexer.next_token().unwrap().kind, TokenType::Eof);
    assert_eq!(lexer.next_token().unwrap().kind, TokenType::Eof);
}

#[test]
fn comment_filter_transparency() {
    use glint::lexer::CommentFilter;

    let src = "var x = 1; // assign\nvar y = 2;";
    let raw = lex_all(src);
    let without_comments: Vec<_> = raw.iter().filter(|t| t.kind != TokenType::Comment).cloned().collect();

    let mut filter = CommentFilter::new(Lexer::new(TextStream::new(src)));
    let mut filtered = vec![];
    loop {
        let token = filter.next_token().unwrap();
        let is_eof = token.kind == TokenType::Eof;
        filtered.push(token);
        if is_eof {
            break;
        }
    }

    assert_eq!(filtered, without_comments);
}

#[test]
fn empty_source_yields_only_eof() {
    let tokens = lex_all("");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenType::Eof);
}

#[test]
fn unterminated_string_reports_opening_quote_position() {
    let mut lexer = Lexer::new(TextStream::new("var x = \"abc"));
    loop {
        match lexer.next_token() {
            Ok(t) if t.kind == TokenType::String => panic!("expected failure before a closed string"),
            Ok(_) => continue,
            Err(e) => {
                assert!(format!("{e}").starts_with("UnterminatedString"));
                break;
            }
        }
    }
}
