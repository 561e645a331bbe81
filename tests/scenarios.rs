//! End-to-end source-to-output scenarios exercising the full
//! lex/parse/evaluate pipeline through the public `glint` API.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use glint::interpreter::Interpreter;
use glint::lexer::Lexer;
use glint::parser::Parser;
use glint::stream::TextStream;

#[derive(Clone)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn run(src: &str) -> String {
    let lexer = Lexer::new(TextStream::new(src));
    let program = Parser::new(lexer).expect("lexer primes on a valid first token").parse().expect("source parses");
    let buffer = SharedBuffer(Rc::new(RefCell::new(Vec::new())));
    let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));
    interpreter.run(&program).expect("source evaluates without error");
    String::from_utf8(buffer.0.borrow().clone()).unwrap()
}

#[test]
fn empty_source_produces_no_output() {
    assert_eq!(run(""), "");
}

#[test]
fn arithmetic_coercion() {
    let out = run(r#"print(1+2); print("5"+3); print(7+"2a"); print("hello"+12); print(7/2);"#);
    assert_eq!(out, "3\n8\n72a\nhello12\n3.5\n");
}

#[test]
fn control_flow_and_closures() {
    let out = run("fn make(n){ return fn(){ return n; }; } var f = make(42); print(f());");
    assert_eq!(out, "42\n");
}

#[test]
fn while_loop() {
    let out = run("var i=0; while (i<3) { print(i); i = i+1; }");
    assert_eq!(out, "0\n1\n2\n");
}

#[test]
fn match_with_type_compare_and_wildcard_patterns() {
    let src = r#"
        fn classify(v) {
          match (v) {
            (Num and >0): return "positive";
            (Num and 0): return "zero";
            (Str as s) if (s == "hi"): return "greet";
            (_): return "other";
          }
        }
        print(classify(5));
        print(classify(0));
        print(classify("hi"));
        print(classify(nil));
    "#;
    assert_eq!(run(src), "positive\nzero\ngreet\nother\n");
}

#[test]
fn two_argument_match_with_binding() {
    let src = r#"
        match (3, 4) {
          (Num as a, Num as b) if (a < b): print("<");
          (Num as a, Num as b) if (a > b): print(">");
          (_, _): print("=");
        }
    "#;
    assert_eq!(run(src), "<\n");
}

#[test]
fn const_redefinition_is_reported_as_an_error() {
    let lexer = Lexer::new(TextStream::new("const x = 1; x = 2;"));
    let program = Parser::new(lexer).unwrap().parse().unwrap();
    let mut interpreter = Interpreter::with_output(Box::new(Vec::new()));
    let err = interpreter.run(&program).unwrap_err();
    assert_eq!(format!("{err}"), "ConstantRedefinition: Cannot redefine constant 'x'");
}

#[test]
fn function_can_shadow_itself_when_redeclared() {
    let out = run("fn f(){ return 1; } fn f(){ return 2; } print(f());");
    assert_eq!(out, "2\n");
}

#[test]
fn match_falls_through_silently_when_no_case_matches() {
    let out = run(r#"match (nil) { (Num): print("never"); }"#);
    assert_eq!(out, "");
}

#[test]
fn nested_closures_each_capture_their_own_scope() {
    let src = r#"
        fn counter() {
          var n = 0;
          return fn() { n = n + 1; return n; };
        }
        var a = counter();
        var b = counter();
        print(a()); print(a()); print(b());
    "#;
    assert_eq!(run(src), "1\n2\n1\n");
}
