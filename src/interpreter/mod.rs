//! AST → runtime effects: a tree-walking evaluator over a lexically
//! scoped environment chain.

pub mod builtins;
pub mod environment;
pub mod error;
pub mod value;

pub use error::RuntimeError;
pub use value::Value;

use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, trace};

use crate::ast::{BinaryOp, Case, Expr, LiteralValue, LogicalOp, Program, Stmt, TypeKind, UnaryOp};
use crate::stream::Position;

use builtins::PrintFunction;
use environment::Environment;
use value::{Callable, Number, UserFunction};

/// What a statement's execution did, distinct from a genuine error: either
/// it ran to completion, or a `return` is unwinding toward the nearest
/// enclosing call.
enum Flow {
    Next,
    Return(Value),
}

pub struct Interpreter {
    globals: Environment,
    pub(crate) output: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(output: Box<dyn Write>) -> Self {
        let globals = Environment::global();
        globals
            .define_function("print".to_string(), Value::Callable(Rc::new(PrintFunction)))
            .expect("the global scope is empty when print is registered");
        Self { globals, output }
    }

    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        debug!("running program with {} top-level statement(s)", program.statements.len());
        let globals = self.globals.clone();
        for stmt in &program.statements {
            match self.exec_stmt(stmt, &globals)? {
                Flow::Next => {}
                Flow::Return(_) => {
                    return Err(RuntimeError::ReturnOutsideFunction {
                        position: stmt.position().clone(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Entry point used by `UserFunction::call`: runs a function body and
    /// turns a `Return` unwind into its value, or `nil` if the block fell
    /// through without one.
    pub(crate) fn exec_function_body(&mut self, body: &Stmt, env: &Environment) -> Result<Value, RuntimeError> {
        match self.exec_stmt(body, env)? {
            Flow::Next => Ok(Value::Nil),
            Flow::Return(value) => Ok(value),
        }
    }

    // --- statements ----------------------------------------------------------

    fn exec_stmt(&mut self, stmt: &Stmt, env: &Environment) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Block { statements, .. } => {
                let block_env = Environment::child(env);
                for statement in statements {
                    match self.exec_stmt(statement, &block_env)? {
                        Flow::Next => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Next)
            }
            Stmt::Function { name, params, block, position } => {
                let function = UserFunction {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::new((**block).clone()),
                    closure: env.clone(),
                };
                env.define_function(name.clone(), Value::Callable(Rc::new(function)))
                    .map_err(|e| RuntimeError::from_env(e, position))?;
                Ok(Flow::Next)
            }
            Stmt::Variable { name, expr, is_const, position } => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Nil,
                };
                env.define(name.clone(), value, *is_const)
                    .map_err(|e| RuntimeError::from_env(e, position))?;
                Ok(Flow::Next)
            }
            Stmt::If { condition, body, else_body, .. } => {
                if self.eval_expr(condition, env)?.is_truthy() {
                    self.exec_stmt(body, env)
                } else if let Some(else_body) = else_body {
                    self.exec_stmt(else_body, env)
                } else {
                    Ok(Flow::Next)
                }
            }
            Stmt::While { condition, body, .. } => {
                while self.eval_expr(condition, env)?.is_truthy() {
                    match self.exec_stmt(body, env)? {
                        Flow::Next => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Next)
            }
            Stmt::Return { expr, .. } => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Match { arguments, cases, position } => self.exec_match(arguments, cases, env, position),
            Stmt::Expression { expr, .. } => {
                self.eval_expr(expr, env)?;
                Ok(Flow::Next)
            }
        }
    }

    fn exec_match(
        &mut self,
        arguments: &[Expr],
        cases: &[Case],
        env: &Environment,
        position: &Position,
    ) -> Result<Flow, RuntimeError> {
        let values: Vec<Value> = arguments
            .iter()
            .map(|arg| self.eval_expr(arg, env))
            .collect::<Result<_, _>>()?;

        'cases: for case in cases {
            if case.patterns.len() != values.len() {
                return Err(RuntimeError::InvalidArgumentNumber {
                    expected: Some(values.len()),
                    found: case.patterns.len(),
                    position: position.clone(),
                });
            }

            let case_env = Environment::child(env);
            for (pattern_expr, value) in case.patterns.iter().zip(&values) {
                let matched = match &pattern_expr.pattern {
                    None => true,
                    Some(pattern) => self.pattern_matches(pattern, value, &case_env)?,
                };
                if !matched {
                    continue 'cases;
                }
                if let Some(name) = &pattern_expr.name {
                    case_env
                        .define(name.clone(), value.clone(), false)
                        .map_err(|e| RuntimeError::from_env(e, &pattern_expr.position))?;
                }
            }

            if let Some(guard) = &case.guard {
                if !self.eval_expr(guard, &case_env)?.is_truthy() {
                    continue 'cases;
                }
            }

            return self.exec_stmt(&case.body, &case_env);
        }

        Ok(Flow::Next)
    }

    fn pattern_matches(&mut self, pattern: &Expr, value: &Value, env: &Environment) -> Result<bool, RuntimeError> {
        match pattern {
            Expr::TypePattern { type_kind, .. } => Ok(match type_kind {
                TypeKind::Str => matches!(value, Value::Str(_)),
                TypeKind::Num => value.is_number(),
                TypeKind::Bool => matches!(value, Value::Bool(_)),
                TypeKind::Nil => matches!(value, Value::Nil),
                TypeKind::Func => matches!(value, Value::Callable(_)),
            }),
            Expr::ComparePattern { op, right, .. } => {
                let rhs = self.eval_expr(right, env)?;
                self.compare(*op, value, &rhs, pattern.position())
            }
            Expr::Logical { left, op, right, .. } => {
                let left_matches = self.pattern_matches(left, value, env)?;
                match op {
                    LogicalOp::And => {
                        if !left_matches {
                            return Ok(false);
                        }
                        self.pattern_matches(right, value, env)
                    }
                    LogicalOp::Or => {
                        if left_matches {
                            return Ok(true);
                        }
                        self.pattern_matches(right, value, env)
                    }
                }
            }
            other => unreachable!("parser never produces {other:?} as pattern content"),
        }
    }

    // --- expressions -----------------------------------------------------------

    fn eval_expr(&mut self, expr: &Expr, env: &Environment) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal { value, .. } => Ok(match value {
                LiteralValue::Int(i) => Value::Int(*i),
                LiteralValue::Float(f) => Value::Float(*f),
                LiteralValue::Str(s) => Value::Str(s.clone()),
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Nil => Value::Nil,
            }),
            Expr::Identifier { name, position } => {
                env.get(name).map_err(|e| RuntimeError::from_env(e, position))
            }
            Expr::Grouping { inner, .. } => self.eval_expr(inner, env),
            Expr::Unary { op, right, position } => {
                let value = self.eval_expr(right, env)?;
                match op {
                    UnaryOp::Minus => {
                        let n = value
                            .to_number()
                            .ok_or_else(|| RuntimeError::NumberConversion { position: position.clone() })?;
                        Ok(match n {
                            Number::Int(i) => Value::Int(-i),
                            Number::Float(f) => Value::Float(-f),
                        })
                    }
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                }
            }
            Expr::Binary { left, op, right, position } => {
                let left = self.eval_expr(left, env)?;
                let right = self.eval_expr(right, env)?;
                self.eval_binary(*op, left, right, position)
            }
            Expr::Logical { left, op, right, .. } => {
                let left_value = self.eval_expr(left, env)?;
                match op {
                    LogicalOp::Or if left_value.is_truthy() => Ok(left_value),
                    LogicalOp::Or => self.eval_expr(right, env),
                    LogicalOp::And if !left_value.is_truthy() => Ok(left_value),
                    LogicalOp::And => self.eval_expr(right, env),
                }
            }
            Expr::Assignment { name, value, position } => {
                let value = self.eval_expr(value, env)?;
                env.assign(name, value.clone())
                    .map_err(|e| RuntimeError::from_env(e, position))?;
                Ok(value)
            }
            Expr::Call { callee, args, position } => self.eval_call(callee, args, env, position),
            Expr::ComparePattern { .. } | Expr::TypePattern { .. } => {
                unreachable!("pattern nodes are only evaluated through pattern_matches")
            }
        }
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr], env: &Environment, position: &Position) -> Result<Value, RuntimeError> {
        let callee_value = self.eval_expr(callee, env)?;
        let argument_values: Vec<Value> = args
            .iter()
            .map(|arg| self.eval_expr(arg, env))
            .collect::<Result<_, _>>()?;

        let Value::Callable(callable) = callee_value else {
            let name = match callee {
                Expr::Identifier { name, .. } => name.clone(),
                _ => callee_value.stringify(),
            };
            return Err(RuntimeError::UndefinedFunction { name, position: position.clone() });
        };

        if let Some(arity) = callable.arity() {
            if arity != argument_values.len() {
                return Err(RuntimeError::InvalidArgumentNumber {
                    expected: Some(arity),
                    found: argument_values.len(),
                    position: position.clone(),
                });
            }
        }

        trace!("calling '{}' with {} argument(s)", callable.name(), argument_values.len());
        callable.call(self, argument_values)
    }

    /// Binary arithmetic and comparison semantics, including the
    /// mixed-type fallbacks to numeric coercion or stringification.
    fn eval_binary(&self, op: BinaryOp, left: Value, right: Value, position: &Position) -> Result<Value, RuntimeError> {
        use BinaryOp::*;
        match op {
            Minus | Star | Slash => {
                let l = left
                    .to_number()
                    .ok_or_else(|| RuntimeError::NumberConversion { position: position.clone() })?;
                let r = right
                    .to_number()
                    .ok_or_else(|| RuntimeError::NumberConversion { position: position.clone() })?;
                match op {
                    Minus => Ok(combine(l, r, |a, b| a - b, |a, b| a - b)),
                    Star => Ok(combine(l, r, |a, b| a * b, |a, b| a * b)),
                    Slash => {
                        if r.as_f64() == 0.0 {
                            Err(RuntimeError::DivisionByZero { position: position.clone() })
                        } else {
                            Ok(Value::Float(l.as_f64() / r.as_f64()))
                        }
                    }
                    _ => unreachable!(),
                }
            }
            Plus => self.eval_plus(left, right),
            EqualEqual | BangEqual | Less | LessEqual | Greater | GreaterEqual => {
                self.compare(op, &left, &right, position)
                    .map(Value::Bool)
            }
        }
    }

    fn eval_plus(&self, left: Value, right: Value) -> Result<Value, RuntimeError> {
        if let (Value::Str(l), Value::Str(r)) = (&left, &right) {
            return Ok(Value::Str(format!("{l}{r}")));
        }
        match (left.to_number(), right.to_number()) {
            (Some(l), Some(r)) => Ok(combine(l, r, |a, b| a + b, |a, b| a + b)),
            _ => Ok(Value::Str(format!("{}{}", left.stringify(), right.stringify()))),
        }
    }

    /// Shared by `==`/`!=`/`<`/`<=`/`>`/`>=` and by `ComparePattern`.
    /// Like-typed equality is structural; everything else falls back to
    /// numeric coercion, then lexicographic string comparison.
    fn compare(&self, op: BinaryOp, left: &Value, right: &Value, _position: &Position) -> Result<bool, RuntimeError> {
        let same_type = std::mem::discriminant(left) == std::mem::discriminant(right);

        if same_type && matches!(op, BinaryOp::EqualEqual | BinaryOp::BangEqual) {
            let equal = left == right;
            return Ok(if op == BinaryOp::EqualEqual { equal } else { !equal });
        }

        if left.is_number() && right.is_number() {
            let l = left.to_number().expect("numeric value always coerces").as_f64();
            let r = right.to_number().expect("numeric value always coerces").as_f64();
            return Ok(apply_ordering(op, l.partial_cmp(&r)));
        }

        if let (Value::Str(l), Value::Str(r)) = (left, right) {
            return Ok(apply_ordering(op, l.partial_cmp(r)));
        }

        if let (Some(l), Some(r)) = (left.to_number(), right.to_number()) {
            return Ok(apply_ordering(op, l.as_f64().partial_cmp(&r.as_f64())));
        }

        let l = left.stringify();
        let r = right.stringify();
        Ok(apply_ordering(op, l.partial_cmp(&r)))
    }
}

/// Applies an integer op when both operands came from integers, else
/// falls back to the float op — the integer/float distinction persists
/// through `+`, `-`, `*` (only `/` always yields a float).
fn combine(left: Number, right: Number, int_op: fn(i64, i64) -> i64, float_op: fn(f64, f64) -> f64) -> Value {
    match (left, right) {
        (Number::Int(a), Number::Int(b)) => Value::Int(int_op(a, b)),
        _ => Value::Float(float_op(left.as_f64(), right.as_f64())),
    }
}

fn apply_ordering(op: BinaryOp, ordering: Option<std::cmp::Ordering>) -> bool {
    use std::cmp::Ordering::*;
    let Some(ordering) = ordering else { return false };
    match op {
        BinaryOp::EqualEqual => ordering == Equal,
        BinaryOp::BangEqual => ordering != Equal,
        BinaryOp::Less => ordering == Less,
        BinaryOp::LessEqual => ordering != Greater,
        BinaryOp::Greater => ordering == Greater,
        BinaryOp::GreaterEqual => ordering != Less,
        BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Star | BinaryOp::Slash => {
            unreachable!("apply_ordering is only called with comparison operators")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::stream::TextStream;

    fn run(src: &str) -> String {
        let lexer = Lexer::new(TextStream::new(src));
        let program = Parser::new(lexer).unwrap().parse().unwrap();
        let buffer: Rc<std::cell::RefCell<Vec<u8>>> = Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut interpreter = Interpreter::with_output(Box::new(SharedBuffer(buffer.clone())));
        interpreter.run(&program).unwrap();
        String::from_utf8(buffer.borrow().clone()).unwrap()
    }

    struct SharedBuffer(Rc<std::cell::RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn arithmetic_coercion_scenario() {
        let out = run(r#"print(1+2); print("5"+3); print(7+"2a"); print("hello"+12); print(7/2);"#);
        assert_eq!(out, "3\n8\n72a\nhello12\n3.5\n");
    }

    #[test]
    fn closures_capture_declaration_environment() {
        let out = run("fn make(n){ return fn(){ return n; }; } var f = make(42); print(f());");
        assert_eq!(out, "42\n");
    }

    #[test]
    fn while_loop_scenario() {
        let out = run("var i=0; while (i<3) { print(i); i = i+1; }");
        assert_eq!(out, "0\n1\n2\n");
    }

    #[test]
    fn match_type_compare_and_wildcard_patterns() {
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
    fn const_reassignment_is_an_error() {
        let lexer = Lexer::new(TextStream::new("const x = 1; x = 2;"));
        let program = Parser::new(lexer).unwrap().parse().unwrap();
        let mut interpreter = Interpreter::with_output(Box::new(Vec::new()));
        let err = interpreter.run(&program).unwrap_err();
        assert!(matches!(err, RuntimeError::ConstantRedefinition { name, .. } if name == "x"));
    }

    #[test]
    fn short_circuit_or_skips_right_side() {
        let out = run(r#"fn boom(){ print("boom"); return true; } var r = true or boom();"#);
        assert_eq!(out, "");
    }

    #[test]
    fn block_scope_does_not_leak() {
        let src = "var x = 1; { var y = 2; } print(x); print(y);";
        let lexer = Lexer::new(TextStream::new(src));
        let program = Parser::new(lexer).unwrap().parse().unwrap();
        let mut interpreter = Interpreter::with_output(Box::new(Vec::new()));
        let err = interpreter.run(&program).unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedVariable { name, .. } if name == "y"));
    }
}
