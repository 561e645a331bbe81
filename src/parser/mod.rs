//! Tokens → AST. Recursive descent with a Pratt-style precedence climb
//! for expressions and a one-slot push-back queue that disambiguates
//! `IDENT "=" ...` (assignment) from a bare identifier expression.

pub mod error;

pub use error::{Construct, IdentifierContext, ParseError};

use log::{debug, trace};

use crate::ast::expr::{BinaryOp, LiteralValue, LogicalOp, Parameter, PatternExpr, TypeKind, UnaryOp};
use crate::ast::stmt::Case;
use crate::ast::{Expr, Program, Stmt};
use crate::lexer::{CommentFilter, Lexer, Literal, Token, TokenType};
use crate::stream::{Position, Stream};

pub struct Parser<S: Stream> {
    lexer: CommentFilter<S>,
    current: Token,
    pushback: Option<Token>,
}

impl<S: Stream> Parser<S> {
    pub fn new(lexer: Lexer<S>) -> Result<Self, ParseError> {
        let mut filtered = CommentFilter::new(lexer);
        let current = filtered.next_token()?;
        Ok(Self {
            lexer: filtered,
            current,
            pushback: None,
        })
    }

    /// Parses a complete program. Leaves `current` at `EOF` on success.
    pub fn parse(mut self) -> Result<Program, ParseError> {
        debug!("parsing program");
        let mut statements = vec![];
        while !self.current.is(TokenType::Eof) {
            statements.push(self.parse_statement()?);
        }
        if !self.current.is(TokenType::Eof) {
            return Err(ParseError::InvalidSyntax(self.current.position.clone()));
        }
        trace!("parsed {} top-level statement(s)", statements.len());
        Ok(Program::new(statements))
    }

    // --- token-stream plumbing -------------------------------------------------

    fn bump(&mut self) -> Result<Token, ParseError> {
        let old = std::mem::replace(
            &mut self.current,
            match self.pushback.take() {
                Some(t) => t,
                None => self.lexer.next_token()?,
            },
        );
        Ok(old)
    }

    /// Restores `token` as `current`, pushing the token that was current
    /// onto the one-slot push-back queue.
    fn push_back(&mut self, token: Token) {
        debug_assert!(self.pushback.is_none(), "push-back queue holds at most one token");
        self.pushback = Some(std::mem::replace(&mut self.current, token));
    }

    fn check(&self, kind: TokenType) -> bool {
        self.current.is(kind)
    }

    fn match_token(&mut self, kind: TokenType) -> Result<Option<Token>, ParseError> {
        if self.check(kind) {
            Ok(Some(self.bump()?))
        } else {
            Ok(None)
        }
    }

    fn expect(&mut self, kind: TokenType, err: impl FnOnce(Position) -> ParseError) -> Result<Token, ParseError> {
        if self.check(kind) {
            self.bump()
        } else {
            Err(err(self.current.position.clone()))
        }
    }

    fn expect_identifier(&mut self, ctx: IdentifierContext) -> Result<(String, Position), ParseError> {
        if !self.check(TokenType::Identifier) {
            return Err(ParseError::MissingIdentifier(ctx, self.current.position.clone()));
        }
        let token = self.bump()?;
        match token.value {
            Some(Literal::Ident(name)) => Ok((name, token.position)),
            _ => unreachable!("IDENTIFIER token always carries a Literal::Ident"),
        }
    }

    // --- statements --------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current.kind {
            TokenType::Fn => self.parse_function_decl(),
            TokenType::Var | TokenType::Const => self.parse_variable_decl(),
            TokenType::If => self.parse_if_stmt(),
            TokenType::While => self.parse_while_stmt(),
            TokenType::Return => self.parse_return_stmt(),
            TokenType::Match => self.parse_match_stmt(),
            TokenType::LBrace => self.parse_block(),
            _ => self.parse_expression_stmt(),
        }
    }

    /// A statement that may itself be a block, used in single-statement bodies.
    fn parse_statement_or_block(&mut self) -> Result<Stmt, ParseError> {
        if self.check(TokenType::LBrace) {
            self.parse_block()
        } else {
            self.parse_statement()
        }
    }

    fn parse_block(&mut self) -> Result<Stmt, ParseError> {
        let open = self.expect(TokenType::LBrace, ParseError::MissingLBrace)?;
        let mut statements = vec![];
        while !self.check(TokenType::RBrace) && !self.check(TokenType::Eof) {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenType::RBrace, ParseError::MissingRBrace)?;
        Ok(Stmt::Block {
            statements,
            position: open.position,
        })
    }

    fn parse_function_decl(&mut self) -> Result<Stmt, ParseError> {
        let fn_token = self.bump()?; // 'fn'
        let (name, _) = self.expect_identifier(IdentifierContext::FunctionName)?;
        trace!("parsing function declaration '{name}'");
        self.expect(TokenType::LParen, ParseError::MissingLParen)?;
        let params = self.parse_parameters()?;
        self.expect(TokenType::RParen, ParseError::MissingRParen)?;
        if !self.check(TokenType::LBrace) {
            return Err(ParseError::MissingBody(Construct::Function, self.current.position.clone()));
        }
        let block = self.parse_block()?;
        Ok(Stmt::Function {
            name,
            params,
            block: Box::new(block),
            position: fn_token.position,
        })
    }

    fn parse_parameters(&mut self) -> Result<Vec<Parameter>, ParseError> {
        let mut params = vec![];
        if self.check(TokenType::RParen) {
            return Ok(params);
        }
        loop {
            let is_const = self.match_token(TokenType::Const)?.is_some();
            let (name, position) = self.expect_identifier(IdentifierContext::Parameter)?;
            if params.iter().any(|p: &Parameter| p.name == name) {
                return Err(ParseError::DuplicateParameters(name, position));
            }
            params.push(Parameter { name, is_const });
            if self.match_token(TokenType::Comma)?.is_none() {
                break;
            }
        }
        Ok(params)
    }

    fn parse_variable_decl(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.bump()?; // 'var' | 'const'
        let is_const = keyword.is(TokenType::Const);
        let (name, _) = self.expect_identifier(IdentifierContext::Declaration)?;
        let expr = if self.match_token(TokenType::Equal)?.is_some() {
            Some(self.parse_logical_or()?)
        } else {
            None
        };
        self.expect(TokenType::Semicolon, ParseError::MissingSemicolon)?;
        Ok(Stmt::Variable {
            name,
            expr,
            is_const,
            position: keyword.position,
        })
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let if_token = self.bump()?; // 'if'
        self.expect(TokenType::LParen, ParseError::MissingLParen)?;
        let condition = self
            .parse_expression()
            .map_err(|_| ParseError::MissingCondition(Construct::If, self.current.position.clone()))?;
        self.expect(TokenType::RParen, ParseError::MissingRParen)?;
        let body = self.parse_statement_or_block()?;
        let else_body = if self.match_token(TokenType::Else)?.is_some() {
            Some(Box::new(self.parse_statement_or_block()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            body: Box::new(body),
            else_body,
            position: if_token.position,
        })
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let while_token = self.bump()?; // 'while'
        self.expect(TokenType::LParen, ParseError::MissingLParen)?;
        let condition = self
            .parse_expression()
            .map_err(|_| ParseError::MissingCondition(Construct::While, self.current.position.clone()))?;
        self.expect(TokenType::RParen, ParseError::MissingRParen)?;
        if !self.check(TokenType::LBrace) && !self.starts_statement() {
            return Err(ParseError::MissingBody(Construct::While, self.current.position.clone()));
        }
        let body = self.parse_statement_or_block()?;
        Ok(Stmt::While {
            condition,
            body: Box::new(body),
            position: while_token.position,
        })
    }

    /// Whether `current` can begin a statement — used to reject an empty
    /// `while (c) ;` body, which has no production in the grammar.
    fn starts_statement(&self) -> bool {
        !matches!(self.current.kind, TokenType::Semicolon | TokenType::Eof | TokenType::RBrace)
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let return_token = self.bump()?; // 'return'
        let expr = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenType::Semicolon, ParseError::MissingSemicolon)?;
        Ok(Stmt::Return {
            expr,
            position: return_token.position,
        })
    }

    fn parse_match_stmt(&mut self) -> Result<Stmt, ParseError> {
        let match_token = self.bump()?; // 'match'
        self.expect(TokenType::LParen, ParseError::MissingLParen)?;
        let arguments = self.parse_arguments()?;
        self.expect(TokenType::RParen, ParseError::MissingRParen)?;
        self.expect(TokenType::LBrace, ParseError::MissingLBrace)?;
        let mut cases = vec![];
        while !self.check(TokenType::RBrace) && !self.check(TokenType::Eof) {
            cases.push(self.parse_case()?);
        }
        self.expect(TokenType::RBrace, ParseError::MissingRBrace)?;
        Ok(Stmt::Match {
            arguments,
            cases,
            position: match_token.position,
        })
    }

    fn parse_case(&mut self) -> Result<Case, ParseError> {
        let open = self.expect(TokenType::LParen, ParseError::MissingLParen)?;
        let mut patterns = vec![self.parse_pattern_expr()?];
        while self.match_token(TokenType::Comma)?.is_some() {
            patterns.push(self.parse_pattern_expr()?);
        }
        self.expect(TokenType::RParen, ParseError::MissingRParen)?;

        let mut seen: Vec<&str> = vec![];
        for p in &patterns {
            if let Some(name) = &p.name {
                if seen.contains(&name.as_str()) {
                    return Err(ParseError::DuplicatePatternNames(name.clone(), p.position.clone()));
                }
                seen.push(name.as_str());
            }
        }

        let guard = if self.check(TokenType::If) {
            self.bump()?;
            self.expect(TokenType::LParen, ParseError::MissingLParen)?;
            let g = self
                .parse_expression()
                .map_err(|_| ParseError::MissingCondition(Construct::Case, self.current.position.clone()))?;
            self.expect(TokenType::RParen, ParseError::MissingRParen)?;
            Some(g)
        } else {
            None
        };

        self.expect(TokenType::Colon, ParseError::MissingColon)?;

        if !self.check(TokenType::LBrace) && !self.starts_statement() {
            return Err(ParseError::MissingBody(Construct::Case, self.current.position.clone()));
        }
        let body = self.parse_statement_or_block()?;

        Ok(Case {
            patterns,
            guard,
            body: Box::new(body),
            position: open.position,
        })
    }

    fn parse_pattern_expr(&mut self) -> Result<PatternExpr, ParseError> {
        let position = self.current.position.clone();
        let pattern = if self.match_token(TokenType::Underscore)?.is_some() {
            None
        } else {
            Some(Box::new(self.parse_or_pattern()?))
        };
        let name = if self.match_token(TokenType::As)?.is_some() {
            let (name, _) = self.expect_identifier(IdentifierContext::AsBinding)?;
            Some(name)
        } else {
            None
        };
        Ok(PatternExpr {
            pattern,
            name,
            position,
        })
    }

    fn parse_or_pattern(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and_pattern()?;
        while self.check(TokenType::Or) {
            let op_token = self.bump()?;
            let right = self.parse_and_pattern()?;
            left = Expr::Logical {
                left: Box::new(left),
                op: LogicalOp::Or,
                right: Box::new(right),
                position: op_token.position,
            };
        }
        Ok(left)
    }

    fn parse_and_pattern(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_closed_pattern()?;
        while self.check(TokenType::And) {
            let op_token = self.bump()?;
            let right = self.parse_closed_pattern()?;
            left = Expr::Logical {
                left: Box::new(left),
                op: LogicalOp::And,
                right: Box::new(right),
                position: op_token.position,
            };
        }
        Ok(left)
    }

    fn parse_closed_pattern(&mut self) -> Result<Expr, ParseError> {
        let position = self.current.position.clone();
        let type_kind = match self.current.kind {
            TokenType::Str => Some(TypeKind::Str),
            TokenType::Num => Some(TypeKind::Num),
            TokenType::Bool => Some(TypeKind::Bool),
            TokenType::Func => Some(TypeKind::Func),
            TokenType::NilType => Some(TypeKind::Nil),
            _ => None,
        };
        if let Some(type_kind) = type_kind {
            self.bump()?;
            return Ok(Expr::TypePattern { type_kind, position });
        }
        self.parse_compare_pattern()
    }

    fn parse_compare_pattern(&mut self) -> Result<Expr, ParseError> {
        let position = self.current.position.clone();
        let op = match self.current.kind {
            TokenType::BangEqual => Some(BinaryOp::BangEqual),
            TokenType::Less => Some(BinaryOp::Less),
            TokenType::LessEqual => Some(BinaryOp::LessEqual),
            TokenType::Greater => Some(BinaryOp::Greater),
            TokenType::GreaterEqual => Some(BinaryOp::GreaterEqual),
            _ => None,
        };
        if op.is_some() {
            self.bump()?;
        }
        let right = self
            .parse_unary()
            .map_err(|_| ParseError::MissingPattern(self.current.position.clone()))?;
        Ok(Expr::ComparePattern {
            op: op.unwrap_or(BinaryOp::EqualEqual),
            right: Box::new(right),
            position,
        })
    }

    fn parse_expression_stmt(&mut self) -> Result<Stmt, ParseError> {
        let position = self.current.position.clone();
        let expr = self.parse_expression()?;
        self.expect(TokenType::Semicolon, ParseError::MissingSemicolon)?;
        Ok(Stmt::Expression { expr, position })
    }

    // --- expressions ---------------------------------------------------------

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenType::Identifier) {
            let ident_token = self.bump()?;
            if self.check(TokenType::Equal) {
                self.bump()?;
                let value = self.parse_logical_or()?;
                let name = match &ident_token.value {
                    Some(Literal::Ident(name)) => name.clone(),
                    _ => unreachable!(),
                };
                return Ok(Expr::Assignment {
                    name,
                    value: Box::new(value),
                    position: ident_token.position,
                });
            }
            self.push_back(ident_token);
        }
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_and()?;
        while self.check(TokenType::Or) {
            let op_token = self.bump()?;
            let right = self.parse_logical_and()?;
            left = Expr::Logical {
                left: Box::new(left),
                op: LogicalOp::Or,
                right: Box::new(right),
                position: op_token.position,
            };
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.check(TokenType::And) {
            let op_token = self.bump()?;
            let right = self.parse_equality()?;
            left = Expr::Logical {
                left: Box::new(left),
                op: LogicalOp::And,
                right: Box::new(right),
                position: op_token.position,
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.current.kind {
                TokenType::EqualEqual => BinaryOp::EqualEqual,
                TokenType::BangEqual => BinaryOp::BangEqual,
                _ => break,
            };
            let op_token = self.bump()?;
            let right = self.parse_comparison()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                position: op_token.position,
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_term()?;
        let op = match self.current.kind {
            TokenType::Less => BinaryOp::Less,
            TokenType::LessEqual => BinaryOp::LessEqual,
            TokenType::Greater => BinaryOp::Greater,
            TokenType::GreaterEqual => BinaryOp::GreaterEqual,
            _ => return Ok(left),
        };
        let op_token = self.bump()?;
        let right = self.parse_term()?;
        Ok(Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
            position: op_token.position,
        })
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.current.kind {
                TokenType::Plus => BinaryOp::Plus,
                TokenType::Minus => BinaryOp::Minus,
                _ => break,
            };
            let op_token = self.bump()?;
            let right = self.parse_factor()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                position: op_token.position,
            };
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current.kind {
                TokenType::Star => BinaryOp::Star,
                TokenType::Slash => BinaryOp::Slash,
                _ => break,
            };
            let op_token = self.bump()?;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                position: op_token.position,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current.kind {
            TokenType::Minus => Some(UnaryOp::Minus),
            TokenType::Not => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let op_token = self.bump()?;
            let right = self.parse_primary()?;
            return Ok(Expr::Unary {
                op,
                right: Box::new(right),
                position: op_token.position,
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let position = self.current.position.clone();
        match self.current.kind {
            TokenType::Number => {
                let token = self.bump()?;
                let value = match token.value {
                    Some(Literal::Int(v)) => LiteralValue::Int(v),
                    Some(Literal::Float(v)) => LiteralValue::Float(v),
                    _ => unreachable!("NUMBER token always carries a numeric Literal"),
                };
                Ok(Expr::Literal { value, position })
            }
            TokenType::String => {
                let token = self.bump()?;
                let value = match token.value {
                    Some(Literal::Str(v)) => LiteralValue::Str(v),
                    _ => unreachable!("STRING token always carries Literal::Str"),
                };
                Ok(Expr::Literal { value, position })
            }
            TokenType::True => {
                self.bump()?;
                Ok(Expr::Literal { value: LiteralValue::Bool(true), position })
            }
            TokenType::False => {
                self.bump()?;
                Ok(Expr::Literal { value: LiteralValue::Bool(false), position })
            }
            TokenType::Nil => {
                self.bump()?;
                Ok(Expr::Literal { value: LiteralValue::Nil, position })
            }
            TokenType::LParen => {
                self.bump()?;
                let inner = self.parse_expression()?;
                self.expect(TokenType::RParen, ParseError::MissingRParen)?;
                Ok(Expr::Grouping { inner: Box::new(inner), position })
            }
            TokenType::Identifier => {
                let token = self.bump()?;
                let name = match token.value {
                    Some(Literal::Ident(name)) => name,
                    _ => unreachable!(),
                };
                let mut expr = Expr::Identifier { name, position: position.clone() };
                while self.check(TokenType::LParen) {
                    self.bump()?;
                    let args = self.parse_arguments()?;
                    self.expect(TokenType::RParen, ParseError::MissingRParen)?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        position: position.clone(),
                    };
                }
                Ok(expr)
            }
            _ => Err(ParseError::MissingExpression(position)),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = vec![];
        if self.check(TokenType::RParen) {
            return Ok(args);
        }
        loop {
            args.push(
                self.parse_expression()
                    .map_err(|_| ParseError::MissingArgument(self.current.position.clone()))?,
            );
            if self.match_token(TokenType::Comma)?.is_none() {
                break;
            }
        }
        Ok(args)
    }
}
