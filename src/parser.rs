use tracing::debug;

use crate::ast::{
    AssignOperator, BinaryOperator, Expression, Import, LogicOperator, Project, Statement,
    UnaryOperator, Variable,
};
use crate::lexer::{LexResult, Lexer};
use crate::token::{Span, Token, TokenKind, EOF_TEXT};

mod error;

pub use error::{ParseError, ParseResult};

/// Anything the parser can pull tokens from.
pub trait TokenSource<'a> {
    fn next_token(&mut self) -> LexResult<Token<'a>>;
}

impl<'a> TokenSource<'a> for Lexer<'a> {
    fn next_token(&mut self) -> LexResult<Token<'a>> {
        Lexer::next_token(self)
    }
}

/// An already tokenized stream. Keeps answering end-of-input once drained,
/// like the lexer does.
pub struct Tokens<'a> {
    tokens: std::vec::IntoIter<Token<'a>>,
    last: Span,
}

impl<'a> Tokens<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Self {
            tokens: tokens.into_iter(),
            last: Span::default(),
        }
    }
}

impl<'a> TokenSource<'a> for Tokens<'a> {
    fn next_token(&mut self) -> LexResult<Token<'a>> {
        if let Some(token) = self.tokens.next() {
            self.last = token.span;
            return Ok(token);
        }
        Ok(Token::new(
            TokenKind::Eof,
            EOF_TEXT,
            Span {
                start: self.last.end,
                end: self.last.end,
                line: self.last.line,
                column: self.last.column,
            },
        ))
    }
}

#[derive(Clone, Copy)]
enum Operator {
    Logic(LogicOperator),
    Binary(BinaryOperator),
}

impl Operator {
    fn combine(self, left: Expression, right: Expression) -> Expression {
        match self {
            Operator::Logic(op) => Expression::Logic {
                op,
                left: Some(Box::new(left)),
                right: Box::new(right),
            },
            Operator::Binary(op) => Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
        }
    }
}

/// Binary precedence levels, loosest first. Every level is left associative.
const PRECEDENCE: [&[(TokenKind, Operator)]; 7] = [
    &[(TokenKind::PipePipe, Operator::Logic(LogicOperator::Or))],
    &[(TokenKind::AmpAmp, Operator::Logic(LogicOperator::And))],
    &[
        (TokenKind::Less, Operator::Logic(LogicOperator::Less)),
        (TokenKind::LessEqual, Operator::Logic(LogicOperator::LessEqual)),
        (TokenKind::Greater, Operator::Logic(LogicOperator::Greater)),
        (TokenKind::GreaterEqual, Operator::Logic(LogicOperator::GreaterEqual)),
        (TokenKind::EqualEqual, Operator::Logic(LogicOperator::Equal)),
        (TokenKind::BangEqual, Operator::Logic(LogicOperator::NotEqual)),
    ],
    &[
        (TokenKind::Amp, Operator::Binary(BinaryOperator::BitAnd)),
        (TokenKind::Pipe, Operator::Binary(BinaryOperator::BitOr)),
        (TokenKind::Caret, Operator::Binary(BinaryOperator::BitXor)),
    ],
    &[
        (TokenKind::Plus, Operator::Binary(BinaryOperator::Add)),
        (TokenKind::Minus, Operator::Binary(BinaryOperator::Sub)),
    ],
    &[
        (TokenKind::Star, Operator::Binary(BinaryOperator::Mul)),
        (TokenKind::Slash, Operator::Binary(BinaryOperator::Div)),
    ],
    &[(TokenKind::As, Operator::Binary(BinaryOperator::Cast))],
];

pub struct Parser<'a, S> {
    source: S,
    current: Token<'a>,
    peeked: Option<Token<'a>>,
}

impl<'a> Parser<'a, Lexer<'a>> {
    pub fn new(input: &'a str) -> ParseResult<Self> {
        Self::from_source(Lexer::new(input))
    }
}

impl<'a, S: TokenSource<'a>> Parser<'a, S> {
    pub fn from_source(mut source: S) -> ParseResult<Self> {
        let current = source.next_token()?;
        Ok(Self {
            source,
            current,
            peeked: None,
        })
    }

    pub fn parse_project(mut self) -> ParseResult<Project> {
        self.skip_newlines()?;

        let mut imports = Vec::new();
        while self.check(TokenKind::Import) {
            self.advance()?;
            let path = self.must_eat(TokenKind::String)?.to_string();
            imports.push(Import { path });
            if !self.check(TokenKind::Eof) {
                self.must_eat(TokenKind::Newline)?;
            }
        }

        let body = self.parse_statement_list()?;
        self.must_eat(TokenKind::Eof)?;
        debug!(
            imports = imports.len(),
            statements = body.len(),
            "parsed project"
        );
        Ok(Project { imports, body })
    }

    fn parse_statement_list(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            let statement = self.parse_statement()?;
            if !matches!(statement, Statement::Empty) {
                statements.push(statement);
            }
            if !self.check(TokenKind::Newline) {
                break;
            }
            self.advance()?;
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current.kind {
            TokenKind::LBrace => Ok(Statement::Block(self.parse_braced_list()?)),
            TokenKind::If => self.parse_branch(),
            TokenKind::Func => self.parse_function(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Var => {
                self.advance()?;
                self.parse_assignment(None, true)
            }
            TokenKind::Identifier => {
                let next = self.peek()?;
                if next == TokenKind::Comma || next.is_assign_op() {
                    return self.parse_assignment(None, false);
                }
                if next == TokenKind::Dot {
                    let variable = self.parse_variable()?;
                    if self.check(TokenKind::Comma) || self.current.kind.is_assign_op() {
                        return self.parse_assignment(Some(variable), false);
                    }
                    let expr = self.parse_level(0, &mut Some(variable))?;
                    return Ok(Statement::Expr(expr));
                }
                Ok(Statement::Expr(self.parse_expression()?))
            }
            TokenKind::Newline | TokenKind::Eof | TokenKind::RBrace | TokenKind::Else => {
                Ok(Statement::Empty)
            }
            _ => Ok(Statement::Expr(self.parse_expression()?)),
        }
    }

    fn parse_braced_list(&mut self) -> ParseResult<Vec<Statement>> {
        self.must_eat(TokenKind::LBrace)?;
        let body = self.parse_statement_list()?;
        self.must_eat(TokenKind::RBrace)?;
        Ok(body)
    }

    fn parse_branch(&mut self) -> ParseResult<Statement> {
        self.must_eat(TokenKind::If)?;
        let condition = self.parse_logic()?;
        let then_branch = if self.check(TokenKind::LBrace) {
            Statement::Block(self.parse_braced_list()?)
        } else {
            self.must_eat(TokenKind::Then)?;
            self.parse_statement()?
        };
        let else_branch = if self.check(TokenKind::Else) {
            self.advance()?;
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Statement::Branch {
            condition,
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    fn parse_function(&mut self) -> ParseResult<Statement> {
        self.must_eat(TokenKind::Func)?;
        let name = self.parse_variable()?;
        let params = self.parse_params()?;
        let returns = if self.check(TokenKind::LParen) {
            self.parse_params()?
        } else {
            Vec::new()
        };
        let body = self.parse_braced_list()?;
        Ok(Statement::Function {
            name,
            params,
            returns,
            body,
        })
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Variable>> {
        self.must_eat(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            params.push(self.parse_variable()?);
            while self.check(TokenKind::Comma) {
                self.advance()?;
                params.push(self.parse_variable()?);
            }
        }
        self.must_eat(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_return(&mut self) -> ParseResult<Statement> {
        self.must_eat(TokenKind::Return)?;
        let values = self.parse_expression_list()?;
        let error_code = if self.check(TokenKind::Colon) {
            self.advance()?;
            let span = self.current.span;
            let literal = self.must_eat(TokenKind::Number)?;
            if parse_number_literal(literal).is_none() {
                return Err(invalid_number(literal, span));
            }
            Some(literal.to_string())
        } else {
            None
        };
        Ok(Statement::Return { values, error_code })
    }

    fn parse_assignment(
        &mut self,
        first: Option<Variable>,
        is_declaration: bool,
    ) -> ParseResult<Statement> {
        let first = match first {
            Some(variable) => variable,
            None => self.parse_variable()?,
        };
        let mut targets = vec![first];
        while self.check(TokenKind::Comma) {
            self.advance()?;
            targets.push(self.parse_variable()?);
        }

        let op = if is_declaration {
            self.must_eat(TokenKind::Assign)?;
            AssignOperator::Assign
        } else {
            self.parse_assign_operator()?
        };
        let values = self.parse_expression_list()?;
        Ok(Statement::Assign {
            targets,
            op,
            values,
            is_declaration,
        })
    }

    fn parse_assign_operator(&mut self) -> ParseResult<AssignOperator> {
        let op = match self.current.kind {
            TokenKind::PlusAssign => AssignOperator::AddAssign,
            TokenKind::MinusAssign => AssignOperator::SubAssign,
            TokenKind::StarAssign => AssignOperator::MulAssign,
            TokenKind::SlashAssign => AssignOperator::DivAssign,
            _ => {
                self.must_eat(TokenKind::Assign)?;
                return Ok(AssignOperator::Assign);
            }
        };
        self.advance()?;
        Ok(op)
    }

    fn parse_expression_list(&mut self) -> ParseResult<Vec<Expression>> {
        let mut values = vec![self.parse_expression()?];
        while self.check(TokenKind::Comma) {
            self.advance()?;
            values.push(self.parse_expression()?);
        }
        Ok(values)
    }

    fn parse_variable(&mut self) -> ParseResult<Variable> {
        let mut name = self.must_eat(TokenKind::Identifier)?.to_string();
        while self.check(TokenKind::Dot) {
            self.advance()?;
            name.push('.');
            name.push_str(self.must_eat(TokenKind::Identifier)?);
        }
        Ok(Variable { name })
    }

    fn parse_logic(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_logic_and()?;
        while self.check(TokenKind::Or) {
            self.advance()?;
            let right = self.parse_logic_and()?;
            left = Operator::Logic(LogicOperator::Or).combine(left, right);
        }
        Ok(left)
    }

    fn parse_logic_and(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_logic_not()?;
        while self.check(TokenKind::And) {
            self.advance()?;
            let right = self.parse_logic_not()?;
            left = Operator::Logic(LogicOperator::And).combine(left, right);
        }
        Ok(left)
    }

    fn parse_logic_not(&mut self) -> ParseResult<Expression> {
        if self.check(TokenKind::Not) {
            self.advance()?;
            let operand = self.parse_logic_not()?;
            return Ok(Expression::Logic {
                op: LogicOperator::Not,
                left: None,
                right: Box::new(operand),
            });
        }
        self.parse_expression()
    }

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_level(0, &mut None)
    }

    /// `seed` carries a variable the statement parser already consumed; it
    /// becomes the leftmost factor.
    fn parse_level(
        &mut self,
        level: usize,
        seed: &mut Option<Variable>,
    ) -> ParseResult<Expression> {
        let Some(operators) = PRECEDENCE.get(level) else {
            return self.parse_unary(seed);
        };
        let mut left = self.parse_level(level + 1, seed)?;
        while let Some(op) = match_operator(operators, self.current.kind) {
            self.advance()?;
            let right = self.parse_level(level + 1, &mut None)?;
            left = op.combine(left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self, seed: &mut Option<Variable>) -> ParseResult<Expression> {
        if seed.is_some() {
            return self.parse_factor(seed);
        }
        let op = match self.current.kind {
            TokenKind::Star => UnaryOperator::Deref,
            TokenKind::Minus => UnaryOperator::Negate,
            TokenKind::Plus => UnaryOperator::Plus,
            TokenKind::Amp => UnaryOperator::AddressOf,
            TokenKind::Bang => UnaryOperator::Not,
            TokenKind::Tilde => UnaryOperator::BitNot,
            _ => return self.parse_factor(seed),
        };
        self.advance()?;
        let operand = self.parse_unary(&mut None)?;
        Ok(Expression::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_factor(&mut self, seed: &mut Option<Variable>) -> ParseResult<Expression> {
        if let Some(variable) = seed.take() {
            return self.finish_variable(variable);
        }
        match self.current.kind {
            TokenKind::Number => {
                let span = self.current.span;
                let literal = self.must_eat(TokenKind::Number)?;
                let value =
                    parse_number_literal(literal).ok_or_else(|| invalid_number(literal, span))?;
                Ok(Expression::Number {
                    literal: literal.to_string(),
                    value,
                })
            }
            TokenKind::String => {
                let text = self.must_eat(TokenKind::String)?;
                Ok(Expression::String(text.to_string()))
            }
            TokenKind::LParen => {
                self.advance()?;
                let inner = self.parse_logic()?;
                self.must_eat(TokenKind::RParen)?;
                Ok(inner)
            }
            _ => {
                let variable = self.parse_variable()?;
                self.finish_variable(variable)
            }
        }
    }

    fn finish_variable(&mut self, variable: Variable) -> ParseResult<Expression> {
        if !self.check(TokenKind::LParen) {
            return Ok(Expression::Variable(variable));
        }
        self.advance()?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args = self.parse_expression_list()?;
        }
        self.must_eat(TokenKind::RParen)?;
        Ok(Expression::Call {
            callee: variable,
            args,
        })
    }

    fn skip_newlines(&mut self) -> ParseResult<()> {
        while self.check(TokenKind::Newline) {
            self.advance()?;
        }
        Ok(())
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Consumes the current token if it has the expected kind and returns its
    /// text. This is the only place syntax errors are raised.
    fn must_eat(&mut self, kind: TokenKind) -> ParseResult<&'a str> {
        if self.current.kind != kind {
            return Err(ParseError::UnexpectedToken {
                expected: kind,
                found: self.current.kind,
                text: self.current.text.to_string(),
                line: self.current.span.line,
                column: self.current.span.column,
            });
        }
        Ok(self.advance()?.text)
    }

    fn advance(&mut self) -> ParseResult<Token<'a>> {
        let next = match self.peeked.take() {
            Some(token) => token,
            None => self.source.next_token()?,
        };
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn peek(&mut self) -> ParseResult<TokenKind> {
        if let Some(token) = &self.peeked {
            return Ok(token.kind);
        }
        let token = self.source.next_token()?;
        let kind = token.kind;
        self.peeked = Some(token);
        Ok(kind)
    }
}

fn match_operator(operators: &[(TokenKind, Operator)], kind: TokenKind) -> Option<Operator> {
    operators
        .iter()
        .find(|(candidate, _)| *candidate == kind)
        .map(|(_, op)| *op)
}

fn invalid_number(literal: &str, span: Span) -> ParseError {
    ParseError::InvalidNumber {
        literal: literal.to_string(),
        line: span.line,
        column: span.column,
    }
}

/// Converts a number lexeme: decimal, `0x` hex, `0o` octal or `0b` binary,
/// with `_` allowed between digits.
pub fn parse_number_literal(literal: &str) -> Option<i64> {
    let (digits, radix) = match literal.get(..2) {
        Some("0x" | "0X") => (&literal[2..], 16),
        Some("0o") => (&literal[2..], 8),
        Some("0b") => (&literal[2..], 2),
        _ => (literal, 10),
    };
    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return None;
    }
    if !digits.chars().all(|c| c == '_' || c.is_digit(radix)) {
        return None;
    }
    let cleaned = digits.replace('_', "");
    i64::from_str_radix(&cleaned, radix).ok()
}

pub fn parse(input: &str) -> ParseResult<Project> {
    Parser::new(input)?.parse_project()
}

pub fn parse_tokens(tokens: Vec<Token<'_>>) -> ParseResult<Project> {
    Parser::from_source(Tokens::new(tokens))?.parse_project()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{tokenize, LexError};
    use indoc::indoc;

    fn var(name: &str) -> Variable {
        Variable::new(name)
    }

    fn ident(name: &str) -> Expression {
        Expression::Variable(var(name))
    }

    fn num(value: i64) -> Expression {
        Expression::Number {
            literal: value.to_string(),
            value,
        }
    }

    fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Expression {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    fn logic(left: Expression, op: LogicOperator, right: Expression) -> Expression {
        Expression::Logic {
            op,
            left: Some(Box::new(left)),
            right: Box::new(right),
        }
    }

    fn single(input: &str) -> Statement {
        let mut project = parse(input).expect("parse failed");
        assert_eq!(project.body.len(), 1, "expected one statement");
        project.body.remove(0)
    }

    fn declare(names: &[&str], values: Vec<Expression>) -> Statement {
        Statement::Assign {
            targets: names.iter().map(|name| var(name)).collect(),
            op: AssignOperator::Assign,
            values,
            is_declaration: true,
        }
    }

    #[test]
    fn parses_simple_program() {
        let input = indoc! {r#"

            import "stdio.h"
            import "math.h"
            var a, b = 1, 2
            if a < b {
                a += b
            } else a = 0
        "#};
        let project = parse(input).expect("parse failed");

        let expected = Project {
            imports: vec![
                Import {
                    path: "stdio.h".to_string(),
                },
                Import {
                    path: "math.h".to_string(),
                },
            ],
            body: vec![
                declare(&["a", "b"], vec![num(1), num(2)]),
                Statement::Branch {
                    condition: logic(ident("a"), LogicOperator::Less, ident("b")),
                    then_branch: Box::new(Statement::Block(vec![Statement::Assign {
                        targets: vec![var("a")],
                        op: AssignOperator::AddAssign,
                        values: vec![ident("b")],
                        is_declaration: false,
                    }])),
                    else_branch: Some(Box::new(Statement::Assign {
                        targets: vec![var("a")],
                        op: AssignOperator::Assign,
                        values: vec![num(0)],
                        is_declaration: false,
                    })),
                },
            ],
        };

        assert_eq!(project, expected);
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let Statement::Assign { values, .. } = single("var x = 1 + 2 * 3") else {
            panic!("expected assignment");
        };
        assert_eq!(
            values,
            vec![binary(
                num(1),
                BinaryOperator::Add,
                binary(num(2), BinaryOperator::Mul, num(3)),
            )]
        );
    }

    #[test]
    fn binary_levels_are_left_associative() {
        let Statement::Assign { values, .. } = single("var x = 8 - 2 - 1") else {
            panic!("expected assignment");
        };
        assert_eq!(
            values,
            vec![binary(
                binary(num(8), BinaryOperator::Sub, num(2)),
                BinaryOperator::Sub,
                num(1),
            )]
        );
    }

    #[test]
    fn comparison_sits_between_bit_and_logic_levels() {
        let Statement::Assign { values, .. } = single("var x = a & 1 == b || c && d") else {
            panic!("expected assignment");
        };
        let comparison = logic(
            binary(ident("a"), BinaryOperator::BitAnd, num(1)),
            LogicOperator::Equal,
            ident("b"),
        );
        assert_eq!(
            values,
            vec![logic(
                comparison,
                LogicOperator::Or,
                logic(ident("c"), LogicOperator::And, ident("d")),
            )]
        );
    }

    #[test]
    fn cast_binds_tighter_than_multiplication() {
        let Statement::Assign { values, .. } = single("var x = a * b as long") else {
            panic!("expected assignment");
        };
        assert_eq!(
            values,
            vec![binary(
                ident("a"),
                BinaryOperator::Mul,
                binary(ident("b"), BinaryOperator::Cast, ident("long")),
            )]
        );
    }

    #[test]
    fn parses_prefix_operators() {
        let Statement::Assign { values, .. } = single("var x = -*&y + !~z") else {
            panic!("expected assignment");
        };
        let unary = |op, operand| Expression::Unary {
            op,
            operand: Box::new(operand),
        };
        assert_eq!(
            values,
            vec![binary(
                unary(
                    UnaryOperator::Negate,
                    unary(
                        UnaryOperator::Deref,
                        unary(UnaryOperator::AddressOf, ident("y"))
                    )
                ),
                BinaryOperator::Add,
                unary(UnaryOperator::Not, unary(UnaryOperator::BitNot, ident("z"))),
            )]
        );
    }

    #[test]
    fn textual_and_builds_logical_and() {
        let Statement::Branch { condition, .. } = single("if a and b or not c then x = 1") else {
            panic!("expected branch");
        };
        assert_eq!(
            condition,
            logic(
                logic(ident("a"), LogicOperator::And, ident("b")),
                LogicOperator::Or,
                Expression::Logic {
                    op: LogicOperator::Not,
                    left: None,
                    right: Box::new(ident("c")),
                },
            )
        );
    }

    #[test]
    fn parenthesised_logic_can_feed_arithmetic() {
        let Statement::Branch { condition, .. } = single("if (a + 1) * 2 > (b or c) {\n}") else {
            panic!("expected branch");
        };
        assert_eq!(
            condition,
            logic(
                binary(
                    binary(ident("a"), BinaryOperator::Add, num(1)),
                    BinaryOperator::Mul,
                    num(2),
                ),
                LogicOperator::Greater,
                logic(ident("b"), LogicOperator::Or, ident("c")),
            )
        );
    }

    #[test]
    fn bare_identifier_is_an_expression_statement() {
        assert_eq!(single("a"), Statement::Expr(ident("a")));
        assert_eq!(
            single("print(a, 2)"),
            Statement::Expr(Expression::Call {
                callee: var("print"),
                args: vec![ident("a"), num(2)],
            })
        );
    }

    #[test]
    fn dotted_names_work_as_targets_and_callees() {
        assert_eq!(
            single("pkg.value, b *= 2"),
            Statement::Assign {
                targets: vec![var("pkg.value"), var("b")],
                op: AssignOperator::MulAssign,
                values: vec![num(2)],
                is_declaration: false,
            }
        );
        assert_eq!(
            single("fmt.print(1) + 2"),
            Statement::Expr(binary(
                Expression::Call {
                    callee: var("fmt.print"),
                    args: vec![num(1)],
                },
                BinaryOperator::Add,
                num(2),
            ))
        );
    }

    #[test]
    fn parses_function_with_declared_returns() {
        let input = indoc! {"
            func divmod(a, b)(q, r) {
                q = a / b
                r = a - q * b
                return q, r : 3
            }
        "};
        let Statement::Function {
            name,
            params,
            returns,
            body,
        } = single(input)
        else {
            panic!("expected function");
        };
        assert_eq!(name, var("divmod"));
        assert_eq!(params, vec![var("a"), var("b")]);
        assert_eq!(returns, vec![var("q"), var("r")]);
        assert_eq!(body.len(), 3);
        assert_eq!(
            body[2],
            Statement::Return {
                values: vec![ident("q"), ident("r")],
                error_code: Some("3".to_string()),
            }
        );
    }

    #[test]
    fn function_without_return_list() {
        let Statement::Function {
            params, returns, ..
        } = single("func noop() {\n}")
        else {
            panic!("expected function");
        };
        assert!(params.is_empty());
        assert!(returns.is_empty());
    }

    #[test]
    fn accepts_multi_base_literals() {
        let Statement::Assign { values, .. } = single("var a, b, c, d = 0x1F, 0o17, 0b101, 1_000")
        else {
            panic!("expected assignment");
        };
        let parsed = values
            .iter()
            .map(|value| match value {
                Expression::Number { value, .. } => *value,
                other => panic!("expected number, got {other:?}"),
            })
            .collect::<Vec<_>>();
        assert_eq!(parsed, vec![31, 15, 5, 1000]);
    }

    #[test]
    fn rejects_malformed_number() {
        let err = parse("var a = 1.5").expect_err("expected invalid number");
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                literal: "1.5".to_string(),
                line: 1,
                column: 8,
            }
        );
    }

    #[test]
    fn reports_unexpected_token() {
        let err = parse("var = 1").expect_err("expected syntax error");
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                expected: TokenKind::Identifier,
                found: TokenKind::Assign,
                text: "=".to_string(),
                line: 1,
                column: 4,
            }
        );
    }

    #[test]
    fn declaration_rejects_compound_operator() {
        let err = parse("var a += 1").expect_err("expected syntax error");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                expected: TokenKind::Assign,
                found: TokenKind::PlusAssign,
                ..
            }
        ));
    }

    #[test]
    fn unclosed_block_is_an_error() {
        let err = parse("{\n a = 1\n").expect_err("expected syntax error");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                expected: TokenKind::RBrace,
                found: TokenKind::Eof,
                ..
            }
        ));
    }

    #[test]
    fn surfaces_lexical_errors() {
        let err = parse("import \"never closed").expect_err("expected lex error");
        assert_eq!(
            err,
            ParseError::Lex(LexError::UnterminatedString { line: 1, column: 7 })
        );
    }

    #[test]
    fn empty_statements_are_dropped() {
        let project = parse("\n\n{\n\n}\n").expect("parse failed");
        assert_eq!(project.body, vec![Statement::Block(vec![])]);
    }

    #[test]
    fn parsing_the_same_tokens_twice_is_identical() {
        let input = indoc! {"
            var a, b, c = 5
            if a == b then { c = a / 2 } else c -= 1
            func f(x)(y) {
                y = x * 2
            }
        "};
        let tokens = tokenize(input).expect("tokenize");
        let first = parse_tokens(tokens.clone()).expect("first parse");
        let second = parse_tokens(tokens).expect("second parse");
        assert_eq!(first, second);
        assert_eq!(first, parse(input).expect("direct parse"));
    }
}
