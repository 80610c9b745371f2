use thiserror::Error;

use crate::lexer::LexError;
use crate::token::TokenKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(
        "Unexpected token at line {line}, column {column}: expected {expected}, got {found} '{text}'"
    )]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        text: String,
        line: usize,
        column: usize,
    },
    #[error("Invalid number literal '{literal}' at line {line}, column {column}")]
    InvalidNumber {
        literal: String,
        line: usize,
        column: usize,
    },
    #[error(transparent)]
    Lex(#[from] LexError),
}

pub type ParseResult<T> = Result<T, ParseError>;
