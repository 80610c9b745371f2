use thiserror::Error;

use crate::symbols::SymbolError;

/// Typed errors produced by the tree-walking interpreter. Any of them aborts
/// the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    #[error("Assignment shape mismatch: {targets} targets, {values} values")]
    ShapeMismatch { targets: usize, values: usize },
    #[error("Operator '{operator}' is not supported by the interpreter")]
    UnsupportedOperator { operator: &'static str },
    #[error("Operator '{operator}' is missing its left operand")]
    MissingOperand { operator: &'static str },
    #[error("Cannot use {what} as an integer")]
    NotNumeric { what: String },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Integer overflow in '{operator}'")]
    Overflow { operator: &'static str },
    #[error("Function '{name}' expected {expected} arguments, got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Function '{name}' returned no value")]
    NoValue { name: String },
    #[error("Call depth exceeded the limit of {limit}")]
    CallDepthExceeded { limit: usize },
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
