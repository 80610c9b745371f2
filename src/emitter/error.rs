use thiserror::Error;

use crate::symbols::SymbolError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmitError {
    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

pub type EmitResult<T> = Result<T, EmitError>;
