pub mod ast;
pub mod backend;
pub mod emitter;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod symbols;
pub mod token;
