//! Front end for the kaleidoscope language: a streaming tokenizer and an
//! operator-precedence parser producing one top-level unit at a time.

pub mod ast;
pub mod cursor;
pub mod lexer;
pub mod parser;
pub mod precedence;

pub use ast::{ASTNode, Expression, Function, Prototype};
pub use parser::{parse_str, Parser, ParserError};
pub use precedence::PrecedenceTable;
