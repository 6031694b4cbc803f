//! Frontend module - Go lexer, parser, printer and package loading

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod printer;
pub mod package;
