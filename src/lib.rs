//! Front end for the C-- language.
//!
//! The pipeline is: [`lexer::lexer::tokenize`] turns source text into
//! tokens, [`parser::parser::parse`] builds the parse tree,
//! [`semantic::analyzer::analyze`] type-checks it and collects diagnostics,
//! and [`ir::translate::generate`] lowers an error-free program to
//! three-address code that renders through `Display`.

#![allow(clippy::module_inception)]

pub mod ast;
pub mod errors;
pub mod ir;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod semantic;
