//! DSL module
//!
//! This module contains the parser for the pipe-delimited statement language
//! and the structures it produces.

pub mod ast;
pub mod parser;

pub use ast::{Assignment, ColumnDef, Filter, OpKind, ParsedOperation, ValueSource};
pub use parser::parse;
