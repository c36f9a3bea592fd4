//! Storage module
//!
//! This module contains the in-memory row storage:
//! - Values and rows
//! - Tables

pub mod table;
pub mod tuple;

pub use table::Table;
pub use tuple::{Row, Value};
