//! Statement execution module
//!
//! This module contains the executor and the cursors it returns.

pub mod cursor;
pub mod executor;

pub use cursor::{ColumnDesc, Cursor, CursorState, Destination, FromValue};
pub use executor::{ExecResult, Executor};
