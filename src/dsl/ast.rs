//! Parsed DSL statements
//!
//! This module defines the structures the parser produces. Nothing here
//! refers to a catalog; column names and types are checked at execution.

use crate::catalog::{Column, DataType};
use std::fmt;

/// Statement verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Create,
    Insert,
    Select,
    Update,
    Delete,
    Wipe,
}

impl OpKind {
    /// Does this verb produce rows (query) rather than an affected-row count?
    pub fn returns_rows(&self) -> bool {
        matches!(self, OpKind::Select)
    }

    /// Executor entry point that accepts this verb
    pub fn entry_point(&self) -> &'static str {
        if self.returns_rows() {
            "query"
        } else {
            "execute"
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpKind::Create => "CREATE",
            OpKind::Insert => "INSERT",
            OpKind::Select => "SELECT",
            OpKind::Update => "UPDATE",
            OpKind::Delete => "DELETE",
            OpKind::Wipe => "WIPE",
        };
        write!(f, "{}", name)
    }
}

/// Column declared by CREATE
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl ColumnDef {
    /// Convert into a catalog column at the given position
    pub fn to_column(&self, position: usize) -> Column {
        Column::new(self.name.clone(), self.data_type, position).nullable(self.nullable)
    }
}

/// Where an assigned value comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// `?`, bound to the parameter with this ordinal (0-based)
    Placeholder(usize),
    /// Inline text, coerced to the column type at bind time
    Literal(String),
}

/// `column=source` in INSERT and UPDATE
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: ValueSource,
}

/// Filter segment of SELECT, UPDATE and DELETE.
///
/// Kept verbatim. Its placeholders take part in parameter counting, but the
/// predicate itself is never evaluated: every row matches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    pub text: String,
    pub placeholders: usize,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// One parsed DSL statement
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOperation {
    /// `CREATE|table|col=type,...`
    Create {
        table: String,
        columns: Vec<ColumnDef>,
    },
    /// `INSERT|table|col=?,col=literal,...`
    Insert {
        table: String,
        assignments: Vec<Assignment>,
    },
    /// `SELECT|table|col,col|filter`
    Select {
        table: String,
        columns: Vec<String>,
        filter: Filter,
    },
    /// `UPDATE|table|col=?,...|filter`
    Update {
        table: String,
        assignments: Vec<Assignment>,
        filter: Filter,
    },
    /// `DELETE|table|filter`
    Delete { table: String, filter: Filter },
    /// `WIPE`
    Wipe,
}

impl ParsedOperation {
    /// Statement verb
    pub fn kind(&self) -> OpKind {
        match self {
            ParsedOperation::Create { .. } => OpKind::Create,
            ParsedOperation::Insert { .. } => OpKind::Insert,
            ParsedOperation::Select { .. } => OpKind::Select,
            ParsedOperation::Update { .. } => OpKind::Update,
            ParsedOperation::Delete { .. } => OpKind::Delete,
            ParsedOperation::Wipe => OpKind::Wipe,
        }
    }

    /// Target table, `None` for WIPE
    pub fn table_name(&self) -> Option<&str> {
        match self {
            ParsedOperation::Create { table, .. }
            | ParsedOperation::Insert { table, .. }
            | ParsedOperation::Select { table, .. }
            | ParsedOperation::Update { table, .. }
            | ParsedOperation::Delete { table, .. } => Some(table),
            ParsedOperation::Wipe => None,
        }
    }

    /// Number of `?` placeholders in the whole statement
    pub fn placeholder_count(&self) -> usize {
        let assigned = |assignments: &[Assignment]| {
            assignments
                .iter()
                .filter(|a| matches!(a.value, ValueSource::Placeholder(_)))
                .count()
        };

        match self {
            ParsedOperation::Insert { assignments, .. } => assigned(assignments),
            ParsedOperation::Update {
                assignments,
                filter,
                ..
            } => assigned(assignments) + filter.placeholders,
            ParsedOperation::Select { filter, .. } | ParsedOperation::Delete { filter, .. } => {
                filter.placeholders
            }
            ParsedOperation::Create { .. } | ParsedOperation::Wipe => 0,
        }
    }
}
