//! Statement Executor for fakedb
//!
//! This module binds parameters into parsed statements and applies them to a
//! catalog.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::cursor::Cursor;
use crate::catalog::{Catalog, Column, TableDef};
use crate::context::Context;
use crate::dsl::{Assignment, ParsedOperation, ValueSource};
use crate::error::{Error, Result};
use crate::storage::{Row, Value};

/// Outcome of a mutating statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    /// Number of affected rows (for INSERT/UPDATE/DELETE)
    pub affected_rows: u64,
}

impl ExecResult {
    fn affected(count: usize) -> Self {
        Self {
            affected_rows: count as u64,
        }
    }
}

/// Execution engine over one catalog
#[derive(Debug, Clone)]
pub struct Executor {
    catalog: Arc<Catalog>,
}

impl Executor {
    /// Create a new executor
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Run a statement that does not return rows
    pub fn execute(
        &self,
        ctx: &Context,
        op: &ParsedOperation,
        params: &[Value],
    ) -> Result<ExecResult> {
        ctx.check()?;
        check_arity(op, params)?;

        let result = match op {
            ParsedOperation::Create { table, columns } => {
                let columns = columns
                    .iter()
                    .enumerate()
                    .map(|(i, def)| def.to_column(i))
                    .collect();
                ctx.check()?;
                self.catalog.define_table(table, columns)?;
                ExecResult::affected(0)
            }
            ParsedOperation::Insert { table, assignments } => {
                self.execute_insert(ctx, table, assignments, params)?
            }
            ParsedOperation::Update {
                table, assignments, ..
            } => self.execute_update(ctx, table, assignments, params)?,
            ParsedOperation::Delete { table, .. } => {
                ctx.check()?;
                ExecResult::affected(self.catalog.delete_rows(table)?)
            }
            ParsedOperation::Wipe => {
                ctx.check()?;
                self.catalog.wipe();
                ExecResult::affected(0)
            }
            ParsedOperation::Select { .. } => return Err(wrong_kind(op)),
        };

        debug!(
            op = %op.kind(),
            table = op.table_name().unwrap_or(""),
            affected_rows = result.affected_rows,
            "Statement executed"
        );
        Ok(result)
    }

    /// Run a SELECT and return a cursor over a snapshot of its rows
    pub fn query(&self, ctx: &Context, op: &ParsedOperation, params: &[Value]) -> Result<Cursor> {
        ctx.check()?;
        let (table, columns) = match op {
            ParsedOperation::Select { table, columns, .. } => (table, columns),
            other => return Err(wrong_kind(other)),
        };
        check_arity(op, params)?;

        let (projected, rows) = self.catalog.select(table, columns)?;
        debug!(table = %table, rows = rows.len(), "Query snapshot taken");

        Ok(Cursor::new(ctx.clone(), projected, rows))
    }

    fn execute_insert(
        &self,
        ctx: &Context,
        table_name: &str,
        assignments: &[Assignment],
        params: &[Value],
    ) -> Result<ExecResult> {
        let def = self.catalog.table(table_name)?;
        let row = build_row(&def, assignments, params)?;

        ctx.check()?;
        self.catalog.append_row(table_name, row)?;
        Ok(ExecResult::affected(1))
    }

    fn execute_update(
        &self,
        ctx: &Context,
        table_name: &str,
        assignments: &[Assignment],
        params: &[Value],
    ) -> Result<ExecResult> {
        let def = self.catalog.table(table_name)?;

        let mut bound = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let col = def.column(&assignment.column)?;
            bound.push((col.position, bind_value(col, &assignment.value, params)?));
        }

        ctx.check()?;
        let updated = self.catalog.update_rows(table_name, &bound)?;
        Ok(ExecResult::affected(updated))
    }
}

/// The parameter count must match the statement's placeholders exactly
fn check_arity(op: &ParsedOperation, params: &[Value]) -> Result<()> {
    let expected = op.placeholder_count();
    if params.len() != expected {
        return Err(Error::ParameterCountMismatch {
            expected,
            got: params.len(),
        });
    }
    Ok(())
}

/// Build a full-width row; unmentioned columns get their zero value, or NULL
/// when nullable.
fn build_row(def: &TableDef, assignments: &[Assignment], params: &[Value]) -> Result<Row> {
    let columns = def.schema().columns();
    let mut values: Vec<Value> = columns
        .iter()
        .map(|col| {
            if col.nullable {
                Value::Null
            } else {
                Value::zero(col.data_type)
            }
        })
        .collect();

    for assignment in assignments {
        let col = def.column(&assignment.column)?;
        values[col.position] = bind_value(col, &assignment.value, params)?;
    }

    Ok(Row::new(values))
}

/// Resolve a placeholder or literal and coerce it to the column's type
fn bind_value(col: &Column, source: &ValueSource, params: &[Value]) -> Result<Value> {
    let literal;
    let raw = match source {
        ValueSource::Placeholder(i) => params.get(*i).ok_or(Error::ParameterCountMismatch {
            expected: i + 1,
            got: params.len(),
        })?,
        ValueSource::Literal(text) => {
            literal = Value::String(text.clone());
            &literal
        }
    };

    if raw.is_null() {
        return if col.nullable {
            Ok(Value::Null)
        } else {
            Err(Error::NullNotAllowed(col.name.clone()))
        };
    }

    raw.coerce_to(col.data_type)
        .ok_or_else(|| Error::TypeMismatch {
            column: col.name.clone(),
            expected: col.type_name(),
            found: raw.type_name().to_string(),
        })
}

fn wrong_kind(op: &ParsedOperation) -> Error {
    Error::WrongStatementKind {
        op: op.kind().to_string(),
        expected: op.kind().entry_point().to_string(),
    }
}
