//! Table storage for fakedb
//!
//! This module pairs an immutable table definition with its in-memory rows.

use super::tuple::{Row, Value};
use crate::catalog::{Schema, TableDef};
use crate::error::{Error, Result};
use std::sync::Arc;

/// A table combining schema and row storage
#[derive(Debug, Clone)]
pub struct Table {
    /// Table definition (metadata)
    def: Arc<TableDef>,
    /// Rows in insertion order
    rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table
    pub fn new(def: Arc<TableDef>) -> Self {
        Self {
            def,
            rows: Vec::new(),
        }
    }

    /// Get table name
    pub fn name(&self) -> &str {
        self.def.name()
    }

    /// Get table schema
    pub fn schema(&self) -> &Schema {
        self.def.schema()
    }

    /// Get table definition
    pub fn definition(&self) -> &Arc<TableDef> {
        &self.def
    }

    /// Number of stored rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Stored rows in insertion order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Check that a row matches the schema in arity and value types
    pub fn validate_row(&self, row: &Row) -> Result<()> {
        let columns = self.schema().columns();
        if row.len() != columns.len() {
            return Err(Error::SchemaMismatch(format!(
                "table '{}' has {} column(s) but row has {} value(s)",
                self.name(),
                columns.len(),
                row.len()
            )));
        }

        for (col, value) in columns.iter().zip(row.values()) {
            if !value.conforms_to(col.data_type, col.nullable) {
                return Err(Error::SchemaMismatch(format!(
                    "column '{}' of table '{}' is {} but value is {}",
                    col.name,
                    self.name(),
                    col.type_name(),
                    value.type_name()
                )));
            }
        }

        Ok(())
    }

    /// Append a row after validating it
    pub fn insert(&mut self, row: Row) -> Result<()> {
        self.validate_row(&row)?;
        self.rows.push(row);
        Ok(())
    }

    /// Apply the same assignments to every row, returning how many rows changed.
    ///
    /// All assignments are validated before any row is touched.
    pub fn update_all(&mut self, assignments: &[(usize, Value)]) -> Result<usize> {
        let columns = self.schema().columns();
        for (index, value) in assignments {
            let col = columns.get(*index).ok_or_else(|| {
                Error::SchemaMismatch(format!(
                    "column position {} out of range for table '{}'",
                    index,
                    self.name()
                ))
            })?;
            if !value.conforms_to(col.data_type, col.nullable) {
                return Err(Error::SchemaMismatch(format!(
                    "column '{}' of table '{}' is {} but value is {}",
                    col.name,
                    self.name(),
                    col.type_name(),
                    value.type_name()
                )));
            }
        }

        for row in &mut self.rows {
            for (index, value) in assignments {
                row.set(*index, value.clone());
            }
        }
        Ok(self.rows.len())
    }

    /// Remove every row, returning how many were removed
    pub fn delete_all(&mut self) -> usize {
        let removed = self.rows.len();
        self.rows.clear();
        removed
    }

    /// Copy of every row projected onto the given column positions
    pub fn snapshot(&self, projection: &[usize]) -> Vec<Row> {
        self.rows
            .iter()
            .map(|row| row.project(projection))
            .collect()
    }
}
