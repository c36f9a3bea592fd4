//! Schema definitions for fakedb
//!
//! This module defines table schemas and column metadata.

use super::types::DataType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column definition in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Column position (0-indexed)
    pub position: usize,
    /// Does this column accept NULL?
    pub nullable: bool,
}

impl Column {
    /// Create a new non-nullable column
    pub fn new(name: impl Into<String>, data_type: DataType, position: usize) -> Self {
        Self {
            name: name.into(),
            data_type,
            position,
            nullable: false,
        }
    }

    /// Set nullable flag
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// DSL spelling of the declared type, including the `null` prefix
    pub fn type_name(&self) -> String {
        if self.nullable {
            format!("null{}", self.data_type)
        } else {
            self.data_type.to_string()
        }
    }
}

/// Table schema - defines the structure of a table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of columns
    columns: Vec<Column>,
    /// Column name to index mapping
    name_to_index: HashMap<String, usize>,
}

impl Schema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a schema from a list of columns, rejecting duplicate names
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut schema = Self::new();
        for col in columns {
            schema.add_column(col)?;
        }
        Ok(schema)
    }

    /// Add a column to the schema
    pub fn add_column(&mut self, mut column: Column) -> Result<()> {
        if self.name_to_index.contains_key(&column.name) {
            return Err(Error::SchemaMismatch(format!(
                "duplicate column '{}'",
                column.name
            )));
        }
        column.position = self.columns.len();
        self.name_to_index
            .insert(column.name.clone(), column.position);
        self.columns.push(column);
        Ok(())
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.name_to_index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Get column index by name
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Get all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Table definition - immutable table metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDef {
    /// Table name
    pub name: String,
    /// Table schema
    pub schema: Schema,
}

impl TableDef {
    /// Create a new table definition
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Get the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the table schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Get column by name, failing with `ColumnNotFound`
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.schema
            .get_column(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string(), self.name.clone()))
    }
}
