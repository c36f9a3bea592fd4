//! Catalog for fakedb
//!
//! This module manages the tables of one simulated database. A catalog is
//! shared by every connection opened with the same identifier, so all access
//! goes through a single reader-writer lock.

use super::schema::{Column, Schema, TableDef};
use crate::error::{Error, Result};
use crate::storage::{Row, Table, Value};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Catalog - tables of one in-memory database
#[derive(Debug, Default)]
pub struct Catalog {
    /// Tables by name, in creation order
    tables: RwLock<IndexMap<String, Table>>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a new table
    pub fn define_table(&self, name: &str, columns: Vec<Column>) -> Result<Arc<TableDef>> {
        let schema = Schema::from_columns(columns)?;
        let mut tables = self.tables.write();

        if tables.contains_key(name) {
            return Err(Error::TableAlreadyExists(name.to_string()));
        }

        let def = Arc::new(TableDef::new(name, schema));
        tables.insert(name.to_string(), Table::new(def.clone()));

        info!(
            table = name,
            columns = def.schema().column_count(),
            "Table defined"
        );
        Ok(def)
    }

    /// Get a table definition by name
    pub fn table(&self, name: &str) -> Result<Arc<TableDef>> {
        let tables = self.tables.read();
        tables
            .get(name)
            .map(|t| t.definition().clone())
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    /// List all table names in creation order
    pub fn list_tables(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }

    /// Number of rows currently stored in a table
    pub fn row_count(&self, name: &str) -> Result<usize> {
        let tables = self.tables.read();
        tables
            .get(name)
            .map(Table::row_count)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Append a row to a table
    pub fn append_row(&self, table_name: &str, row: Row) -> Result<()> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))?;

        table.insert(row)?;
        debug!(table = table_name, rows = table.row_count(), "Row added");
        Ok(())
    }

    /// Set the given column positions on every row of a table
    pub fn update_rows(&self, table_name: &str, assignments: &[(usize, Value)]) -> Result<usize> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))?;

        table.update_all(assignments)
    }

    /// Remove every row of a table
    pub fn delete_rows(&self, table_name: &str) -> Result<usize> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))?;

        Ok(table.delete_all())
    }

    /// Snapshot a table's rows projected onto the named columns.
    ///
    /// Columns are resolved and rows copied under one read lock, so the
    /// returned columns always describe the returned rows.
    pub fn select(&self, table_name: &str, columns: &[String]) -> Result<(Vec<Column>, Vec<Row>)> {
        let tables = self.tables.read();
        let table = tables
            .get(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))?;

        let mut projected = Vec::with_capacity(columns.len());
        let mut projection = Vec::with_capacity(columns.len());
        for name in columns {
            let col = table.definition().column(name)?;
            projection.push(col.position);
            projected.push(col.clone());
        }

        Ok((projected, table.snapshot(&projection)))
    }

    /// Drop every table
    pub fn wipe(&self) {
        let mut tables = self.tables.write();
        let dropped = tables.len();
        tables.clear();
        info!(tables = dropped, "Catalog wiped");
    }

    /// Get table schema info as a formatted string (for .schema command)
    pub fn get_table_info(&self, name: &str) -> Result<String> {
        let def = self.table(name)?;
        let mut info = format!("Table: {}\n", def.name());
        info.push_str("Columns:\n");

        for col in def.schema().columns() {
            info.push_str(&format!("  {} {}\n", col.name, col.type_name()));
        }

        info.push_str(&format!("Rows: {}\n", self.row_count(name)?));
        Ok(info)
    }
}

/// Builder for creating tables with a fluent API
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
}

impl TableBuilder {
    /// Start building a new table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column
    pub fn column(mut self, name: impl Into<String>, data_type: super::DataType) -> Self {
        let position = self.columns.len();
        self.columns.push(Column::new(name, data_type, position));
        self
    }

    /// Add a nullable column
    pub fn nullable_column(mut self, name: impl Into<String>, data_type: super::DataType) -> Self {
        let position = self.columns.len();
        self.columns
            .push(Column::new(name, data_type, position).nullable(true));
        self
    }

    /// Build the table in the catalog
    pub fn build(self, catalog: &Catalog) -> Result<Arc<TableDef>> {
        catalog.define_table(&self.name, self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataType;

    fn users(catalog: &Catalog) -> Arc<TableDef> {
        TableBuilder::new("users")
            .column("id", DataType::Int64)
            .column("name", DataType::String)
            .build(catalog)
            .unwrap()
    }

    #[test]
    fn test_define_and_get_table() {
        let catalog = Catalog::new();
        let table = users(&catalog);

        assert_eq!(table.name(), "users");
        assert_eq!(table.schema().column_count(), 2);

        let retrieved = catalog.table("users").unwrap();
        assert_eq!(retrieved.schema().column_names(), vec!["id", "name"]);
        assert_eq!(catalog.row_count("users").unwrap(), 0);
    }

    #[test]
    fn test_table_already_exists() {
        let catalog = Catalog::new();
        users(&catalog);

        let result = catalog.define_table("users", vec![]);
        assert!(matches!(result, Err(Error::TableAlreadyExists(_))));
    }

    #[test]
    fn test_table_not_found() {
        let catalog = Catalog::new();
        assert!(matches!(
            catalog.table("ghosts"),
            Err(Error::TableNotFound(_))
        ));
        let append = catalog.append_row("ghosts", Row::new(vec![]));
        assert!(matches!(append, Err(Error::TableNotFound(_))));
    }

    #[test]
    fn test_append_row_checks_arity() {
        let catalog = Catalog::new();
        users(&catalog);

        let result = catalog.append_row("users", Row::new(vec![Value::Int(1)]));
        assert!(matches!(result, Err(Error::SchemaMismatch(_))));
        assert_eq!(catalog.row_count("users").unwrap(), 0);
    }

    #[test]
    fn test_select_projects_in_requested_order() {
        let catalog = Catalog::new();
        users(&catalog);
        catalog
            .append_row("users", Row::new(vec![Value::Int(1), Value::from("foo")]))
            .unwrap();

        let (columns, rows) = catalog
            .select("users", &["name".to_string(), "id".to_string()])
            .unwrap();
        assert_eq!(columns[0].name, "name");
        assert_eq!(rows[0].values(), &[Value::from("foo"), Value::Int(1)]);

        let missing = catalog.select("users", &["email".to_string()]);
        assert!(matches!(missing, Err(Error::ColumnNotFound(_, _))));
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let catalog = Catalog::new();
        users(&catalog);
        catalog
            .append_row("users", Row::new(vec![Value::Int(1), Value::from("foo")]))
            .unwrap();

        let (_, rows) = catalog.select("users", &["id".to_string()]).unwrap();
        catalog
            .append_row("users", Row::new(vec![Value::Int(2), Value::from("bar")]))
            .unwrap();
        catalog.delete_rows("users").unwrap();

        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_wipe_and_list() {
        let catalog = Catalog::new();
        users(&catalog);
        TableBuilder::new("posts")
            .nullable_column("title", DataType::String)
            .build(&catalog)
            .unwrap();

        assert_eq!(catalog.list_tables(), vec!["users", "posts"]);
        let info = catalog.get_table_info("posts").unwrap();
        assert!(info.contains("title nullstring"));

        catalog.wipe();
        assert!(catalog.list_tables().is_empty());
        assert!(!catalog.table_exists("users"));
    }
}
