//! Schema definitions for wrendb
//!
//! Column definitions and table schemas. A schema invariant worth keeping in
//! mind: a primary-key column is always unique and not-null, and an
//! auto-increment column is always the INTEGER primary key. The executor
//! enforces this at CREATE/ALTER time; the builder methods here keep the
//! flags consistent for programmatic construction.

use super::types::DataType;
use crate::storage::Value;
use serde::Serialize;

/// Column definition in a table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Declared type
    pub data_type: DataType,
    /// Is this the primary key?
    pub primary_key: bool,
    /// Does this column auto-increment?
    pub auto_increment: bool,
    /// Must values be unique?
    pub unique: bool,
    /// Are NULLs rejected?
    pub not_null: bool,
    /// Default value used when an INSERT omits the column
    pub default: Option<Value>,
}

impl ColumnDef {
    /// Create a new column with no constraints
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            auto_increment: false,
            unique: false,
            not_null: false,
            default: None,
        }
    }

    /// Mark as primary key (implies unique and not-null)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.unique = true;
        self.not_null = true;
        self
    }

    /// Mark as auto-increment
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Mark as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark as not-null
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Set the default value
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Should this column be indexed (primary key or unique)?
    pub fn is_indexed(&self) -> bool {
        self.primary_key || self.unique
    }
}

/// Table schema: name plus the ordered column list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Ordered list of columns
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Create a schema from a column list
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get a column by name, mutably
    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnDef> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Check if a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// The primary-key column, if any
    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Columns backed by an index (primary key and unique columns)
    pub fn indexed_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.is_indexed())
    }

    /// Column names in declared order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
