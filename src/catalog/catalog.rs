//! Table catalog for wrendb
//!
//! The catalog maps table names to tables. A session owns one committed
//! catalog at all times; `Clone` produces the deep, independent copy used as
//! the shadow catalog while a transaction is open.

use crate::error::{Error, Result};
use crate::storage::Table;
use std::collections::HashMap;

/// Name → table mapping
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<String, Table>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new table
    pub fn create_table(&mut self, table: Table) -> Result<()> {
        let name = table.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(Error::TableAlreadyExists(name));
        }
        self.tables.insert(name, table);
        Ok(())
    }

    /// Get a table by name
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Get a table by name, mutably
    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Check if a table exists
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Drop a table
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        if self.tables.remove(name).is_none() {
            return Err(Error::TableNotFound(name.to_string()));
        }
        Ok(())
    }

    /// All table names, sorted
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of tables
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Total number of rows across all tables
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(|t| t.row_count()).sum()
    }
}
