//! Mutation statement execution: INSERT, UPDATE, DELETE.

use super::predicate::row_predicate;
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::result::ResultSet;
use crate::sql::ast::{DeleteStatement, InsertStatement, UpdateStatement};
use crate::storage::{Row, Value};
use std::collections::HashMap;

/// Execute INSERT.
///
/// Positional values are mapped onto the explicit column list, or onto all
/// declared columns in order when no list is given. Rows are inserted one at
/// a time; the first failure aborts the statement and earlier rows remain.
pub fn insert(catalog: &mut Catalog, stmt: &InsertStatement) -> Result<ResultSet> {
    let table = catalog.table_mut(&stmt.table_name)?;

    let columns: Vec<String> = match &stmt.columns {
        Some(cols) => {
            for col in cols {
                if !table.schema().has_column(col) {
                    return Err(Error::ColumnNotFound(col.clone()));
                }
            }
            cols.clone()
        }
        None => table
            .schema()
            .column_names()
            .into_iter()
            .map(String::from)
            .collect(),
    };

    let mut rows_affected = 0;
    let mut last_insert_id = None;

    for values in &stmt.values {
        if values.len() != columns.len() {
            return Err(Error::ExecutionError(format!(
                "expected {} values, got {}",
                columns.len(),
                values.len()
            )));
        }

        let data: Row = columns
            .iter()
            .cloned()
            .zip(values.iter().map(|v| v.to_value()))
            .collect();

        let outcome = table.insert(data)?;
        if outcome.last_insert_id.is_some() {
            last_insert_id = outcome.last_insert_id;
        }
        rows_affected += 1;
    }

    tracing::debug!(table = %stmt.table_name, rows = rows_affected, "rows inserted");

    Ok(ResultSet::Insert {
        rows_affected,
        last_insert_id,
    })
}

/// Execute UPDATE.
pub fn update(catalog: &mut Catalog, stmt: &UpdateStatement) -> Result<ResultSet> {
    let table = catalog.table_mut(&stmt.table_name)?;

    let changes: HashMap<String, Value> = stmt
        .assignments
        .iter()
        .map(|(col, lit)| (col.clone(), lit.to_value()))
        .collect();

    let rows_affected = table.update(&changes, row_predicate(stmt.where_clause.as_ref()))?;

    tracing::debug!(table = %stmt.table_name, rows = rows_affected, "rows updated");

    Ok(ResultSet::Update { rows_affected })
}

/// Execute DELETE.
pub fn delete(catalog: &mut Catalog, stmt: &DeleteStatement) -> Result<ResultSet> {
    let table = catalog.table_mut(&stmt.table_name)?;

    let rows_affected = table.delete(row_predicate(stmt.where_clause.as_ref()));

    tracing::debug!(table = %stmt.table_name, rows = rows_affected, "rows deleted");

    Ok(ResultSet::Delete { rows_affected })
}
