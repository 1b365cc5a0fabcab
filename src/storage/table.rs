//! Table storage for wrendb
//!
//! A table owns its schema, an ordered row vector, one index per
//! primary-key or unique column, and the auto-increment counter. All
//! mutating operations keep the indexes consistent with the row vector;
//! DELETE does so by rebuilding them outright, since splicing rows out
//! reassigns every later row position.

use super::index::Index;
use super::value::{CompareOp, Value};
use crate::catalog::{ColumnDef, TableSchema};
use crate::error::{ConstraintKind, Error, Result};
use std::collections::HashMap;

/// A row: column name → value over exactly the schema's columns
pub type Row = HashMap<String, Value>;

/// Result of a successful single-row insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Position of the new row in the row vector
    pub position: usize,
    /// The auto-increment id assigned to this row, if any
    pub last_insert_id: Option<i64>,
}

/// A table: schema + rows + indexes + auto-increment counter
#[derive(Debug, Clone)]
pub struct Table {
    schema: TableSchema,
    rows: Vec<Row>,
    indexes: HashMap<String, Index>,
    next_auto_id: i64,
}

impl Table {
    /// Create an empty table for a schema
    pub fn new(schema: TableSchema) -> Self {
        let mut table = Self {
            schema,
            rows: Vec::new(),
            indexes: HashMap::new(),
            next_auto_id: 1,
        };
        table.rebuild_indexes();
        table
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    /// Table schema
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// All rows, in position order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The next auto-increment value
    pub fn auto_increment(&self) -> i64 {
        self.next_auto_id
    }

    /// The index on a column, if one exists
    pub fn index(&self, column: &str) -> Option<&Index> {
        self.indexes.get(column)
    }

    /// Insert one row from a column → value map.
    ///
    /// Values are selected per column in declared order: the auto-increment
    /// primary key consumes the counter, missing values fall back to the
    /// column default (when non-null) and then NULL. Each value is validated
    /// against the column type, then unique indexes are updated with backout
    /// on duplicates, and finally the row is appended.
    pub fn insert(&mut self, mut data: Row) -> Result<InsertOutcome> {
        let mut row = Row::with_capacity(self.schema.column_count());
        let mut last_insert_id = None;

        for col in &self.schema.columns {
            let value = if col.auto_increment && col.primary_key {
                let id = self.next_auto_id;
                self.next_auto_id += 1;
                last_insert_id = Some(id);
                Value::Integer(id)
            } else {
                match data.remove(&col.name) {
                    Some(v) => v,
                    None => match &col.default {
                        Some(d) if !d.is_null() => d.clone(),
                        _ => Value::Null,
                    },
                }
            };

            let value = validate_value(col, value)?;
            row.insert(col.name.clone(), value);
        }

        let position = self.rows.len();
        let mut inserted: Vec<&str> = Vec::new();

        for col in self.schema.indexed_columns() {
            let value = &row[&col.name];
            let index = self
                .indexes
                .get_mut(&col.name)
                .expect("indexed column has an index");

            if index.is_unique() && index.contains(value) {
                let kind = if col.primary_key {
                    ConstraintKind::PrimaryKey
                } else {
                    ConstraintKind::Unique
                };
                let err = Error::constraint(
                    kind,
                    &col.name,
                    value.clone(),
                    format!("duplicate value for column '{}'", col.name),
                );
                // undo the partial index insertions for this row
                for name in inserted {
                    if let Some(ix) = self.indexes.get_mut(name) {
                        ix.remove(&row[name], position);
                    }
                }
                return Err(err);
            }

            index.insert(value, position);
            inserted.push(&col.name);
        }

        self.rows.push(row);
        Ok(InsertOutcome {
            position,
            last_insert_id,
        })
    }

    /// Update every row satisfying the predicate with the given column →
    /// value assignments.
    ///
    /// Target columns are resolved and new values validated before any row
    /// is touched. Rows are then updated in position order; the first
    /// uniqueness conflict stops the update and earlier rows stay modified.
    pub fn update(
        &mut self,
        changes: &HashMap<String, Value>,
        predicate: impl Fn(&Row) -> bool,
    ) -> Result<usize> {
        // validate targets up front, in declared column order
        let mut assignments: Vec<(String, Value)> = Vec::with_capacity(changes.len());
        for col in &self.schema.columns {
            if let Some(value) = changes.get(&col.name) {
                let value = validate_value(col, value.clone())?;
                assignments.push((col.name.clone(), value));
            }
        }
        if assignments.len() != changes.len() {
            let unknown = changes
                .keys()
                .find(|name| !self.schema.has_column(name.as_str()))
                .cloned()
                .unwrap_or_default();
            return Err(Error::ColumnNotFound(unknown));
        }

        let mut affected = 0;
        for position in 0..self.rows.len() {
            if !predicate(&self.rows[position]) {
                continue;
            }

            for (name, new_value) in &assignments {
                if let Some(index) = self.indexes.get_mut(name) {
                    let old_value = self.rows[position][name].clone();
                    index.remove(&old_value, position);
                    if index.is_unique() && index.contains(new_value) {
                        index.insert(&old_value, position);
                        let col = self.schema.column(name).expect("validated column");
                        let kind = if col.primary_key {
                            ConstraintKind::PrimaryKey
                        } else {
                            ConstraintKind::Unique
                        };
                        return Err(Error::constraint(
                            kind,
                            name,
                            new_value.clone(),
                            format!("duplicate value for column '{}'", name),
                        ));
                    }
                    index.insert(new_value, position);
                }
                self.rows[position].insert(name.clone(), new_value.clone());
            }
            affected += 1;
        }

        Ok(affected)
    }

    /// Delete every row satisfying the predicate. Rows are spliced out in
    /// descending position order and the indexes rebuilt from the survivors.
    pub fn delete(&mut self, predicate: impl Fn(&Row) -> bool) -> usize {
        let matches: Vec<usize> = (0..self.rows.len())
            .filter(|&p| predicate(&self.rows[p]))
            .collect();

        for &position in matches.iter().rev() {
            self.rows.remove(position);
        }

        if !matches.is_empty() {
            self.rebuild_indexes();
        }

        matches.len()
    }

    /// Rows holding `value` in an indexed column, in position order.
    /// Returns an empty vector when the column has no index.
    pub fn find_by_index(&self, column: &str, value: &Value) -> Vec<&Row> {
        match self.indexes.get(column) {
            Some(index) => index
                .lookup(value)
                .into_iter()
                .map(|p| &self.rows[p])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Index-backed scan for `column OP value`, in position order.
    /// Equality uses a direct lookup; ordering operators use a range scan
    /// over the keys; LIKE scans string keys only. Returns None when the
    /// scan cannot be served from the index: no index on the column,
    /// inequality, or a numeric equality literal (index keys are hashed
    /// tag-exact, but INTEGER and REAL values compare equal numerically).
    pub fn index_scan(&self, column: &str, op: CompareOp, value: &Value) -> Option<Vec<&Row>> {
        let index = self.indexes.get(column)?;
        let positions = match op {
            CompareOp::Eq => match value {
                Value::Integer(_) | Value::Real(_) => return None,
                _ => index.lookup(value),
            },
            CompareOp::Like => match value {
                Value::Text(pattern) => index.like_scan(pattern),
                _ => Vec::new(),
            },
            CompareOp::NotEq => return None,
            _ => index.range_scan(op, value),
        };
        Some(positions.into_iter().map(|p| &self.rows[p]).collect())
    }

    /// Atomically replace schema and rows, rebuilding indexes for the new
    /// schema's primary/unique columns. The auto-increment counter is
    /// preserved.
    pub fn alter_schema(&mut self, schema: TableSchema, rows: Vec<Row>) {
        self.schema = schema;
        self.rows = rows;
        self.rebuild_indexes();
    }

    /// Rebuild every index from the current rows.
    fn rebuild_indexes(&mut self) {
        let mut indexes: HashMap<String, Index> = HashMap::new();

        for col in self.schema.indexed_columns() {
            let mut index = Index::new(col.unique || col.primary_key);
            for (position, row) in self.rows.iter().enumerate() {
                if let Some(value) = row.get(&col.name) {
                    index.insert(value, position);
                }
            }
            indexes.insert(col.name.clone(), index);
        }

        self.indexes = indexes;
    }
}

/// Validate a value against a column definition: NOT NULL first, then type
/// coercion. Returns the coerced value.
fn validate_value(col: &ColumnDef, value: Value) -> Result<Value> {
    if value.is_null() {
        if col.not_null {
            return Err(Error::constraint(
                ConstraintKind::NotNull,
                &col.name,
                Value::Null,
                format!("column '{}' does not allow NULL", col.name),
            ));
        }
        return Ok(Value::Null);
    }

    col.data_type.coerce(&value).ok_or_else(|| {
        Error::constraint(
            ConstraintKind::TypeMismatch,
            &col.name,
            value.clone(),
            format!(
                "{} value '{}' is not coercible to {} for column '{}'",
                value.type_name(),
                value,
                col.data_type,
                col.name
            ),
        )
    })
}
