//! Query results
//!
//! Every statement produces a `QueryResult`: a success payload or an error,
//! plus the wall-clock execution time. The payload is a discriminated
//! `ResultSet` whose variant matches the statement kind.

use crate::catalog::TableSchema;
use crate::error::Error;
use crate::storage::Row;
use serde::Serialize;
use std::time::Duration;

/// Success payload per statement kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResultSet {
    /// SELECT result: ordered rows and their count
    Select { rows: Vec<Row>, row_count: usize },
    /// INSERT result; `last_insert_id` is present iff the target table has
    /// an auto-increment primary key
    Insert {
        rows_affected: usize,
        last_insert_id: Option<i64>,
    },
    /// UPDATE result
    Update { rows_affected: usize },
    /// DELETE result
    Delete { rows_affected: usize },
    /// CREATE TABLE result
    CreateTable { table_name: String },
    /// DROP TABLE result
    DropTable { table_name: String },
    /// SHOW TABLES result: sorted table names
    ShowTables { tables: Vec<String> },
    /// DESCRIBE result: the full schema of the table
    Describe { schema: TableSchema },
    /// Transaction control acknowledgement
    Ok,
}

/// Result kind tag, for hosts that dispatch on shape rather than variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultKind {
    Select,
    Insert,
    Update,
    Delete,
    CreateTable,
    DropTable,
    ShowTables,
    Describe,
    Ok,
    Error,
}

/// The outcome of one statement
#[derive(Debug)]
pub struct QueryResult {
    /// Success payload or error
    pub result: Result<ResultSet, Error>,
    /// Wall-clock execution time
    pub execution_time: Duration,
}

impl QueryResult {
    pub fn new(result: Result<ResultSet, Error>, execution_time: Duration) -> Self {
        Self {
            result,
            execution_time,
        }
    }

    /// Did the statement succeed?
    pub fn success(&self) -> bool {
        self.result.is_ok()
    }

    /// The kind tag of this result
    pub fn kind(&self) -> ResultKind {
        match &self.result {
            Ok(ResultSet::Select { .. }) => ResultKind::Select,
            Ok(ResultSet::Insert { .. }) => ResultKind::Insert,
            Ok(ResultSet::Update { .. }) => ResultKind::Update,
            Ok(ResultSet::Delete { .. }) => ResultKind::Delete,
            Ok(ResultSet::CreateTable { .. }) => ResultKind::CreateTable,
            Ok(ResultSet::DropTable { .. }) => ResultKind::DropTable,
            Ok(ResultSet::ShowTables { .. }) => ResultKind::ShowTables,
            Ok(ResultSet::Describe { .. }) => ResultKind::Describe,
            Ok(ResultSet::Ok) => ResultKind::Ok,
            Err(_) => ResultKind::Error,
        }
    }

    /// Execution time in milliseconds (fractional below one millisecond)
    pub fn execution_time_ms(&self) -> f64 {
        self.execution_time.as_secs_f64() * 1_000.0
    }

    /// SELECT rows, if this is a successful SELECT
    pub fn rows(&self) -> Option<&[Row]> {
        match &self.result {
            Ok(ResultSet::Select { rows, .. }) => Some(rows),
            _ => None,
        }
    }

    /// Rows affected, for INSERT/UPDATE/DELETE results
    pub fn rows_affected(&self) -> Option<usize> {
        match &self.result {
            Ok(ResultSet::Insert { rows_affected, .. })
            | Ok(ResultSet::Update { rows_affected })
            | Ok(ResultSet::Delete { rows_affected }) => Some(*rows_affected),
            _ => None,
        }
    }

    /// The auto-increment id assigned by an INSERT, when present
    pub fn last_insert_id(&self) -> Option<i64> {
        match &self.result {
            Ok(ResultSet::Insert { last_insert_id, .. }) => *last_insert_id,
            _ => None,
        }
    }

    /// The error, if the statement failed
    pub fn error(&self) -> Option<&Error> {
        self.result.as_ref().err()
    }
}
