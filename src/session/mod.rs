//! Session and transaction management
//!
//! A session owns the committed catalog and routes every statement to its
//! executor. While a transaction is open the session additionally owns a
//! shadow catalog (a deep copy taken at BEGIN); all statements inside the
//! transaction read and write the shadow only. COMMIT swaps the shadow in,
//! ROLLBACK discards it.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::executor;
use crate::result::{QueryResult, ResultSet};
use crate::sql::{Parser, Statement};
use crate::storage::Table;
use serde::Serialize;
use std::time::Instant;

/// Point-in-time session statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Number of tables in the catalog currently in effect
    pub table_count: usize,
    /// Total rows across all tables
    pub total_rows: usize,
    /// Is a transaction open?
    pub in_transaction: bool,
}

/// A single-writer database session
#[derive(Debug, Default)]
pub struct Session {
    committed: Catalog,
    shadow: Option<Catalog>,
}

impl Session {
    /// Create a session with an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute one SQL statement and return its result.
    ///
    /// Never panics: parse and execution failures come back as error-shaped
    /// results. The wall-clock execution time is always measured.
    pub fn execute(&mut self, sql: &str) -> QueryResult {
        let started = Instant::now();
        let result = self.run(sql.trim());
        QueryResult::new(result, started.elapsed())
    }

    fn run(&mut self, sql: &str) -> Result<ResultSet> {
        let statement = Parser::new(sql).parse()?;
        tracing::debug!(statement = ?statement_kind(&statement), "dispatching statement");

        match statement {
            Statement::Begin => self.begin(),
            Statement::Commit => self.commit(),
            Statement::Rollback => self.rollback(),
            other => executor::dispatch(self.catalog_mut(), &other),
        }
    }

    /// Start a transaction by cloning the committed catalog into the shadow.
    pub fn begin(&mut self) -> Result<ResultSet> {
        if self.shadow.is_some() {
            return Err(Error::TransactionError(
                "transaction already in progress".to_string(),
            ));
        }
        self.shadow = Some(self.committed.clone());
        tracing::debug!("transaction started");
        Ok(ResultSet::Ok)
    }

    /// Atomically replace the committed catalog with the shadow.
    pub fn commit(&mut self) -> Result<ResultSet> {
        match self.shadow.take() {
            Some(shadow) => {
                self.committed = shadow;
                tracing::debug!("transaction committed");
                Ok(ResultSet::Ok)
            }
            None => Err(Error::TransactionError(
                "no transaction in progress".to_string(),
            )),
        }
    }

    /// Discard the shadow catalog.
    pub fn rollback(&mut self) -> Result<ResultSet> {
        match self.shadow.take() {
            Some(_) => {
                tracing::debug!("transaction rolled back");
                Ok(ResultSet::Ok)
            }
            None => Err(Error::TransactionError(
                "no transaction in progress".to_string(),
            )),
        }
    }

    /// Is a transaction open?
    pub fn in_transaction(&self) -> bool {
        self.shadow.is_some()
    }

    /// The catalog currently in effect: the shadow inside a transaction,
    /// the committed catalog otherwise.
    pub fn catalog(&self) -> &Catalog {
        self.shadow.as_ref().unwrap_or(&self.committed)
    }

    fn catalog_mut(&mut self) -> &mut Catalog {
        self.shadow.as_mut().unwrap_or(&mut self.committed)
    }

    /// Session statistics over the catalog currently in effect
    pub fn stats(&self) -> SessionStats {
        let catalog = self.catalog();
        SessionStats {
            table_count: catalog.table_count(),
            total_rows: catalog.total_rows(),
            in_transaction: self.in_transaction(),
        }
    }

    /// Sorted table names in the catalog currently in effect
    pub fn table_names(&self) -> Vec<String> {
        self.catalog().table_names()
    }

    /// Look up a table in the catalog currently in effect
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.catalog().table(name).ok()
    }

    /// Clear the catalog and abandon any in-progress transaction.
    pub fn reset(&mut self) {
        self.committed = Catalog::new();
        self.shadow = None;
        tracing::debug!("session reset");
    }
}

fn statement_kind(statement: &Statement) -> &'static str {
    match statement {
        Statement::CreateTable(_) => "CREATE TABLE",
        Statement::AlterTable(_) => "ALTER TABLE",
        Statement::DropTable(_) => "DROP TABLE",
        Statement::Insert(_) => "INSERT",
        Statement::Select(_) => "SELECT",
        Statement::Update(_) => "UPDATE",
        Statement::Delete(_) => "DELETE",
        Statement::ShowTables => "SHOW TABLES",
        Statement::Describe(_) => "DESCRIBE",
        Statement::Begin => "BEGIN",
        Statement::Commit => "COMMIT",
        Statement::Rollback => "ROLLBACK",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ResultKind;

    #[test]
    fn test_execute_round_trip() {
        let mut session = Session::new();

        let result = session.execute("CREATE TABLE t (a INTEGER)");
        assert!(result.success());
        assert_eq!(result.kind(), ResultKind::CreateTable);

        let result = session.execute("INSERT INTO t (a) VALUES (1)");
        assert_eq!(result.rows_affected(), Some(1));

        let result = session.execute("SELECT * FROM t");
        assert_eq!(result.rows().unwrap().len(), 1);
    }

    #[test]
    fn test_syntax_error_result() {
        let mut session = Session::new();
        let result = session.execute("SELEKT * FROM t");
        assert!(!result.success());
        assert_eq!(result.kind(), ResultKind::Error);
        assert_eq!(result.error().unwrap().code(), "SYNTAX_ERROR");
    }

    #[test]
    fn test_transaction_errors() {
        let mut session = Session::new();

        assert!(!session.execute("COMMIT").success());
        assert!(!session.execute("ROLLBACK").success());

        assert!(session.execute("BEGIN").success());
        let result = session.execute("BEGIN");
        assert_eq!(result.error().unwrap().code(), "TRANSACTION_ERROR");
    }

    #[test]
    fn test_stats_follow_catalog_in_effect() {
        let mut session = Session::new();
        session.execute("CREATE TABLE t (a INTEGER)");
        assert_eq!(session.stats().table_count, 1);

        session.execute("BEGIN");
        session.execute("CREATE TABLE u (b INTEGER)");
        assert_eq!(session.stats().table_count, 2);
        assert!(session.stats().in_transaction);

        session.execute("ROLLBACK");
        assert_eq!(session.stats().table_count, 1);
        assert!(!session.stats().in_transaction);
    }

    #[test]
    fn test_reset() {
        let mut session = Session::new();
        session.execute("CREATE TABLE t (a INTEGER)");
        session.execute("BEGIN");
        session.reset();

        assert_eq!(session.table_names().len(), 0);
        assert!(!session.in_transaction());
    }

    #[test]
    fn test_execution_time_is_measured() {
        let mut session = Session::new();
        let result = session.execute("SHOW TABLES");
        assert!(result.execution_time_ms() >= 0.0);
    }
}
