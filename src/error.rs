//! Error types for wrendb
//!
//! This module defines all error types used throughout the database engine.

use crate::storage::Value;
use std::fmt;
use thiserror::Error;

/// Constraint violation sub-kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    NotNull,
    TypeMismatch,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::PrimaryKey => write!(f, "PRIMARY_KEY"),
            ConstraintKind::Unique => write!(f, "UNIQUE"),
            ConstraintKind::NotNull => write!(f, "NOT_NULL"),
            ConstraintKind::TypeMismatch => write!(f, "TYPE_MISMATCH"),
        }
    }
}

/// The main error type for wrendb
#[derive(Error, Debug)]
pub enum Error {
    // ========== Parser Errors ==========
    #[error("Syntax error at position {position}: {message}")]
    SyntaxError { message: String, position: usize },

    // ========== Catalog Errors ==========
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    // ========== Constraint Errors ==========
    #[error("Constraint violation ({kind}) on column '{column}': {message}")]
    ConstraintViolation {
        kind: ConstraintKind,
        column: String,
        value: Value,
        message: String,
    },

    // ========== Execution Errors ==========
    #[error("Execution error: {0}")]
    ExecutionError(String),

    // ========== Transaction Errors ==========
    #[error("Transaction error: {0}")]
    TransactionError(String),
}

impl Error {
    /// Stable taxonomy tag for host transports.
    pub fn code(&self) -> &'static str {
        match self {
            Error::SyntaxError { .. } => "SYNTAX_ERROR",
            Error::TableNotFound(_) => "TABLE_NOT_FOUND",
            Error::TableAlreadyExists(_) => "TABLE_ALREADY_EXISTS",
            Error::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Error::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION",
            Error::ExecutionError(_) => "EXECUTION_ERROR",
            Error::TransactionError(_) => "TRANSACTION_ERROR",
        }
    }

    /// Shorthand for a constraint violation.
    pub fn constraint(
        kind: ConstraintKind,
        column: impl Into<String>,
        value: Value,
        message: impl Into<String>,
    ) -> Self {
        Error::ConstraintViolation {
            kind,
            column: column.into(),
            value,
            message: message.into(),
        }
    }
}

/// Result type alias for wrendb operations
pub type Result<T> = std::result::Result<T, Error>;
