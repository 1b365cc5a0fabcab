//! SQL statement tree
//!
//! This module defines the typed statement tree produced by the parser.
//! Executors pattern-match on the root `Statement` variant.

use crate::catalog::DataType;
use crate::storage::{CompareOp, Value};

/// A SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// ALTER TABLE statement
    AlterTable(AlterTableStatement),
    /// DROP TABLE statement
    DropTable(DropTableStatement),
    /// INSERT statement
    Insert(InsertStatement),
    /// SELECT statement
    Select(SelectStatement),
    /// UPDATE statement
    Update(UpdateStatement),
    /// DELETE statement
    Delete(DeleteStatement),
    /// SHOW TABLES
    ShowTables,
    /// DESCRIBE <table>
    Describe(String),
    /// BEGIN transaction
    Begin,
    /// COMMIT
    Commit,
    /// ROLLBACK
    Rollback,
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name
    pub table_name: String,
    /// Column definitions
    pub columns: Vec<ColumnSpec>,
    /// IF NOT EXISTS flag
    pub if_not_exists: bool,
}

/// A parsed column definition
///
/// The constraint flags may appear in any order in the source. DEFAULT is a
/// lexed keyword the grammar does not accept; defaults are settable only
/// through the schema API.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,
    /// Declared type
    pub data_type: DataType,
    /// PRIMARY KEY flag
    pub primary_key: bool,
    /// UNIQUE flag
    pub unique: bool,
    /// NOT NULL flag
    pub not_null: bool,
    /// AUTO_INCREMENT flag
    pub auto_increment: bool,
}

/// ALTER TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStatement {
    /// Table name
    pub table_name: String,
    /// The schema change to apply
    pub action: AlterAction,
}

/// The action of an ALTER TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub enum AlterAction {
    /// ADD [COLUMN] <definition>
    AddColumn(ColumnSpec),
    /// DROP [COLUMN] <name>
    DropColumn(String),
    /// RENAME [COLUMN] <old> TO <new>
    RenameColumn { old: String, new: String },
    /// MODIFY [COLUMN] <definition>
    ModifyColumn(ColumnSpec),
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    /// Table name
    pub table_name: String,
    /// IF EXISTS flag
    pub if_exists: bool,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table name
    pub table_name: String,
    /// Explicit column list (None = all declared columns in order)
    pub columns: Option<Vec<String>>,
    /// Value rows
    pub values: Vec<Vec<Literal>>,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Base table name
    pub table_name: String,
    /// Projection (None = `*`)
    pub columns: Option<Vec<String>>,
    /// Optional JOIN clause
    pub join: Option<JoinClause>,
    /// WHERE condition tree
    pub where_clause: Option<Condition>,
    /// ORDER BY clause
    pub order_by: Option<OrderBy>,
    /// LIMIT clause
    pub limit: Option<usize>,
}

/// JOIN clause
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Join type (default INNER)
    pub join_type: JoinType,
    /// Joined table name
    pub table_name: String,
    /// Left side of `ON left = right` (a column of the base table)
    pub left_column: String,
    /// Right side of `ON left = right` (a column of the joined table)
    pub right_column: String,
}

/// Type of JOIN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

/// ORDER BY clause: one column with a direction
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Column to order by
    pub column: String,
    /// Descending (false = ascending)
    pub descending: bool,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table name
    pub table_name: String,
    /// SET clause (column = literal pairs)
    pub assignments: Vec<(String, Literal)>,
    /// WHERE condition tree
    pub where_clause: Option<Condition>,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table name
    pub table_name: String,
    /// WHERE condition tree
    pub where_clause: Option<Condition>,
}

/// WHERE condition tree
///
/// Leaves are `column OP literal`; AND and OR combine left-associatively
/// with equal precedence, exactly as the parser folds them.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column OP value` leaf
    Compare {
        column: String,
        op: CompareOp,
        value: Literal,
    },
    /// Conjunction
    And(Box<Condition>, Box<Condition>),
    /// Disjunction
    Or(Box<Condition>, Box<Condition>),
}

/// Literal value as written in the source
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// NULL
    Null,
    /// TRUE / FALSE
    Boolean(bool),
    /// Integer literal
    Integer(i64),
    /// Float literal
    Float(f64),
    /// String literal
    String(String),
}

impl Literal {
    /// Convert the source literal into a runtime value.
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Integer(n) => Value::Integer(*n),
            Literal::Float(f) => Value::Real(*f),
            Literal::String(s) => Value::Text(s.clone()),
        }
    }
}

impl ColumnSpec {
    /// A plain column of the given type with no constraints.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            unique: false,
            not_null: false,
            auto_increment: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_to_value() {
        assert_eq!(Literal::Null.to_value(), Value::Null);
        assert_eq!(Literal::Integer(7).to_value(), Value::Integer(7));
        assert_eq!(Literal::Float(1.5).to_value(), Value::Real(1.5));
        assert_eq!(
            Literal::String("a".into()).to_value(),
            Value::Text("a".into())
        );
    }
}
