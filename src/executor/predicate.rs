//! WHERE-clause evaluation
//!
//! A condition tree is evaluated against one row at a time using the shared
//! value comparison semantics. A missing column reads as NULL, which makes
//! every comparison against it false except `= NULL`.

use crate::sql::ast::Condition;
use crate::storage::{Row, Value};

/// Evaluate a condition tree against a row.
pub fn eval(condition: &Condition, row: &Row) -> bool {
    match condition {
        Condition::Compare { column, op, value } => {
            let cell = row.get(column).cloned().unwrap_or(Value::Null);
            cell.matches(*op, &value.to_value())
        }
        Condition::And(left, right) => eval(left, row) && eval(right, row),
        Condition::Or(left, right) => eval(left, row) || eval(right, row),
    }
}

/// Build a row predicate from an optional WHERE clause; absence means every
/// row matches.
pub fn row_predicate(condition: Option<&Condition>) -> impl Fn(&Row) -> bool + '_ {
    move |row| match condition {
        Some(cond) => eval(cond, row),
        None => true,
    }
}
