//! Data types for wrendb
//!
//! This module defines the SQL data types supported by the engine and the
//! write-path coercion rules that turn caller-supplied values into values of
//! the declared column type.

use crate::storage::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// SQL Data Types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    /// Signed integer
    Integer,
    /// UTF-8 text
    Text,
    /// Boolean
    Boolean,
    /// IEEE-754 double
    Real,
    /// Instant with millisecond resolution
    Date,
}

impl DataType {
    /// Coerce a value to this type.
    ///
    /// Returns None when the value does not coerce; callers turn that into a
    /// TYPE_MISMATCH constraint violation naming the column. NULL is handled
    /// before coercion and never reaches this function.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match self {
            DataType::Integer => match value {
                Value::Integer(n) => Some(Value::Integer(*n)),
                // only strings whose round-trip equals the input
                Value::Text(s) => s
                    .parse::<i64>()
                    .ok()
                    .filter(|n| n.to_string() == *s)
                    .map(Value::Integer),
                _ => None,
            },
            DataType::Text => match value {
                Value::Text(s) => Some(Value::Text(s.clone())),
                Value::Integer(_) | Value::Real(_) | Value::Boolean(_) => {
                    Some(Value::Text(value.to_string()))
                }
                _ => None,
            },
            DataType::Boolean => match value {
                Value::Boolean(b) => Some(Value::Boolean(*b)),
                Value::Integer(n) => Some(Value::Boolean(*n != 0)),
                Value::Real(f) => Some(Value::Boolean(*f != 0.0)),
                Value::Text(s) => match s.to_lowercase().as_str() {
                    "true" | "1" | "yes" => Some(Value::Boolean(true)),
                    "false" | "0" | "no" => Some(Value::Boolean(false)),
                    _ => None,
                },
                _ => None,
            },
            DataType::Real => match value {
                Value::Real(f) if f.is_finite() => Some(Value::Real(*f)),
                Value::Integer(n) => Some(Value::Real(*n as f64)),
                Value::Text(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(Value::Real),
                _ => None,
            },
            DataType::Date => match value {
                Value::Date(ms) => Some(Value::Date(*ms)),
                Value::Integer(n) => Some(Value::Date(*n)),
                Value::Real(f) if f.is_finite() => Some(Value::Date(*f as i64)),
                Value::Text(s) => parse_date_millis(s).map(Value::Date),
                _ => None,
            },
        }
    }
}

/// Parse a date string to epoch milliseconds. Accepts RFC 3339, then
/// `YYYY-MM-DD HH:MM:SS`, then bare `YYYY-MM-DD` (midnight UTC).
fn parse_date_millis(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc().timestamp_millis());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
    }
    None
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Real => write!(f, "REAL"),
            DataType::Date => write!(f, "DATE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_coercion() {
        assert_eq!(
            DataType::Integer.coerce(&Value::Text("42".into())),
            Some(Value::Integer(42))
        );
        // round-trip must equal the input
        assert_eq!(DataType::Integer.coerce(&Value::Text("+42".into())), None);
        assert_eq!(DataType::Integer.coerce(&Value::Text("42.5".into())), None);
        assert_eq!(DataType::Integer.coerce(&Value::Text("x".into())), None);
        assert_eq!(DataType::Integer.coerce(&Value::Boolean(true)), None);
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(
            DataType::Text.coerce(&Value::Integer(7)),
            Some(Value::Text("7".into()))
        );
        assert_eq!(
            DataType::Text.coerce(&Value::Boolean(false)),
            Some(Value::Text("false".into()))
        );
        assert_eq!(DataType::Text.coerce(&Value::Date(0)), None);
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(
            DataType::Boolean.coerce(&Value::Text("YES".into())),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            DataType::Boolean.coerce(&Value::Text("0".into())),
            Some(Value::Boolean(false))
        );
        assert_eq!(
            DataType::Boolean.coerce(&Value::Integer(3)),
            Some(Value::Boolean(true))
        );
        assert_eq!(DataType::Boolean.coerce(&Value::Text("maybe".into())), None);
    }

    #[test]
    fn test_real_coercion() {
        assert_eq!(
            DataType::Real.coerce(&Value::Text("3.5".into())),
            Some(Value::Real(3.5))
        );
        assert_eq!(
            DataType::Real.coerce(&Value::Integer(2)),
            Some(Value::Real(2.0))
        );
        assert_eq!(DataType::Real.coerce(&Value::Real(f64::INFINITY)), None);
        assert_eq!(DataType::Real.coerce(&Value::Text("inf".into())), None);
    }

    #[test]
    fn test_date_coercion() {
        assert_eq!(
            DataType::Date.coerce(&Value::Text("1970-01-01".into())),
            Some(Value::Date(0))
        );
        assert_eq!(
            DataType::Date.coerce(&Value::Text("1970-01-01 00:00:01".into())),
            Some(Value::Date(1_000))
        );
        assert_eq!(
            DataType::Date.coerce(&Value::Text("1970-01-01T00:00:00Z".into())),
            Some(Value::Date(0))
        );
        assert_eq!(
            DataType::Date.coerce(&Value::Integer(1234)),
            Some(Value::Date(1234))
        );
        assert_eq!(DataType::Date.coerce(&Value::Text("yesterday".into())), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(DataType::Integer.to_string(), "INTEGER");
        assert_eq!(DataType::Date.to_string(), "DATE");
    }
}
