//! Scalar values for wrendb
//!
//! This module defines the tagged value type stored in rows and indexes,
//! together with the comparison semantics shared by the executor and the
//! index scans: normalised equality, numeric-coercion ordering, and LIKE
//! pattern matching.

use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A value in the database
///
/// Serialises untagged, so rows come out as plain JSON scalars.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value (64-bit signed; the SQL surface produces values that
    /// fit in 53 bits)
    Integer(i64),
    /// Real value (finite IEEE-754 double)
    Real(f64),
    /// Text value (UTF-8)
    Text(String),
    /// Date value (milliseconds since the Unix epoch)
    Date(i64),
}

// PartialEq is implemented manually so Real compares bitwise; this makes
// Value usable as a hash-map key in indexes.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(v) => v.hash(state),
            Value::Integer(v) => v.hash(state),
            Value::Real(v) => v.to_bits().hash(state),
            Value::Text(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
        }
    }
}

/// Comparison operators usable in WHERE leaves and index scans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Like,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::NotEq => write!(f, "!="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::LtEq => write!(f, "<="),
            CompareOp::GtEq => write!(f, ">="),
            CompareOp::Like => write!(f, "LIKE"),
        }
    }
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The form used for equality and index keys: TEXT is lowercased,
    /// everything else is unchanged.
    pub fn normalized(&self) -> Value {
        match self {
            Value::Text(s) => Value::Text(s.to_lowercase()),
            other => other.clone(),
        }
    }

    /// Numeric coercion used by the ordering operators: INTEGER and REAL
    /// as-is, DATE as epoch milliseconds, TEXT by parsing. BOOLEAN and NULL
    /// do not coerce.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Real(f) => Some(*f),
            Value::Date(ms) => Some(*ms as f64),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Date(_) => "DATE",
        }
    }

    /// Equality under the engine's rules: NULL equals only NULL, TEXT is
    /// case-insensitive, INTEGER and REAL compare numerically, other types
    /// by value.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Text(a), Value::Text(b)) => a.to_lowercase() == b.to_lowercase(),
            (Value::Integer(a), Value::Real(b)) => (*a as f64) == *b,
            (Value::Real(a), Value::Integer(b)) => *a == (*b as f64),
            (a, b) => a == b,
        }
    }

    /// Evaluate `self OP other`.
    ///
    /// Ordering operators coerce both sides to numbers and are false when
    /// either side does not coerce; LIKE requires two strings.
    pub fn matches(&self, op: CompareOp, other: &Value) -> bool {
        match op {
            CompareOp::Eq => self.equals(other),
            CompareOp::NotEq => {
                if self.is_null() || other.is_null() {
                    false
                } else {
                    !self.equals(other)
                }
            }
            CompareOp::Lt | CompareOp::Gt | CompareOp::LtEq | CompareOp::GtEq => {
                let (a, b) = match (self.as_number(), other.as_number()) {
                    (Some(a), Some(b)) => (a, b),
                    _ => return false,
                };
                match op {
                    CompareOp::Lt => a < b,
                    CompareOp::Gt => a > b,
                    CompareOp::LtEq => a <= b,
                    CompareOp::GtEq => a >= b,
                    _ => unreachable!(),
                }
            }
            CompareOp::Like => match (self, other) {
                (Value::Text(s), Value::Text(pattern)) => like_match(s, pattern),
                _ => false,
            },
        }
    }

    /// Comparator for ORDER BY: NULLs are handled by the caller; numeric
    /// pairs compare numerically, DATE pairs by epoch milliseconds, and
    /// everything else by the string form.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Integer(_) | Value::Real(_), Value::Integer(_) | Value::Real(_)) => {
                let a = self.as_number().unwrap_or(0.0);
                let b = other.as_number().unwrap_or(0.0);
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            _ => self.to_string().cmp(&other.to_string()),
        }
    }
}

/// Match a string against a LIKE pattern: `%` matches any sequence, `_`
/// matches a single character, everything else is literal. Matching is
/// case-insensitive and anchored at both ends.
pub fn like_match(s: &str, pattern: &str) -> bool {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push_str("^(?i)");
    for ch in pattern.chars() {
        match ch {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            ch => regex.push_str(&regex::escape(&ch.to_string())),
        }
    }
    regex.push('$');

    match Regex::new(&regex) {
        Ok(re) => re.is_match(s),
        Err(_) => false,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Date(ms) => write!(f, "{}", ms),
        }
    }
}
