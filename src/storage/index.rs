//! Secondary indexes for wrendb
//!
//! An index is bound to one column and maps normalised values to row
//! positions (offsets into the owning table's row vector). Unique indexes
//! hold at most one position per key. NULL is never stored: a NULL value
//! participates in no index lookup.

use super::value::{like_match, CompareOp, Value};
use std::collections::HashMap;

/// A value → row-positions multi-map for one column; the owning table keys
/// its index map by column name
#[derive(Debug, Clone, Default)]
pub struct Index {
    /// Unique mode rejects a second entry for an existing key
    unique: bool,
    /// Normalised value → positions
    entries: HashMap<Value, Vec<usize>>,
}

impl Index {
    /// Create an empty index
    pub fn new(unique: bool) -> Self {
        Self {
            unique,
            entries: HashMap::new(),
        }
    }

    /// Is this a unique index?
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// The index key for a value: None for NULL (never stored), the
    /// normalised value otherwise.
    fn key(value: &Value) -> Option<Value> {
        if value.is_null() {
            None
        } else {
            Some(value.normalized())
        }
    }

    /// Does the index hold an entry for this value?
    pub fn contains(&self, value: &Value) -> bool {
        match Self::key(value) {
            Some(key) => self.entries.get(&key).is_some_and(|p| !p.is_empty()),
            None => false,
        }
    }

    /// Record `value → position`. NULL values are ignored.
    pub fn insert(&mut self, value: &Value, position: usize) {
        if let Some(key) = Self::key(value) {
            self.entries.entry(key).or_default().push(position);
        }
    }

    /// Remove a `value → position` entry if present.
    pub fn remove(&mut self, value: &Value, position: usize) {
        if let Some(key) = Self::key(value) {
            if let Some(positions) = self.entries.get_mut(&key) {
                positions.retain(|&p| p != position);
                if positions.is_empty() {
                    self.entries.remove(&key);
                }
            }
        }
    }

    /// Positions holding this value, in row-position order.
    pub fn lookup(&self, value: &Value) -> Vec<usize> {
        let mut positions = match Self::key(value) {
            Some(key) => self.entries.get(&key).cloned().unwrap_or_default(),
            None => Vec::new(),
        };
        positions.sort_unstable();
        positions
    }

    /// Positions whose keys satisfy `key OP value` under numeric coercion.
    /// Keys that do not coerce to a number are skipped.
    pub fn range_scan(&self, op: CompareOp, value: &Value) -> Vec<usize> {
        let mut positions: Vec<usize> = self
            .entries
            .iter()
            .filter(|(key, _)| key.matches(op, value))
            .flat_map(|(_, p)| p.iter().copied())
            .collect();
        positions.sort_unstable();
        positions
    }

    /// Positions whose string keys match a LIKE pattern. Non-string keys
    /// are skipped.
    pub fn like_scan(&self, pattern: &str) -> Vec<usize> {
        let mut positions: Vec<usize> = self
            .entries
            .iter()
            .filter(|(key, _)| match key {
                Value::Text(s) => like_match(s, pattern),
                _ => false,
            })
            .flat_map(|(_, p)| p.iter().copied())
            .collect();
        positions.sort_unstable();
        positions
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Snapshot of the full value → positions mapping, with each position
    /// list sorted. Used by invariant checks in tests.
    pub fn entries_snapshot(&self) -> HashMap<Value, Vec<usize>> {
        let mut snapshot = self.entries.clone();
        for positions in snapshot.values_mut() {
            positions.sort_unstable();
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut index = Index::new(true);
        index.insert(&Value::Text("A@X".into()), 0);

        // lookup is case-insensitive through normalisation
        assert_eq!(index.lookup(&Value::Text("a@x".into())), vec![0]);
        assert!(index.contains(&Value::Text("a@X".into())));
    }

    #[test]
    fn test_null_never_stored() {
        let mut index = Index::new(false);
        index.insert(&Value::Null, 0);
        assert!(!index.contains(&Value::Null));
        assert_eq!(index.lookup(&Value::Null), Vec::<usize>::new());
        assert_eq!(index.key_count(), 0);
    }

    #[test]
    fn test_non_unique_multi_positions() {
        let mut index = Index::new(false);
        index.insert(&Value::Integer(30), 2);
        index.insert(&Value::Integer(30), 0);
        assert_eq!(index.lookup(&Value::Integer(30)), vec![0, 2]);
    }

    #[test]
    fn test_remove() {
        let mut index = Index::new(false);
        index.insert(&Value::Integer(1), 0);
        index.insert(&Value::Integer(1), 1);
        index.remove(&Value::Integer(1), 0);
        assert_eq!(index.lookup(&Value::Integer(1)), vec![1]);
        index.remove(&Value::Integer(1), 1);
        assert!(!index.contains(&Value::Integer(1)));
    }

    #[test]
    fn test_range_scan_skips_non_numeric() {
        let mut index = Index::new(false);
        index.insert(&Value::Integer(5), 0);
        index.insert(&Value::Integer(15), 1);
        index.insert(&Value::Text("abc".into()), 2);
        index.insert(&Value::Text("12".into()), 3);

        let hits = index.range_scan(CompareOp::Gt, &Value::Integer(10));
        assert_eq!(hits, vec![1, 3]);
    }

    #[test]
    fn test_like_scan() {
        let mut index = Index::new(false);
        index.insert(&Value::Text("Alice".into()), 0);
        index.insert(&Value::Text("Bob".into()), 1);
        index.insert(&Value::Integer(3), 2);

        // keys are stored lowercased; matching is case-insensitive anyway
        assert_eq!(index.like_scan("a%"), vec![0]);
        assert_eq!(index.like_scan("%o%"), vec![1]);
    }
}
