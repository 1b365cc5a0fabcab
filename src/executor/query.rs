//! SELECT execution
//!
//! The pipeline runs in a fixed order: fetch base rows, apply the WHERE
//! filter, join, project, sort, limit. The WHERE filter runs against the
//! base table's rows before any join, so its column names are unprefixed.

use super::predicate::eval;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::result::ResultSet;
use crate::sql::ast::{Condition, JoinClause, JoinType, OrderBy, SelectStatement};
use crate::storage::{Row, Table, Value};
use std::cmp::Ordering;

/// Execute SELECT.
pub fn select(catalog: &Catalog, stmt: &SelectStatement) -> Result<ResultSet> {
    let table = catalog.table(&stmt.table_name)?;

    let mut rows = fetch_filtered(table, stmt.where_clause.as_ref());

    if let Some(join) = &stmt.join {
        let right = catalog.table(&join.table_name)?;
        rows = apply_join(&stmt.table_name, rows, join, right);
    }

    if let Some(columns) = &stmt.columns {
        rows = rows
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
                    .collect()
            })
            .collect();
    }

    if let Some(order) = &stmt.order_by {
        sort_rows(&mut rows, order);
    }

    if let Some(limit) = stmt.limit {
        rows.truncate(limit);
    }

    let row_count = rows.len();
    tracing::debug!(table = %stmt.table_name, rows = row_count, "select executed");

    Ok(ResultSet::Select { rows, row_count })
}

/// Fetch the base rows with the WHERE filter applied.
///
/// A single-leaf WHERE on an indexed column with a non-NULL literal is
/// served straight from the index; every other shape is a full scan. The
/// NULL guard keeps `col = NULL` semantics identical on both paths, since
/// NULL is never stored in an index; `index_scan` itself refuses shapes its
/// hashed keys cannot answer (inequality, numeric equality).
fn fetch_filtered(table: &Table, where_clause: Option<&Condition>) -> Vec<Row> {
    if let Some(Condition::Compare { column, op, value }) = where_clause {
        let value = value.to_value();
        if !value.is_null() {
            if let Some(rows) = table.index_scan(column, *op, &value) {
                return rows.into_iter().cloned().collect();
            }
        }
    }

    match where_clause {
        Some(cond) => table
            .rows()
            .iter()
            .filter(|row| eval(cond, row))
            .cloned()
            .collect(),
        None => table.rows().to_vec(),
    }
}

/// Nested-loop join. Every output key is prefixed `<table>.<column>`.
/// Unmatched sides of LEFT/RIGHT joins are padded with NULL columns keyed
/// like a sample row from the other side; an empty side contributes no
/// columns at all.
fn apply_join(left_name: &str, left_rows: Vec<Row>, join: &JoinClause, right: &Table) -> Vec<Row> {
    let right_rows = right.rows();
    let right_name = &join.table_name;
    let mut out = Vec::new();

    // join key equality is strict value equality, no normalisation
    let key_eq = |l: &Row, r: &Row| -> bool {
        let lv = l.get(&join.left_column).cloned().unwrap_or(Value::Null);
        let rv = r.get(&join.right_column).cloned().unwrap_or(Value::Null);
        lv == rv
    };

    match join.join_type {
        JoinType::Inner => {
            for l in &left_rows {
                for r in right_rows {
                    if key_eq(l, r) {
                        out.push(merge(left_name, l, right_name, r));
                    }
                }
            }
        }
        JoinType::Left => {
            let right_sample = right_rows.first();
            for l in &left_rows {
                let mut matched = false;
                for r in right_rows {
                    if key_eq(l, r) {
                        out.push(merge(left_name, l, right_name, r));
                        matched = true;
                    }
                }
                if !matched {
                    let pad = null_row_like(right_sample);
                    out.push(merge(left_name, l, right_name, &pad));
                }
            }
        }
        JoinType::Right => {
            let left_sample = left_rows.first();
            for r in right_rows {
                let mut matched = false;
                for l in &left_rows {
                    if key_eq(l, r) {
                        out.push(merge(left_name, l, right_name, r));
                        matched = true;
                    }
                }
                if !matched {
                    let pad = null_row_like(left_sample);
                    out.push(merge(left_name, &pad, right_name, r));
                }
            }
        }
    }

    out
}

/// Merge two source rows into one joined row with prefixed keys.
fn merge(left_name: &str, left: &Row, right_name: &str, right: &Row) -> Row {
    let mut row = Row::with_capacity(left.len() + right.len());
    for (key, value) in left {
        row.insert(format!("{}.{}", left_name, key), value.clone());
    }
    for (key, value) in right {
        row.insert(format!("{}.{}", right_name, key), value.clone());
    }
    row
}

/// A row with the sample's keys and NULL in every column. No sample (the
/// side was empty) gives an empty row.
fn null_row_like(sample: Option<&Row>) -> Row {
    match sample {
        Some(row) => row.keys().map(|k| (k.clone(), Value::Null)).collect(),
        None => Row::new(),
    }
}

/// Sort rows in place. NULLs go last in both directions; the direction only
/// negates comparisons between non-NULL values.
fn sort_rows(rows: &mut [Row], order: &OrderBy) {
    rows.sort_by(|a, b| {
        let av = a.get(&order.column).filter(|v| !v.is_null());
        let bv = b.get(&order.column).filter(|v| !v.is_null());
        match (av, bv) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = x.sort_cmp(y);
                if order.descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDef, DataType, TableSchema};
    use crate::sql::ast::Literal;
    use crate::storage::CompareOp;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn catalog_with(name: &str, columns: Vec<ColumnDef>, rows: Vec<Row>) -> Catalog {
        let mut catalog = Catalog::new();
        let mut table = Table::new(TableSchema::new(name, columns));
        for r in rows {
            table.insert(r).unwrap();
        }
        catalog.create_table(table).unwrap();
        catalog
    }

    fn plain_select(table: &str) -> SelectStatement {
        SelectStatement {
            table_name: table.to_string(),
            columns: None,
            join: None,
            where_clause: None,
            order_by: None,
            limit: None,
        }
    }

    #[test]
    fn test_select_star() {
        let catalog = catalog_with(
            "t",
            vec![ColumnDef::new("a", DataType::Integer)],
            vec![row(&[("a", Value::Integer(1))]), row(&[("a", Value::Integer(2))])],
        );

        match select(&catalog, &plain_select("t")).unwrap() {
            ResultSet::Select { rows, row_count } => {
                assert_eq!(row_count, 2);
                assert_eq!(rows[0]["a"], Value::Integer(1));
            }
            other => panic!("expected Select, got {:?}", other),
        }
    }

    #[test]
    fn test_select_missing_table() {
        let catalog = Catalog::new();
        assert!(select(&catalog, &plain_select("nope")).is_err());
    }

    #[test]
    fn test_projection_inserts_null_for_missing() {
        let catalog = catalog_with(
            "t",
            vec![ColumnDef::new("a", DataType::Integer)],
            vec![row(&[("a", Value::Integer(1))])],
        );

        let mut stmt = plain_select("t");
        stmt.columns = Some(vec!["a".to_string(), "ghost".to_string()]);

        match select(&catalog, &stmt).unwrap() {
            ResultSet::Select { rows, .. } => {
                assert_eq!(rows[0]["a"], Value::Integer(1));
                assert_eq!(rows[0]["ghost"], Value::Null);
                assert_eq!(rows[0].len(), 2);
            }
            other => panic!("expected Select, got {:?}", other),
        }
    }

    #[test]
    fn test_where_filter() {
        let catalog = catalog_with(
            "t",
            vec![ColumnDef::new("a", DataType::Integer)],
            vec![
                row(&[("a", Value::Integer(1))]),
                row(&[("a", Value::Integer(2))]),
                row(&[("a", Value::Integer(3))]),
            ],
        );

        let mut stmt = plain_select("t");
        stmt.where_clause = Some(Condition::Compare {
            column: "a".to_string(),
            op: CompareOp::GtEq,
            value: Literal::Integer(2),
        });

        match select(&catalog, &stmt).unwrap() {
            ResultSet::Select { row_count, .. } => assert_eq!(row_count, 2),
            other => panic!("expected Select, got {:?}", other),
        }
    }

    #[test]
    fn test_inner_join_prefixes_columns() {
        let mut catalog = catalog_with(
            "orders",
            vec![
                ColumnDef::new("id", DataType::Integer),
                ColumnDef::new("customer_id", DataType::Integer),
                ColumnDef::new("amount", DataType::Integer),
            ],
            vec![row(&[
                ("id", Value::Integer(10)),
                ("customer_id", Value::Integer(1)),
                ("amount", Value::Integer(5)),
            ])],
        );
        let mut customers = Table::new(TableSchema::new(
            "customers",
            vec![
                ColumnDef::new("id", DataType::Integer),
                ColumnDef::new("name", DataType::Text),
            ],
        ));
        customers
            .insert(row(&[
                ("id", Value::Integer(1)),
                ("name", Value::Text("A".into())),
            ]))
            .unwrap();
        catalog.create_table(customers).unwrap();

        let mut stmt = plain_select("orders");
        stmt.join = Some(JoinClause {
            join_type: JoinType::Inner,
            table_name: "customers".to_string(),
            left_column: "customer_id".to_string(),
            right_column: "id".to_string(),
        });

        match select(&catalog, &stmt).unwrap() {
            ResultSet::Select { rows, row_count } => {
                assert_eq!(row_count, 1);
                let joined = &rows[0];
                assert_eq!(joined["orders.id"], Value::Integer(10));
                assert_eq!(joined["orders.customer_id"], Value::Integer(1));
                assert_eq!(joined["orders.amount"], Value::Integer(5));
                assert_eq!(joined["customers.id"], Value::Integer(1));
                assert_eq!(joined["customers.name"], Value::Text("A".into()));
                assert_eq!(joined.len(), 5);
            }
            other => panic!("expected Select, got {:?}", other),
        }
    }

    #[test]
    fn test_left_join_pads_with_nulls() {
        let mut catalog = catalog_with(
            "a",
            vec![
                ColumnDef::new("id", DataType::Integer),
                ColumnDef::new("b_id", DataType::Integer),
            ],
            vec![
                row(&[("id", Value::Integer(1)), ("b_id", Value::Integer(100))]),
                row(&[("id", Value::Integer(2)), ("b_id", Value::Integer(999))]),
            ],
        );
        let mut b = Table::new(TableSchema::new(
            "b",
            vec![
                ColumnDef::new("id", DataType::Integer),
                ColumnDef::new("tag", DataType::Text),
            ],
        ));
        b.insert(row(&[
            ("id", Value::Integer(100)),
            ("tag", Value::Text("x".into())),
        ]))
        .unwrap();
        catalog.create_table(b).unwrap();

        let mut stmt = plain_select("a");
        stmt.join = Some(JoinClause {
            join_type: JoinType::Left,
            table_name: "b".to_string(),
            left_column: "b_id".to_string(),
            right_column: "id".to_string(),
        });

        match select(&catalog, &stmt).unwrap() {
            ResultSet::Select { rows, row_count } => {
                assert_eq!(row_count, 2);
                // matched row has real values
                assert_eq!(rows[0]["b.tag"], Value::Text("x".into()));
                // unmatched row has the same key set, all NULL on the right
                assert_eq!(rows[1]["b.tag"], Value::Null);
                assert_eq!(rows[1]["b.id"], Value::Null);
            }
            other => panic!("expected Select, got {:?}", other),
        }
    }

    #[test]
    fn test_left_join_against_empty_side_omits_columns() {
        let mut catalog = catalog_with(
            "a",
            vec![ColumnDef::new("id", DataType::Integer)],
            vec![row(&[("id", Value::Integer(1))])],
        );
        catalog
            .create_table(Table::new(TableSchema::new(
                "b",
                vec![ColumnDef::new("id", DataType::Integer)],
            )))
            .unwrap();

        let mut stmt = plain_select("a");
        stmt.join = Some(JoinClause {
            join_type: JoinType::Left,
            table_name: "b".to_string(),
            left_column: "id".to_string(),
            right_column: "id".to_string(),
        });

        match select(&catalog, &stmt).unwrap() {
            ResultSet::Select { rows, .. } => {
                assert_eq!(rows[0].len(), 1);
                assert_eq!(rows[0]["a.id"], Value::Integer(1));
            }
            other => panic!("expected Select, got {:?}", other),
        }
    }

    #[test]
    fn test_join_key_equality_is_case_sensitive() {
        let mut catalog = catalog_with(
            "l",
            vec![ColumnDef::new("k", DataType::Text)],
            vec![row(&[("k", Value::Text("Key".into()))])],
        );
        let mut r = Table::new(TableSchema::new(
            "r",
            vec![ColumnDef::new("k", DataType::Text)],
        ));
        r.insert(row(&[("k", Value::Text("key".into()))])).unwrap();
        catalog.create_table(r).unwrap();

        let mut stmt = plain_select("l");
        stmt.join = Some(JoinClause {
            join_type: JoinType::Inner,
            table_name: "r".to_string(),
            left_column: "k".to_string(),
            right_column: "k".to_string(),
        });

        match select(&catalog, &stmt).unwrap() {
            ResultSet::Select { row_count, .. } => assert_eq!(row_count, 0),
            other => panic!("expected Select, got {:?}", other),
        }
    }

    #[test]
    fn test_order_by_nulls_always_last() {
        let catalog = catalog_with(
            "t",
            vec![ColumnDef::new("a", DataType::Integer)],
            vec![
                row(&[("a", Value::Integer(2))]),
                row(&[("a", Value::Null)]),
                row(&[("a", Value::Integer(1))]),
            ],
        );

        for descending in [false, true] {
            let mut stmt = plain_select("t");
            stmt.order_by = Some(OrderBy {
                column: "a".to_string(),
                descending,
            });
            match select(&catalog, &stmt).unwrap() {
                ResultSet::Select { rows, .. } => {
                    assert_eq!(rows[2]["a"], Value::Null, "NULL must sort last");
                    if descending {
                        assert_eq!(rows[0]["a"], Value::Integer(2));
                    } else {
                        assert_eq!(rows[0]["a"], Value::Integer(1));
                    }
                }
                other => panic!("expected Select, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_limit() {
        let catalog = catalog_with(
            "t",
            vec![ColumnDef::new("a", DataType::Integer)],
            vec![
                row(&[("a", Value::Integer(1))]),
                row(&[("a", Value::Integer(2))]),
                row(&[("a", Value::Integer(3))]),
            ],
        );

        let mut stmt = plain_select("t");
        stmt.limit = Some(2);
        match select(&catalog, &stmt).unwrap() {
            ResultSet::Select { row_count, .. } => assert_eq!(row_count, 2),
            other => panic!("expected Select, got {:?}", other),
        }

        let mut stmt = plain_select("t");
        stmt.limit = Some(0);
        match select(&catalog, &stmt).unwrap() {
            ResultSet::Select { row_count, .. } => assert_eq!(row_count, 0),
            other => panic!("expected Select, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_equality_crosses_tags_on_indexed_column() {
        let catalog = catalog_with(
            "t",
            vec![ColumnDef::new("price", DataType::Real).unique()],
            vec![row(&[("price", Value::Real(10.0))])],
        );

        // an INTEGER literal must still find the REAL index entry, exactly
        // as it would on an unindexed column
        let mut stmt = plain_select("t");
        stmt.where_clause = Some(Condition::Compare {
            column: "price".to_string(),
            op: CompareOp::Eq,
            value: Literal::Integer(10),
        });

        match select(&catalog, &stmt).unwrap() {
            ResultSet::Select { rows, row_count } => {
                assert_eq!(row_count, 1);
                assert_eq!(rows[0]["price"], Value::Real(10.0));
            }
            other => panic!("expected Select, got {:?}", other),
        }
    }

    #[test]
    fn test_index_fast_path_matches_scan() {
        let catalog = catalog_with(
            "t",
            vec![
                ColumnDef::new("id", DataType::Integer).primary_key(),
                ColumnDef::new("email", DataType::Text).unique(),
            ],
            vec![
                row(&[("id", Value::Integer(1)), ("email", Value::Text("A@X".into()))]),
                row(&[("id", Value::Integer(2)), ("email", Value::Text("b@y".into()))]),
            ],
        );

        let mut stmt = plain_select("t");
        stmt.where_clause = Some(Condition::Compare {
            column: "email".to_string(),
            op: CompareOp::Eq,
            value: Literal::String("a@x".to_string()),
        });

        match select(&catalog, &stmt).unwrap() {
            ResultSet::Select { rows, row_count } => {
                assert_eq!(row_count, 1);
                assert_eq!(rows[0]["id"], Value::Integer(1));
            }
            other => panic!("expected Select, got {:?}", other),
        }
    }
}
