//! Schema statement execution: CREATE TABLE, DROP TABLE, ALTER TABLE,
//! SHOW TABLES, DESCRIBE.

use crate::catalog::{Catalog, ColumnDef, DataType, TableSchema};
use crate::error::{Error, Result};
use crate::result::ResultSet;
use crate::sql::ast::{
    AlterAction, AlterTableStatement, ColumnSpec, CreateTableStatement, DropTableStatement,
};
use crate::storage::{Row, Table, Value};

/// Execute CREATE TABLE.
pub fn create_table(catalog: &mut Catalog, stmt: &CreateTableStatement) -> Result<ResultSet> {
    if catalog.contains(&stmt.table_name) {
        if stmt.if_not_exists {
            return Ok(ResultSet::CreateTable {
                table_name: stmt.table_name.clone(),
            });
        }
        return Err(Error::TableAlreadyExists(stmt.table_name.clone()));
    }

    let columns = build_columns(&stmt.columns)?;
    let schema = TableSchema::new(&stmt.table_name, columns);
    catalog.create_table(Table::new(schema))?;

    tracing::debug!(table = %stmt.table_name, "table created");

    Ok(ResultSet::CreateTable {
        table_name: stmt.table_name.clone(),
    })
}

/// Validate a parsed column list and build the schema columns. The
/// primary-key column is automatically unique and not-null.
fn build_columns(specs: &[ColumnSpec]) -> Result<Vec<ColumnDef>> {
    let primary_keys = specs.iter().filter(|c| c.primary_key).count();
    if primary_keys > 1 {
        return Err(Error::ExecutionError(
            "multiple PRIMARY KEY columns are not supported".to_string(),
        ));
    }

    let mut columns = Vec::with_capacity(specs.len());
    for spec in specs {
        if columns.iter().any(|c: &ColumnDef| c.name == spec.name) {
            return Err(Error::ExecutionError(format!(
                "duplicate column '{}'",
                spec.name
            )));
        }
        columns.push(build_column(spec)?);
    }

    Ok(columns)
}

/// Build one column definition from its parsed spec, enforcing the
/// AUTO_INCREMENT invariants.
fn build_column(spec: &ColumnSpec) -> Result<ColumnDef> {
    if spec.auto_increment {
        if !spec.primary_key {
            return Err(Error::ExecutionError(format!(
                "AUTO_INCREMENT column '{}' must be the PRIMARY KEY",
                spec.name
            )));
        }
        if spec.data_type != DataType::Integer {
            return Err(Error::ExecutionError(format!(
                "AUTO_INCREMENT column '{}' must be INTEGER",
                spec.name
            )));
        }
    }

    let mut col = ColumnDef::new(&spec.name, spec.data_type);
    if spec.primary_key {
        col = col.primary_key();
    }
    if spec.unique {
        col = col.unique();
    }
    if spec.not_null {
        col = col.not_null();
    }
    if spec.auto_increment {
        col = col.auto_increment();
    }
    Ok(col)
}

/// Execute DROP TABLE.
pub fn drop_table(catalog: &mut Catalog, stmt: &DropTableStatement) -> Result<ResultSet> {
    if !catalog.contains(&stmt.table_name) {
        if stmt.if_exists {
            return Ok(ResultSet::DropTable {
                table_name: stmt.table_name.clone(),
            });
        }
        return Err(Error::TableNotFound(stmt.table_name.clone()));
    }

    catalog.drop_table(&stmt.table_name)?;

    tracing::debug!(table = %stmt.table_name, "table dropped");

    Ok(ResultSet::DropTable {
        table_name: stmt.table_name.clone(),
    })
}

/// Execute ALTER TABLE.
pub fn alter_table(catalog: &mut Catalog, stmt: &AlterTableStatement) -> Result<ResultSet> {
    let table = catalog.table_mut(&stmt.table_name)?;
    let mut schema = table.schema().clone();
    let mut rows: Vec<Row> = table.rows().to_vec();

    match &stmt.action {
        AlterAction::AddColumn(spec) => {
            if schema.has_column(&spec.name) {
                return Err(Error::ExecutionError(format!(
                    "column '{}' already exists",
                    spec.name
                )));
            }
            if spec.primary_key && schema.primary_key().is_some() {
                return Err(Error::ExecutionError(
                    "multiple PRIMARY KEY columns are not supported".to_string(),
                ));
            }
            let column = build_column(spec)?;
            schema.columns.push(column);
            for row in &mut rows {
                row.insert(spec.name.clone(), Value::Null);
            }
        }
        AlterAction::DropColumn(name) => {
            if !schema.has_column(name) {
                return Err(Error::ColumnNotFound(name.clone()));
            }
            schema.columns.retain(|c| c.name != *name);
            for row in &mut rows {
                row.remove(name);
            }
        }
        AlterAction::RenameColumn { old, new } => {
            if !schema.has_column(old) {
                return Err(Error::ColumnNotFound(old.clone()));
            }
            if schema.has_column(new) {
                return Err(Error::ExecutionError(format!(
                    "column '{}' already exists",
                    new
                )));
            }
            if let Some(col) = schema.column_mut(old) {
                col.name = new.clone();
            }
            for row in &mut rows {
                if let Some(value) = row.remove(old) {
                    row.insert(new.clone(), value);
                }
            }
        }
        AlterAction::ModifyColumn(spec) => {
            if !schema.has_column(&spec.name) {
                return Err(Error::ColumnNotFound(spec.name.clone()));
            }
            if spec.primary_key
                && schema.primary_key().is_some_and(|c| c.name != spec.name)
            {
                return Err(Error::ExecutionError(
                    "multiple PRIMARY KEY columns are not supported".to_string(),
                ));
            }
            // existing row values are not re-validated against the new type
            let column = build_column(spec)?;
            if let Some(col) = schema.column_mut(&spec.name) {
                *col = column;
            }
        }
    }

    table.alter_schema(schema, rows);

    tracing::debug!(table = %stmt.table_name, action = ?stmt.action, "table altered");

    Ok(ResultSet::Ok)
}

/// Execute SHOW TABLES.
pub fn show_tables(catalog: &Catalog) -> Result<ResultSet> {
    Ok(ResultSet::ShowTables {
        tables: catalog.table_names(),
    })
}

/// Execute DESCRIBE.
pub fn describe(catalog: &Catalog, table_name: &str) -> Result<ResultSet> {
    let table = catalog.table(table_name)?;
    Ok(ResultSet::Describe {
        schema: table.schema().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::ast::ColumnSpec;

    fn create(catalog: &mut Catalog, name: &str, columns: Vec<ColumnSpec>) -> Result<ResultSet> {
        create_table(
            catalog,
            &CreateTableStatement {
                table_name: name.to_string(),
                columns,
                if_not_exists: false,
            },
        )
    }

    fn id_column() -> ColumnSpec {
        let mut spec = ColumnSpec::new("id", DataType::Integer);
        spec.primary_key = true;
        spec
    }

    #[test]
    fn test_create_table() {
        let mut catalog = Catalog::new();
        let result = create(&mut catalog, "t", vec![id_column()]).unwrap();
        assert_eq!(
            result,
            ResultSet::CreateTable {
                table_name: "t".to_string()
            }
        );

        // the primary key became unique and not-null
        let pk = catalog.table("t").unwrap().schema().primary_key().unwrap().clone();
        assert!(pk.unique);
        assert!(pk.not_null);
    }

    #[test]
    fn test_create_table_if_not_exists() {
        let mut catalog = Catalog::new();
        create(&mut catalog, "t", vec![id_column()]).unwrap();

        assert!(create(&mut catalog, "t", vec![id_column()]).is_err());

        let result = create_table(
            &mut catalog,
            &CreateTableStatement {
                table_name: "t".to_string(),
                columns: vec![id_column()],
                if_not_exists: true,
            },
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_create_table_validation() {
        let mut catalog = Catalog::new();

        // two primary keys
        let mut a = ColumnSpec::new("a", DataType::Integer);
        a.primary_key = true;
        let mut b = ColumnSpec::new("b", DataType::Integer);
        b.primary_key = true;
        assert!(create(&mut catalog, "t", vec![a, b]).is_err());

        // auto-increment off the primary key
        let mut c = ColumnSpec::new("c", DataType::Integer);
        c.auto_increment = true;
        assert!(create(&mut catalog, "t", vec![c]).is_err());

        // auto-increment on a non-integer column
        let mut d = ColumnSpec::new("d", DataType::Text);
        d.primary_key = true;
        d.auto_increment = true;
        assert!(create(&mut catalog, "t", vec![d]).is_err());

        // duplicate column names
        assert!(create(
            &mut catalog,
            "t",
            vec![
                ColumnSpec::new("x", DataType::Integer),
                ColumnSpec::new("x", DataType::Text)
            ]
        )
        .is_err());
    }

    #[test]
    fn test_drop_table_if_exists() {
        let mut catalog = Catalog::new();
        let stmt = DropTableStatement {
            table_name: "ghost".to_string(),
            if_exists: false,
        };
        assert!(drop_table(&mut catalog, &stmt).is_err());

        let stmt = DropTableStatement {
            table_name: "ghost".to_string(),
            if_exists: true,
        };
        assert!(drop_table(&mut catalog, &stmt).is_ok());
    }

    #[test]
    fn test_alter_add_and_drop_column() {
        let mut catalog = Catalog::new();
        create(&mut catalog, "t", vec![id_column()]).unwrap();
        catalog
            .table_mut("t")
            .unwrap()
            .insert([("id".to_string(), Value::Integer(1))].into_iter().collect())
            .unwrap();

        alter_table(
            &mut catalog,
            &AlterTableStatement {
                table_name: "t".to_string(),
                action: AlterAction::AddColumn(ColumnSpec::new("name", DataType::Text)),
            },
        )
        .unwrap();
        assert_eq!(catalog.table("t").unwrap().rows()[0]["name"], Value::Null);

        alter_table(
            &mut catalog,
            &AlterTableStatement {
                table_name: "t".to_string(),
                action: AlterAction::DropColumn("name".to_string()),
            },
        )
        .unwrap();
        assert!(!catalog.table("t").unwrap().rows()[0].contains_key("name"));
    }

    #[test]
    fn test_alter_rename_column() {
        let mut catalog = Catalog::new();
        create(&mut catalog, "t", vec![id_column()]).unwrap();
        catalog
            .table_mut("t")
            .unwrap()
            .insert([("id".to_string(), Value::Integer(1))].into_iter().collect())
            .unwrap();

        alter_table(
            &mut catalog,
            &AlterTableStatement {
                table_name: "t".to_string(),
                action: AlterAction::RenameColumn {
                    old: "id".to_string(),
                    new: "uid".to_string(),
                },
            },
        )
        .unwrap();

        let table = catalog.table("t").unwrap();
        assert!(table.schema().has_column("uid"));
        assert_eq!(table.rows()[0]["uid"], Value::Integer(1));
        // the index followed the rename
        assert_eq!(table.find_by_index("uid", &Value::Integer(1)).len(), 1);
    }

    #[test]
    fn test_alter_errors() {
        let mut catalog = Catalog::new();
        create(&mut catalog, "t", vec![id_column()]).unwrap();

        assert!(alter_table(
            &mut catalog,
            &AlterTableStatement {
                table_name: "t".to_string(),
                action: AlterAction::DropColumn("missing".to_string()),
            },
        )
        .is_err());

        assert!(alter_table(
            &mut catalog,
            &AlterTableStatement {
                table_name: "t".to_string(),
                action: AlterAction::AddColumn(ColumnSpec::new("id", DataType::Text)),
            },
        )
        .is_err());
    }

    #[test]
    fn test_show_and_describe() {
        let mut catalog = Catalog::new();
        create(&mut catalog, "b_table", vec![id_column()]).unwrap();
        create(&mut catalog, "a_table", vec![id_column()]).unwrap();

        assert_eq!(
            show_tables(&catalog).unwrap(),
            ResultSet::ShowTables {
                tables: vec!["a_table".to_string(), "b_table".to_string()]
            }
        );

        match describe(&catalog, "a_table").unwrap() {
            ResultSet::Describe { schema } => assert_eq!(schema.name, "a_table"),
            other => panic!("expected Describe, got {:?}", other),
        }
        assert!(describe(&catalog, "nope").is_err());
    }
}
