//! Query execution
//!
//! One free function per statement kind, each taking the catalog and the
//! statement variant. Transaction control statements never reach this
//! module; the session handles them before dispatch.

pub mod mutation;
pub mod predicate;
pub mod query;
pub mod schema;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::result::ResultSet;
use crate::sql::ast::Statement;

/// Dispatch a non-transaction statement to its executor.
pub fn dispatch(catalog: &mut Catalog, stmt: &Statement) -> Result<ResultSet> {
    match stmt {
        Statement::CreateTable(s) => schema::create_table(catalog, s),
        Statement::AlterTable(s) => schema::alter_table(catalog, s),
        Statement::DropTable(s) => schema::drop_table(catalog, s),
        Statement::Insert(s) => mutation::insert(catalog, s),
        Statement::Select(s) => query::select(catalog, s),
        Statement::Update(s) => mutation::update(catalog, s),
        Statement::Delete(s) => mutation::delete(catalog, s),
        Statement::ShowTables => schema::show_tables(catalog),
        Statement::Describe(name) => schema::describe(catalog, name),
        Statement::Begin | Statement::Commit | Statement::Rollback => Err(Error::ExecutionError(
            "transaction control must go through the session".to_string(),
        )),
    }
}
