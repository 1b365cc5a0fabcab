//! wrendb - an embeddable in-memory relational database engine
//!
//! This library provides the core components of a SQL database:
//! - SQL parsing (lexer, parser, statement tree)
//! - Typed in-memory storage (values, tables, indexes)
//! - Query execution
//! - Sessions with snapshot-based transactions
//!
//! The entry point is [`Session::execute`]:
//!
//! ```
//! use wrendb::Session;
//!
//! let mut session = Session::new();
//! session.execute("CREATE TABLE users (id INTEGER PRIMARY KEY AUTO_INCREMENT, name TEXT)");
//! session.execute("INSERT INTO users (name) VALUES ('alice')");
//! let result = session.execute("SELECT * FROM users");
//! assert_eq!(result.rows().unwrap().len(), 1);
//! ```

pub mod catalog;
pub mod error;
pub mod executor;
pub mod result;
pub mod session;
pub mod sql;
pub mod storage;

pub use error::{ConstraintKind, Error, Result};
pub use result::{QueryResult, ResultKind, ResultSet};
pub use session::{Session, SessionStats};
pub use storage::{Row, Value};
