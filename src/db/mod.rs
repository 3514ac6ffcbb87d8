//! # Database Layer
//!
//! Request-scoped connections, the stored-logic catalog, and the MySQL
//! driver binding.

pub mod catalog;
pub mod errors;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod gateway;
pub mod mysql;
pub mod value;

pub use errors::{DbError, DbResult, ER_NO_SUCH_TABLE, ER_SIGNAL_EXCEPTION};
pub use gateway::{Connector, RequestDb, Session};
pub use mysql::MySqlConnector;
pub use value::{ReportRow, ReportValue, RowSet, SqlParam};
