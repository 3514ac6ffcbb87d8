//! # Database Errors
//!
//! Error type shared by every database call. Server-side failures keep the
//! vendor error number so the translator can tell a business-rule rejection
//! apart from an infrastructure fault.

use thiserror::Error;

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

/// MySQL `ER_SIGNAL_EXCEPTION`: raised by `SIGNAL SQLSTATE '45000'` in a
/// trigger or stored routine.
pub const ER_SIGNAL_EXCEPTION: u16 = 1644;

/// MySQL `ER_NO_SUCH_TABLE`: table or view does not exist.
pub const ER_NO_SUCH_TABLE: u16 = 1146;

/// Database errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DbError {
    /// Connection could not be established
    #[error("failed to connect to database: {0}")]
    Connect(String),

    /// Error reported by the database server
    #[error("{code} ({sqlstate}): {message}")]
    Server {
        code: u16,
        sqlstate: String,
        message: String,
    },

    /// Error raised by the driver itself (protocol, decoding, I/O)
    #[error("{0}")]
    Driver(String),
}

impl DbError {
    /// Server error with the given vendor code
    pub fn server(code: u16, sqlstate: impl Into<String>, message: impl Into<String>) -> Self {
        DbError::Server {
            code,
            sqlstate: sqlstate.into(),
            message: message.into(),
        }
    }

    /// Business-rule rejection raised with `SIGNAL SQLSTATE '45000'`
    pub fn signal(message: impl Into<String>) -> Self {
        Self::server(ER_SIGNAL_EXCEPTION, "45000", message)
    }

    /// Missing table or view
    pub fn no_such_table(schema: &str, object: &str) -> Self {
        Self::server(
            ER_NO_SUCH_TABLE,
            "42S02",
            format!("Table '{}.{}' doesn't exist", schema, object),
        )
    }

    /// Vendor error number, if the server reported one
    pub fn code(&self) -> Option<u16> {
        match self {
            DbError::Server { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Message without the code prefix
    pub fn message(&self) -> &str {
        match self {
            DbError::Server { message, .. } => message,
            DbError::Connect(message) | DbError::Driver(message) => message,
        }
    }

    /// True for user-raised application errors
    pub fn is_signal(&self) -> bool {
        self.code() == Some(ER_SIGNAL_EXCEPTION)
    }

    /// True if this is a missing table/view error naming `object`
    pub fn is_missing_object(&self, object: &str) -> bool {
        self.code() == Some(ER_NO_SUCH_TABLE) && self.message().contains(object)
    }

    /// True for any missing table/view error
    pub fn is_missing_table(&self) -> bool {
        self.code() == Some(ER_NO_SUCH_TABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = DbError::no_such_table("adventureworks", "vw_ProductLocations");
        assert_eq!(
            err.to_string(),
            "1146 (42S02): Table 'adventureworks.vw_ProductLocations' doesn't exist"
        );
    }

    #[test]
    fn test_signal_classification() {
        let err = DbError::signal("List price cannot be negative");
        assert!(err.is_signal());
        assert_eq!(err.message(), "List price cannot be negative");
        assert!(!DbError::Driver("broken pipe".into()).is_signal());
    }

    #[test]
    fn test_missing_object_matches_name() {
        let err = DbError::no_such_table("aw", "product_price_audit");
        assert!(err.is_missing_table());
        assert!(err.is_missing_object("product_price_audit"));
        assert!(!err.is_missing_object("vw_ProductLocations"));
        assert!(!DbError::Connect("refused".into()).is_missing_table());
    }
}
