//! # Database Gateway
//!
//! One connection per request. `RequestDb` opens the connection on first
//! use, hands the same session to every later caller in that request, and
//! is released by the HTTP layer once the response is built. A failed
//! connect is remembered for the rest of the request so callers see a
//! consistent "no database" answer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use super::errors::DbResult;
use super::value::{ReportRow, RowSet, SqlParam};

/// An open database connection
#[async_trait]
pub trait Session: Send {
    /// Run a query and collect every row
    async fn fetch_all(&mut self, sql: &str, params: &[SqlParam]) -> DbResult<RowSet>;

    /// Run a query and keep only the first row
    async fn fetch_optional(
        &mut self,
        sql: &str,
        params: &[SqlParam],
    ) -> DbResult<Option<ReportRow>> {
        Ok(self.fetch_all(sql, params).await?.into_iter().next())
    }

    /// Run a statement and return the affected row count
    async fn execute(&mut self, sql: &str, params: &[SqlParam]) -> DbResult<u64>;

    /// `CALL` a stored procedure and return the rows of its result set
    async fn call_procedure(&mut self, name: &str, params: &[SqlParam]) -> DbResult<RowSet>;

    /// Close the connection
    async fn close(self: Box<Self>) -> DbResult<()>;
}

/// Opens sessions against the configured database
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> DbResult<Box<dyn Session>>;

    /// Target description for logs (never includes credentials)
    fn describe(&self) -> String;
}

enum Slot {
    Idle,
    Open(Box<dyn Session>),
    Failed,
}

/// Request-scoped database handle
pub struct RequestDb {
    connector: Arc<dyn Connector>,
    slot: Slot,
}

impl RequestDb {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            slot: Slot::Idle,
        }
    }

    /// Live session for this request, or `None` if the database is unreachable.
    pub async fn acquire(&mut self) -> Option<&mut dyn Session> {
        if matches!(self.slot, Slot::Idle) {
            self.slot = match self.connector.connect().await {
                Ok(session) => {
                    debug!(db = %self.connector.describe(), "database connection opened");
                    Slot::Open(session)
                }
                Err(err) => {
                    error!(
                        db = %self.connector.describe(),
                        error = %err,
                        "error connecting to database"
                    );
                    Slot::Failed
                }
            };
        }

        match &mut self.slot {
            Slot::Open(session) => Some(session.as_mut()),
            _ => None,
        }
    }

    /// True once a connection has been opened and not yet released
    pub fn is_open(&self) -> bool {
        matches!(self.slot, Slot::Open(_))
    }

    /// Close the connection if one was opened. Safe to call when nothing was acquired.
    pub async fn release(mut self) {
        if let Slot::Open(session) = std::mem::replace(&mut self.slot, Slot::Idle) {
            match session.close().await {
                Ok(()) => debug!("database connection closed"),
                Err(err) => warn!(error = %err, "error closing database connection"),
            }
        }
    }
}

impl Drop for RequestDb {
    fn drop(&mut self) {
        // Reached without `release` only when the handler future was dropped
        // or panicked; dropping the session tears the socket down.
        if let Slot::Open(_) = self.slot {
            warn!("database connection dropped without release");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fake::FakeConnector;

    #[tokio::test]
    async fn test_connection_is_lazy_and_reused() {
        let fake = FakeConnector::new();
        let mut db = RequestDb::new(fake.connector());
        assert_eq!(fake.opened(), 0);

        db.acquire().await.unwrap().fetch_all("SELECT 1", &[]).await.unwrap();
        db.acquire().await.unwrap().fetch_all("SELECT 2", &[]).await.unwrap();
        assert_eq!(fake.opened(), 1);
        assert!(db.is_open());

        db.release().await;
        assert_eq!(fake.closed(), 1);
    }

    #[tokio::test]
    async fn test_release_without_acquire_is_noop() {
        let fake = FakeConnector::new();
        let db = RequestDb::new(fake.connector());
        db.release().await;
        assert_eq!(fake.opened(), 0);
        assert_eq!(fake.closed(), 0);
    }

    #[tokio::test]
    async fn test_failed_connect_is_not_retried() {
        let fake = FakeConnector::unreachable();
        let mut db = RequestDb::new(fake.connector());
        assert!(db.acquire().await.is_none());
        assert!(db.acquire().await.is_none());
        assert_eq!(fake.connect_attempts(), 1);
        db.release().await;
        assert_eq!(fake.closed(), 0);
    }
}
