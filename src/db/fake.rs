//! # Scripted Connector
//!
//! In-memory stand-in for the database used by tests. Responses are scripted
//! per statement text (or procedure name); every statement, connect and
//! close is recorded so tests can assert exactly what reached the database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::errors::{DbError, DbResult};
use super::gateway::{Connector, Session};
use super::value::{ReportRow, ReportValue, RowSet, SqlParam};

/// Scripted outcome of one statement
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Rows(RowSet),
    Affected(u64),
    Fail(DbError),
}

impl FakeResponse {
    /// Single `count` row, the shape of every existence check
    pub fn count(n: i64) -> Self {
        FakeResponse::Rows(vec![ReportRow::new().with("count", ReportValue::Int(n))])
    }

    /// Single row with one named column
    pub fn scalar(column: &str, value: ReportValue) -> Self {
        FakeResponse::Rows(vec![ReportRow::new().with(column, value)])
    }
}

type Responder = Arc<dyn Fn(&[SqlParam]) -> FakeResponse + Send + Sync>;

/// A statement that reached the fake database
#[derive(Debug, Clone, PartialEq)]
pub struct FakeCall {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

#[derive(Default)]
struct FakeState {
    unreachable: bool,
    responders: HashMap<String, Responder>,
    calls: Vec<FakeCall>,
    connect_attempts: usize,
    opened: usize,
    closed: usize,
}

/// Handle to a scripted database; clones share the same script and log
#[derive(Clone, Default)]
pub struct FakeConnector {
    state: Arc<Mutex<FakeState>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A database that refuses every connection
    pub fn unreachable() -> Self {
        let fake = Self::new();
        fake.lock().unreachable = true;
        fake
    }

    /// The connector to hand to `RequestDb` or the HTTP state
    pub fn connector(&self) -> Arc<dyn Connector> {
        Arc::new(self.clone())
    }

    /// Fixed response for a statement (or procedure name)
    pub fn respond(&self, sql: &str, response: FakeResponse) -> &Self {
        self.respond_with(sql, move |_| response.clone())
    }

    /// Parameter-dependent response for a statement (or procedure name)
    pub fn respond_with<F>(&self, sql: &str, responder: F) -> &Self
    where
        F: Fn(&[SqlParam]) -> FakeResponse + Send + Sync + 'static,
    {
        self.lock()
            .responders
            .insert(sql.to_string(), Arc::new(responder));
        self
    }

    /// Every statement executed so far, in order
    pub fn calls(&self) -> Vec<FakeCall> {
        self.lock().calls.clone()
    }

    /// Number of times the given statement (or `CALL name`) ran
    pub fn calls_to(&self, sql: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.sql == sql).count()
    }

    pub fn connect_attempts(&self) -> usize {
        self.lock().connect_attempts
    }

    pub fn opened(&self) -> usize {
        self.lock().opened
    }

    pub fn closed(&self) -> usize {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        // A panicking test thread must not hide the script from the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn run(&self, sql: &str, params: &[SqlParam]) -> Option<FakeResponse> {
        let responder = {
            let mut state = self.lock();
            state.calls.push(FakeCall {
                sql: sql.to_string(),
                params: params.to_vec(),
            });
            state.responders.get(sql).cloned()
        };
        responder.map(|respond| respond(params))
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self) -> DbResult<Box<dyn Session>> {
        let mut state = self.lock();
        state.connect_attempts += 1;
        if state.unreachable {
            return Err(DbError::Connect(
                "2003 (HY000): Can't connect to MySQL server on 'fake:3306'".to_string(),
            ));
        }
        state.opened += 1;
        Ok(Box::new(FakeSession {
            fake: self.clone(),
        }))
    }

    fn describe(&self) -> String {
        "fake".to_string()
    }
}

struct FakeSession {
    fake: FakeConnector,
}

#[async_trait]
impl Session for FakeSession {
    async fn fetch_all(&mut self, sql: &str, params: &[SqlParam]) -> DbResult<RowSet> {
        match self.fake.run(sql, params) {
            Some(FakeResponse::Rows(rows)) => Ok(rows),
            Some(FakeResponse::Fail(err)) => Err(err),
            Some(FakeResponse::Affected(_)) | None => Ok(Vec::new()),
        }
    }

    async fn execute(&mut self, sql: &str, params: &[SqlParam]) -> DbResult<u64> {
        match self.fake.run(sql, params) {
            Some(FakeResponse::Affected(n)) => Ok(n),
            Some(FakeResponse::Rows(rows)) => Ok(rows.len() as u64),
            Some(FakeResponse::Fail(err)) => Err(err),
            None => Ok(0),
        }
    }

    async fn call_procedure(&mut self, name: &str, params: &[SqlParam]) -> DbResult<RowSet> {
        self.fetch_all(&format!("CALL {}", name), params).await
    }

    async fn close(self: Box<Self>) -> DbResult<()> {
        self.fake.lock().closed += 1;
        Ok(())
    }
}
