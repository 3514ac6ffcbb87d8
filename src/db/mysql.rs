//! # MySQL Session
//!
//! `Connector`/`Session` over a single sqlx `MySqlConnection`. No pool: each
//! request opens its own connection and closes it when the request ends.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlDatabaseError, MySqlRow};
use sqlx::error::DatabaseError;
use sqlx::query::Query;
use sqlx::{Column, Connection, MySql, MySqlConnection, Row, TypeInfo};

use super::errors::{DbError, DbResult};
use super::gateway::{Connector, Session};
use super::value::{ReportRow, ReportValue, RowSet, SqlParam};
use crate::config::DashboardConfig;

/// Opens one MySQL connection per call
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    host: String,
    port: u16,
    user: String,
    password: Option<String>,
    database: String,
}

impl MySqlConnector {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            host: config.db_host.clone(),
            port: config.db_port,
            user: config.db_user.clone(),
            password: config.db_password.clone(),
            database: config.db_name.clone(),
        }
    }

    fn options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);
        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    async fn connect(&self) -> DbResult<Box<dyn Session>> {
        let conn = MySqlConnection::connect_with(&self.options())
            .await
            .map_err(|e| DbError::Connect(convert_error(e).to_string()))?;
        Ok(Box::new(MySqlSession { conn }))
    }

    fn describe(&self) -> String {
        format!("mysql://{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

/// A live MySQL connection
pub struct MySqlSession {
    conn: MySqlConnection,
}

fn bind_all<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[SqlParam],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Float(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.clone()),
        };
    }
    query
}

#[async_trait]
impl Session for MySqlSession {
    async fn fetch_all(&mut self, sql: &str, params: &[SqlParam]) -> DbResult<RowSet> {
        let rows = bind_all(sqlx::query(sql), params)
            .fetch_all(&mut self.conn)
            .await
            .map_err(convert_error)?;
        rows.iter().map(convert_row).collect()
    }

    async fn execute(&mut self, sql: &str, params: &[SqlParam]) -> DbResult<u64> {
        let result = bind_all(sqlx::query(sql), params)
            .execute(&mut self.conn)
            .await
            .map_err(convert_error)?;
        Ok(result.rows_affected())
    }

    async fn call_procedure(&mut self, name: &str, params: &[SqlParam]) -> DbResult<RowSet> {
        let placeholders = vec!["?"; params.len()].join(", ");
        let sql = format!("CALL {}({})", name, placeholders);
        self.fetch_all(&sql, params).await
    }

    async fn close(self: Box<Self>) -> DbResult<()> {
        self.conn.close().await.map_err(convert_error)
    }
}

/// Map a sqlx error onto `DbError`, keeping the MySQL error number
fn convert_error(err: sqlx::Error) -> DbError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.try_downcast_ref::<MySqlDatabaseError>() {
            Some(mysql) => DbError::server(
                mysql.number(),
                mysql.code().unwrap_or("HY000"),
                mysql.message(),
            ),
            None => DbError::Driver(db_err.message().to_string()),
        },
        other => DbError::Driver(other.to_string()),
    }
}

fn convert_row(row: &MySqlRow) -> DbResult<ReportRow> {
    let mut out = ReportRow::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, idx, column.type_info().name())?;
        out.push(column.name(), value);
    }
    Ok(out)
}

fn decode_column(row: &MySqlRow, idx: usize, type_name: &str) -> DbResult<ReportValue> {
    let value = match type_name {
        "NULL" => ReportValue::Null,
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            decode::<i64>(row, idx)?.map_or(ReportValue::Null, ReportValue::Int)
        }
        t if t.ends_with("UNSIGNED") => {
            decode::<u64>(row, idx)?.map_or(ReportValue::Null, ReportValue::UInt)
        }
        "FLOAT" | "DOUBLE" => decode::<f64>(row, idx)?.map_or(ReportValue::Null, ReportValue::Float),
        "DECIMAL" => decode::<Decimal>(row, idx)?.map_or(ReportValue::Null, ReportValue::Decimal),
        "DATE" => decode::<NaiveDate>(row, idx)?.map_or(ReportValue::Null, ReportValue::Date),
        "TIME" => decode::<NaiveTime>(row, idx)?.map_or(ReportValue::Null, ReportValue::Time),
        "DATETIME" | "TIMESTAMP" => {
            decode::<NaiveDateTime>(row, idx)?.map_or(ReportValue::Null, ReportValue::DateTime)
        }
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" => {
            decode::<Vec<u8>>(row, idx)?.map_or(ReportValue::Null, |bytes| {
                ReportValue::Text(String::from_utf8_lossy(&bytes).into_owned())
            })
        }
        _ => match decode::<String>(row, idx) {
            Ok(text) => text.map_or(ReportValue::Null, ReportValue::Text),
            Err(_) => decode::<Vec<u8>>(row, idx)?.map_or(ReportValue::Null, |bytes| {
                ReportValue::Text(String::from_utf8_lossy(&bytes).into_owned())
            }),
        },
    };
    Ok(value)
}

fn decode<'r, T>(row: &'r MySqlRow, idx: usize) -> DbResult<Option<T>>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get::<Option<T>, _>(idx)
        .map_err(|e| DbError::Driver(e.to_string()))
}
