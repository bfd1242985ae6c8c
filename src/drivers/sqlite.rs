use async_trait::async_trait;
use rusqlite::types::Value;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{DbError, Result};
use crate::placeholders::{rewrite, PlaceholderStyle};
use crate::traits::DatabaseDriver;
use crate::types::{Params, RawQueryResult, SqlValue};

/// Path that opens a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// SQLite driver implementation using tokio-rusqlite.
///
/// The connection lives on tokio-rusqlite's background thread; each call is
/// one closure sent to it.
pub struct SqliteDriver {
    conn: Connection,
}

impl SqliteDriver {
    /// Open the database at `path`, or an in-memory database for `:memory:`.
    pub async fn connect(path: &str) -> Result<Self> {
        let conn = if path == MEMORY_PATH {
            Connection::open_in_memory().await
        } else {
            Connection::open(path).await
        }
        .map_err(|e| DbError::ConnectionFailed(format!("{}: {}", path, e)))?;

        info!(driver = "sqlite", path = %path, "Connected");
        Ok(Self { conn })
    }

    async fn batch(&self, sql: &'static str) -> Result<()> {
        debug!(sql = %sql, "Executing transaction statement");
        self.conn
            .call(move |conn| {
                conn.execute_batch(sql)?;
                Ok(())
            })
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

#[async_trait]
impl DatabaseDriver for SqliteDriver {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn prepare(&self, sql: &str) -> Result<()> {
        let sql = rewrite(sql, PlaceholderStyle::Question)?.sql().to_string();
        self.conn
            .call(move |conn| {
                conn.prepare(&sql)?;
                Ok(())
            })
            .await
            .map_err(|e| DbError::PrepareFailed(e.to_string()))
    }

    async fn execute(&self, sql: &str, params: &Params) -> Result<RawQueryResult> {
        let rewritten = rewrite(sql, PlaceholderStyle::Question)?;
        let values: Vec<Value> = rewritten
            .bind(params)?
            .into_iter()
            .map(to_sqlite_value)
            .collect();
        let sql = rewritten.sql().to_string();
        debug!(sql = %sql, params = values.len(), "Executing statement");

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let columns: Vec<String> = stmt
                    .column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect();

                let mut result_rows = Vec::new();
                let mut rows = stmt.query(rusqlite::params_from_iter(values.iter()))?;
                while let Some(row) = rows.next()? {
                    let mut row_values = Vec::with_capacity(columns.len());
                    for i in 0..columns.len() {
                        row_values.push(from_sqlite_value(row.get::<_, Value>(i)?));
                    }
                    result_rows.push(row_values);
                }

                Ok(RawQueryResult::new(columns, result_rows))
            })
            .await
            .map_err(|e| DbError::QueryFailed(e.to_string()))
    }

    /// The sequence name is ignored; sqlite only has rowids.
    async fn last_insert_id(&self, _sequence: Option<&str>) -> Result<Option<String>> {
        let rowid = self
            .conn
            .call(|conn| Ok(conn.last_insert_rowid()))
            .await
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;

        Ok((rowid != 0).then(|| rowid.to_string()))
    }

    async fn begin_transaction(&self) -> Result<()> {
        self.batch("BEGIN").await
    }

    async fn commit(&self) -> Result<()> {
        self.batch("COMMIT").await
    }

    async fn rollback(&self) -> Result<()> {
        self.batch("ROLLBACK").await
    }
}

fn to_sqlite_value(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Text(s) => Value::Text(s),
        SqlValue::Int32(i) => Value::Integer(i64::from(i)),
        SqlValue::Int64(i) => Value::Integer(i),
        SqlValue::Float64(f) => Value::Real(f),
        SqlValue::Bool(b) => Value::Integer(i64::from(b)),
        SqlValue::Bytes(b) => Value::Blob(b),
    }
}

fn from_sqlite_value(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Int64(i),
        Value::Real(f) => SqlValue::Float64(f),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Bytes(b),
    }
}
