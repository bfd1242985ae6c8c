use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, OptsBuilder, Row, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::dsn::Dsn;
use crate::error::{DbError, Result};
use crate::placeholders::{rewrite, PlaceholderStyle};
use crate::traits::DatabaseDriver;
use crate::types::{Params, RawQueryResult, SqlValue};

/// MySQL driver implementation using mysql_async.
pub struct MysqlDriver {
    conn: Mutex<Conn>,
}

impl MysqlDriver {
    /// Connect using a `mysql:` DSN.
    pub async fn connect(dsn: &Dsn, username: Option<&str>, password: Option<&str>) -> Result<Self> {
        let opts = mysql_opts(dsn, username, password)?;
        let conn = Conn::new(opts)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(driver = "mysql", "Connected");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    async fn batch(&self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "Executing transaction statement");
        self.conn
            .lock()
            .await
            .query_drop(sql)
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

/// Map `mysql:` DSN options onto mysql_async options.
/// A `charset` option is applied with `SET NAMES` once connected.
fn mysql_opts(dsn: &Dsn, username: Option<&str>, password: Option<&str>) -> Result<OptsBuilder> {
    let mut builder = OptsBuilder::default();

    for (key, value) in dsn.options() {
        match key {
            "host" if !value.is_empty() => builder = builder.ip_or_hostname(value),
            "dbname" => builder = builder.db_name(Some(value)),
            "unix_socket" => builder = builder.socket(Some(value)),
            "host" | "port" | "charset" => {}
            other => warn!(key = other, "Ignoring unknown mysql DSN option"),
        }
    }

    if let Some(port) = dsn.port()? {
        builder = builder.tcp_port(port);
    }
    if let Some(charset) = dsn.option("charset").filter(|c| !c.is_empty()) {
        builder = builder.setup(vec![format!("SET NAMES {}", charset)]);
    }

    Ok(builder.user(username).pass(password))
}

fn into_raw(rows: Vec<Row>) -> RawQueryResult {
    let columns: Vec<String> = match rows.first() {
        Some(row) => row
            .columns_ref()
            .iter()
            .map(|c| c.name_str().into_owned())
            .collect(),
        None => Vec::new(),
    };

    let result_rows = rows
        .iter()
        .map(|row| {
            (0..row.len())
                .map(|i| row.as_ref(i).cloned().map(from_mysql_value).unwrap_or(SqlValue::Null))
                .collect()
        })
        .collect();

    RawQueryResult::new(columns, result_rows)
}

#[async_trait]
impl DatabaseDriver for MysqlDriver {
    fn name(&self) -> &str {
        "mysql"
    }

    async fn prepare(&self, sql: &str) -> Result<()> {
        let rewritten = rewrite(sql, PlaceholderStyle::Question)?;
        self.conn
            .lock()
            .await
            .prep(rewritten.sql())
            .await
            .map_err(|e| DbError::PrepareFailed(e.to_string()))?;
        Ok(())
    }

    async fn execute(&self, sql: &str, params: &Params) -> Result<RawQueryResult> {
        let rewritten = rewrite(sql, PlaceholderStyle::Question)?;
        let values = rewritten.bind(params)?;
        debug!(sql = %rewritten.sql(), params = values.len(), "Executing statement");

        let params = if values.is_empty() {
            mysql_async::Params::Empty
        } else {
            mysql_async::Params::Positional(values.into_iter().map(to_mysql_value).collect())
        };

        let rows: Vec<Row> = self
            .conn
            .lock()
            .await
            .exec(rewritten.sql(), params)
            .await
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;

        Ok(into_raw(rows))
    }

    /// Raw statements go through the text protocol; not every statement can
    /// be prepared by the server.
    async fn query(&self, sql: &str) -> Result<Option<RawQueryResult>> {
        debug!(sql = %sql, "Executing query");
        let rows: Vec<Row> = self
            .conn
            .lock()
            .await
            .query(sql)
            .await
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;

        Ok(Some(into_raw(rows)))
    }

    async fn last_insert_id(&self, _sequence: Option<&str>) -> Result<Option<String>> {
        let id = self.conn.lock().await.last_insert_id();
        Ok(id.filter(|id| *id != 0).map(|id| id.to_string()))
    }

    async fn begin_transaction(&self) -> Result<()> {
        self.batch("START TRANSACTION").await
    }

    async fn commit(&self) -> Result<()> {
        self.batch("COMMIT").await
    }

    async fn rollback(&self) -> Result<()> {
        self.batch("ROLLBACK").await
    }
}

fn to_mysql_value(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::NULL,
        SqlValue::Text(s) => Value::Bytes(s.into_bytes()),
        SqlValue::Int32(i) => Value::Int(i64::from(i)),
        SqlValue::Int64(i) => Value::Int(i),
        SqlValue::Float64(f) => Value::Double(f),
        SqlValue::Bool(b) => Value::Int(i64::from(b)),
        SqlValue::Bytes(b) => Value::Bytes(b),
    }
}

fn from_mysql_value(value: Value) -> SqlValue {
    match value {
        Value::NULL => SqlValue::Null,
        Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => SqlValue::Text(s),
            Err(e) => SqlValue::Bytes(e.into_bytes()),
        },
        Value::Int(i) => SqlValue::Int64(i),
        Value::UInt(u) => i64::try_from(u)
            .map(SqlValue::Int64)
            .unwrap_or_else(|_| SqlValue::Text(u.to_string())),
        Value::Float(f) => SqlValue::Float64(f64::from(f)),
        Value::Double(d) => SqlValue::Float64(d),
        Value::Date(year, month, day, hour, minute, second, micros) => SqlValue::Text(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
            year, month, day, hour, minute, second, micros
        )),
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let hours = u32::from(hours) + days * 24;
            SqlValue::Text(format!(
                "{}{:02}:{:02}:{:02}.{:06}",
                if negative { "-" } else { "" },
                hours,
                minutes,
                seconds,
                micros
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use mysql_async::Opts;

    use super::*;

    #[test]
    fn test_mysql_opts_from_dsn() {
        let dsn = Dsn::parse("mysql:host=db.local;port=3307;dbname=shop;charset=utf8mb4").unwrap();
        let opts = Opts::from(mysql_opts(&dsn, Some("app"), Some("secret")).unwrap());

        assert_eq!(opts.tcp_port(), 3307);
        assert_eq!(opts.db_name(), Some("shop"));
        assert_eq!(opts.user(), Some("app"));
    }

    #[test]
    fn test_values_round_trip_text() {
        assert_eq!(
            from_mysql_value(to_mysql_value(SqlValue::from("Ann"))),
            SqlValue::from("Ann")
        );
        assert_eq!(from_mysql_value(Value::UInt(7)), SqlValue::Int64(7));
        assert_eq!(
            from_mysql_value(Value::Date(2024, 1, 2, 3, 4, 5, 0)),
            SqlValue::from("2024-01-02 03:04:05.000000")
        );
    }
}
