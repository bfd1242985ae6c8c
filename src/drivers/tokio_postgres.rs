use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tokio_postgres::error::SqlState;
use tokio_postgres::types::{to_sql_checked, FromSql, IsNull, ToSql, Type};
use tokio_postgres::{Client, Config, NoTls};
use tracing::{debug, error, info, warn};

use crate::dsn::Dsn;
use crate::error::{DbError, Result};
use crate::placeholders::{rewrite, PlaceholderStyle};
use crate::traits::DatabaseDriver;
use crate::types::{Params, RawQueryResult, SqlValue};

/// PostgreSQL driver implementation using tokio-postgres.
pub struct TokioPostgresDriver {
    client: Client,
}

impl TokioPostgresDriver {
    /// Connect using a `pgsql:` DSN.
    /// Explicit credentials take precedence over `user`/`password` in the DSN.
    pub async fn connect(dsn: &Dsn, username: Option<&str>, password: Option<&str>) -> Result<Self> {
        let config = pg_config(dsn, username, password)?;

        let (client, connection) = config
            .connect(NoTls)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        info!(driver = "pgsql", "Connected");
        Ok(Self { client })
    }
}

/// Map `pgsql:` DSN options onto a tokio-postgres config.
fn pg_config(dsn: &Dsn, username: Option<&str>, password: Option<&str>) -> Result<Config> {
    let mut config = Config::new();

    for (key, value) in dsn.options() {
        match key {
            "host" if !value.is_empty() => {
                config.host(value);
            }
            "host" => {}
            "port" => {}
            "dbname" => {
                config.dbname(value);
            }
            "user" => {
                config.user(value);
            }
            "password" => {
                config.password(value);
            }
            "application_name" => {
                config.application_name(value);
            }
            "options" => {
                config.options(value);
            }
            "connect_timeout" => {
                let secs: u64 = value.parse().map_err(|_| {
                    DbError::InvalidDsn(format!("invalid connect_timeout '{}'", value))
                })?;
                config.connect_timeout(Duration::from_secs(secs));
            }
            other => warn!(key = other, "Ignoring unknown pgsql DSN option"),
        }
    }

    if let Some(port) = dsn.port()? {
        config.port(port);
    }
    if let Some(user) = username {
        config.user(user);
    }
    if let Some(password) = password {
        config.password(password);
    }

    Ok(config)
}

#[async_trait]
impl DatabaseDriver for TokioPostgresDriver {
    fn name(&self) -> &str {
        "pgsql"
    }

    async fn prepare(&self, sql: &str) -> Result<()> {
        let rewritten = rewrite(sql, PlaceholderStyle::Numbered)?;
        self.client
            .prepare(rewritten.sql())
            .await
            .map_err(|e| DbError::PrepareFailed(e.to_string()))?;
        Ok(())
    }

    async fn execute(&self, sql: &str, params: &Params) -> Result<RawQueryResult> {
        let rewritten = rewrite(sql, PlaceholderStyle::Numbered)?;
        let values = rewritten.bind(params)?;
        debug!(sql = %rewritten.sql(), params = values.len(), "Executing statement");

        let converted_params: Vec<PgParam<'_>> = values.iter().map(PgParam).collect();
        let param_refs: Vec<&(dyn ToSql + Sync)> = converted_params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect();

        let rows = self
            .client
            .query(rewritten.sql(), &param_refs)
            .await
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;

        // Extract column names
        let columns: Vec<String> = match rows.first() {
            Some(row) => row
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            None => Vec::new(),
        };

        let result_rows = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| {
                        row.try_get::<_, PgValue>(i)
                            .map(|v| v.0)
                            .map_err(|e| DbError::QueryFailed(e.to_string()))
                    })
                    .collect::<Result<Vec<SqlValue>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RawQueryResult::new(columns, result_rows))
    }

    async fn last_insert_id(&self, sequence: Option<&str>) -> Result<Option<String>> {
        let result = match sequence {
            Some(name) => {
                self.client
                    .query_one("SELECT currval($1::text::regclass)::text", &[&name])
                    .await
            }
            None => self.client.query_one("SELECT lastval()::text", &[]).await,
        };

        match result {
            Ok(row) => row
                .try_get::<_, Option<String>>(0)
                .map_err(|e| DbError::QueryFailed(e.to_string())),
            // currval/lastval before any value was generated in this session
            Err(e) if e.code() == Some(&SqlState::OBJECT_NOT_IN_PREREQUISITE_STATE) => Ok(None),
            Err(e) => Err(DbError::QueryFailed(e.to_string())),
        }
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

impl TokioPostgresDriver {
    async fn batch(&self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "Executing transaction statement");
        self.client
            .batch_execute(sql)
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

type BoxError = Box<dyn StdError + Sync + Send>;

/// A bound parameter, converted against the type postgres inferred for its
/// placeholder. NULL fits any type; integers are narrowed or widened to the
/// column's width.
#[derive(Debug)]
struct PgParam<'a>(&'a SqlValue);

impl ToSql for PgParam<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
        match self.0 {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Int32(i) => int_to_sql(i64::from(*i), ty, out),
            SqlValue::Int64(i) => int_to_sql(*i, ty, out),
            SqlValue::Float64(f) if *ty == Type::FLOAT4 => (*f as f32).to_sql(ty, out),
            SqlValue::Float64(f) => f.to_sql_checked(ty, out),
            SqlValue::Text(s) => s.to_sql_checked(ty, out),
            SqlValue::Bool(b) => b.to_sql_checked(ty, out),
            SqlValue::Bytes(b) => b.to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn int_to_sql(value: i64, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(value)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(value)?.to_sql(ty, out),
        _ => value.to_sql_checked(ty, out),
    }
}

/// A column value decoded by its postgres type.
/// Dates, times and UUIDs come back as text, JSON as its serialized form.
#[derive(Debug)]
struct PgValue(SqlValue);

impl<'a> FromSql<'a> for PgValue {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> std::result::Result<Self, BoxError> {
        let value = match *ty {
            Type::BOOL => SqlValue::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => SqlValue::Int32(i32::from(i16::from_sql(ty, raw)?)),
            Type::INT4 => SqlValue::Int32(i32::from_sql(ty, raw)?),
            Type::INT8 => SqlValue::Int64(i64::from_sql(ty, raw)?),
            Type::FLOAT4 => SqlValue::Float64(f64::from(f32::from_sql(ty, raw)?)),
            Type::FLOAT8 => SqlValue::Float64(f64::from_sql(ty, raw)?),
            Type::BYTEA => SqlValue::Bytes(Vec::<u8>::from_sql(ty, raw)?),
            Type::DATE => SqlValue::Text(NaiveDate::from_sql(ty, raw)?.to_string()),
            Type::TIME => SqlValue::Text(NaiveTime::from_sql(ty, raw)?.to_string()),
            Type::TIMESTAMP => SqlValue::Text(NaiveDateTime::from_sql(ty, raw)?.to_string()),
            Type::TIMESTAMPTZ => SqlValue::Text(DateTime::<Utc>::from_sql(ty, raw)?.to_rfc3339()),
            Type::UUID => SqlValue::Text(uuid::Uuid::from_sql(ty, raw)?.to_string()),
            Type::JSON | Type::JSONB => {
                SqlValue::Text(serde_json::Value::from_sql(ty, raw)?.to_string())
            }
            _ if <String as FromSql>::accepts(ty) => SqlValue::Text(String::from_sql(ty, raw)?),
            _ => {
                return Err(format!(
                    "unsupported column type {}; cast it to text in the query",
                    ty
                )
                .into())
            }
        };
        Ok(PgValue(value))
    }

    fn from_sql_null(_ty: &Type) -> std::result::Result<Self, BoxError> {
        Ok(PgValue(SqlValue::Null))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}
