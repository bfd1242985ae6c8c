use std::sync::Arc;

use tracing::debug;

use crate::config::ConnectionConfig;
use crate::database::Database;
use crate::drivers::{MysqlDriver, SqliteDriver, TokioPostgresDriver};
use crate::dsn::{Driver, Dsn};
use crate::error::{DbError, Result};
use crate::traits::DatabaseDriver;

/// Builds a [`Database`] from a DSN string or structured configuration.
///
/// # Example
/// ```ignore
/// let config = ConnectionConfig::new("mysql", "shop")
///     .host("localhost")
///     .credentials("app", "secret");
/// let db = ConnectionFactory::from_config(&config).await?;
/// ```
pub struct ConnectionFactory;

impl ConnectionFactory {
    /// Connect using a DSN such as `sqlite:/var/app.db` or
    /// `pgsql:host=localhost;port=5432;dbname=app`.
    pub async fn from_dsn(
        dsn: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Database> {
        let dsn = Dsn::parse(dsn)?;
        debug!(driver = %dsn.driver(), "Opening connection");

        let driver: Arc<dyn DatabaseDriver> = match dsn.driver() {
            Driver::Sqlite => Arc::new(SqliteDriver::connect(dsn.body()).await?),
            Driver::Mysql => Arc::new(MysqlDriver::connect(&dsn, username, password).await?),
            Driver::Pgsql => {
                Arc::new(TokioPostgresDriver::connect(&dsn, username, password).await?)
            }
            Driver::Other(name) => return Err(DbError::UnsupportedDriver(name.clone())),
        };

        Ok(Database::with_driver(driver))
    }

    /// Connect using structured configuration. See [`ConnectionConfig::dsn`]
    /// for the DSN each driver gets.
    pub async fn from_config(config: &ConnectionConfig) -> Result<Database> {
        Self::from_dsn(
            &config.dsn(),
            config.username.as_deref(),
            config.password.as_deref(),
        )
        .await
    }

    /// Connect using `DB_*` environment variables.
    pub async fn from_env() -> Result<Database> {
        let config = ConnectionConfig::from_env()?;
        Self::from_config(&config).await
    }
}
