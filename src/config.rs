use std::env;

use serde::{Deserialize, Serialize};

use crate::dsn::Driver;
use crate::error::{DbError, Result};

/// Structured connection settings, consumed once to build a DSN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub driver: Driver,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    /// Database name, or file path for sqlite.
    pub database: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub charset: Option<String>,
}

impl ConnectionConfig {
    pub fn new(driver: impl Into<Driver>, database: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            host: None,
            port: None,
            database: database.into(),
            username: None,
            password: None,
            charset: None,
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// The DSN string for this configuration.
    pub fn dsn(&self) -> String {
        self.driver.format_dsn(self)
    }

    /// Load configuration from `DB_*` environment variables.
    ///
    /// `DB_DRIVER` and `DB_DATABASE` are required; `DB_HOST`, `DB_PORT`,
    /// `DB_USERNAME`, `DB_PASSWORD` and `DB_CHARSET` are optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ConnectionConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let driver = non_empty("DB_DRIVER")
            .ok_or_else(|| DbError::Config("DB_DRIVER is not set".to_string()))?;
        let database = non_empty("DB_DATABASE")
            .ok_or_else(|| DbError::Config("DB_DATABASE is not set".to_string()))?;
        let port = non_empty("DB_PORT")
            .map(|p| {
                p.parse::<u16>()
                    .map_err(|_| DbError::Config(format!("DB_PORT is not a valid port: '{}'", p)))
            })
            .transpose()?;

        Ok(Self {
            driver: Driver::from(driver),
            host: non_empty("DB_HOST"),
            port,
            database,
            username: non_empty("DB_USERNAME"),
            password: non_empty("DB_PASSWORD"),
            charset: non_empty("DB_CHARSET"),
        })
    }
}
