//! Driver identifiers and DSN strings.
//!
//! Two directions are covered here: formatting a DSN from a
//! [`ConnectionConfig`], and parsing a DSN back into driver options when a
//! connection is opened.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConnectionConfig;
use crate::error::{DbError, Result};

/// Charset appended to mysql DSNs when none is configured.
pub const DEFAULT_MYSQL_CHARSET: &str = "utf8mb4";

/// Database driver named by a DSN prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Driver {
    Sqlite,
    Mysql,
    Pgsql,
    /// Any other driver name; formatted with the generic host template.
    Other(String),
}

impl Driver {
    pub fn from_name(name: &str) -> Self {
        match name {
            "sqlite" => Driver::Sqlite,
            "mysql" => Driver::Mysql,
            "pgsql" => Driver::Pgsql,
            other => Driver::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Driver::Sqlite => "sqlite",
            Driver::Mysql => "mysql",
            Driver::Pgsql => "pgsql",
            Driver::Other(name) => name,
        }
    }

    /// Formats the DSN for `config` using this driver's rule.
    pub fn format_dsn(&self, config: &ConnectionConfig) -> String {
        match self {
            Driver::Sqlite => format!("sqlite:{}", config.database),
            Driver::Mysql => {
                let charset = config
                    .charset
                    .as_deref()
                    .filter(|c| !c.is_empty())
                    .unwrap_or(DEFAULT_MYSQL_CHARSET);
                format!("{};charset={}", self.host_dsn(config), charset)
            }
            Driver::Pgsql | Driver::Other(_) => self.host_dsn(config),
        }
    }

    /// `<driver>:host=<host>[;port=<port>];dbname=<database>`
    ///
    /// A port of 0 counts as absent.
    fn host_dsn(&self, config: &ConnectionConfig) -> String {
        let mut dsn = format!(
            "{}:host={}",
            self.name(),
            config.host.as_deref().unwrap_or_default()
        );
        if let Some(port) = config.port.filter(|p| *p != 0) {
            dsn.push_str(&format!(";port={}", port));
        }
        dsn.push_str(&format!(";dbname={}", config.database));
        dsn
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Driver {
    fn from(name: &str) -> Self {
        Driver::from_name(name)
    }
}

impl From<String> for Driver {
    fn from(name: String) -> Self {
        Driver::from_name(&name)
    }
}

impl From<Driver> for String {
    fn from(driver: Driver) -> Self {
        driver.name().to_string()
    }
}

/// A parsed `driver:body` connection string.
#[derive(Debug, Clone, PartialEq)]
pub struct Dsn {
    driver: Driver,
    body: String,
}

impl Dsn {
    pub fn parse(dsn: &str) -> Result<Self> {
        let (name, body) = dsn
            .split_once(':')
            .ok_or_else(|| DbError::InvalidDsn(format!("missing driver prefix in '{}'", dsn)))?;
        if name.is_empty() {
            return Err(DbError::InvalidDsn(format!("empty driver name in '{}'", dsn)));
        }
        Ok(Self {
            driver: Driver::from_name(name),
            body: body.to_string(),
        })
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// Everything after the driver prefix. For sqlite this is the path.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// `key=value` pairs of the body, in order.
    pub fn options(&self) -> Vec<(&str, &str)> {
        self.body
            .split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (segment, ""),
            })
            .collect()
    }

    /// Last value given for `key`.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options()
            .into_iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub fn port(&self) -> Result<Option<u16>> {
        match self.option("port") {
            None | Some("") => Ok(None),
            Some(port) => port
                .parse()
                .map(Some)
                .map_err(|_| DbError::InvalidDsn(format!("invalid port '{}'", port))),
        }
    }
}

impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.driver, self.body)
    }
}
