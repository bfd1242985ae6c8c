use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::traits::DatabaseDriver;
use crate::types::{Params, QueryResult};

/// A statement compiled by the driver.
/// Can be executed any number of times with different parameters.
pub struct Statement {
    driver: Arc<dyn DatabaseDriver>,
    sql: String,
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("driver", &self.driver.name())
            .field("sql", &self.sql)
            .finish()
    }
}

impl Statement {
    pub(crate) async fn prepare(driver: Arc<dyn DatabaseDriver>, sql: &str) -> Result<Self> {
        driver.prepare(sql).await?;
        Ok(Self {
            driver,
            sql: sql.to_string(),
        })
    }

    /// The SQL as written, with `?` / `:name` placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Execute with `params` and fetch every row.
    pub async fn execute(&self, params: &Params) -> Result<QueryResult> {
        let raw = self.driver.execute(&self.sql, params).await?;
        Ok(QueryResult::from_raw(raw))
    }
}
