use std::fmt;
use std::sync::Arc;

use crate::builders::{DeleteBuilder, InsertBuilder, UpdateBuilder};
use crate::error::Result;
use crate::statement::Statement;
use crate::traits::DatabaseDriver;
use crate::types::{Params, QueryResult, Row, SqlValue};

/// A single database connection with convenience helpers.
///
/// Every driver failure is returned as an error. Helpers with a "no data"
/// outcome (`query`, `single`, `row`, `last_insert_id`) return `Ok(None)` for
/// it instead.
///
/// No transaction is rolled back automatically; callers that catch an error
/// inside a transaction must call [`Database::rollback`] themselves.
pub struct Database {
    driver: Arc<dyn DatabaseDriver>,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("driver", &self.driver.name())
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Create a database handle over an already connected driver.
    /// Useful for testing or using alternative database drivers.
    pub fn with_driver(driver: Arc<dyn DatabaseDriver>) -> Self {
        Self { driver }
    }

    /// Name of the underlying driver.
    pub fn driver_name(&self) -> &str {
        self.driver.name()
    }

    /// Compile `sql` into a reusable statement.
    pub async fn prepare(&self, sql: &str) -> Result<Statement> {
        Statement::prepare(Arc::clone(&self.driver), sql).await
    }

    /// Execute `sql` directly, without parameters.
    /// `None` when the driver produced no executable result.
    pub async fn query(&self, sql: &str) -> Result<Option<QueryResult>> {
        let raw = self.driver.query(sql).await?;
        Ok(raw.map(QueryResult::from_raw))
    }

    /// First column of the first row, or `None` when no row matched.
    ///
    /// # Example
    /// ```ignore
    /// let count = db
    ///     .single("SELECT COUNT(*) FROM users WHERE active = ?", Params::positional([true]))
    ///     .await?;
    /// ```
    pub async fn single(&self, sql: &str, params: Params) -> Result<Option<SqlValue>> {
        let statement = self.prepare(sql).await?;
        let result = statement.execute(&params).await?;
        Ok(result.first_value())
    }

    /// First row keyed by column name, or `None` when no row matched.
    pub async fn row(&self, sql: &str, params: Params) -> Result<Option<Row>> {
        let statement = self.prepare(sql).await?;
        let result = statement.execute(&params).await?;
        Ok(result.first_row())
    }

    /// Most recent auto-increment or sequence value on this connection.
    /// `sequence` is used by sequence-based databases and ignored elsewhere.
    pub async fn last_insert_id(&self, sequence: Option<&str>) -> Result<Option<String>> {
        self.driver.last_insert_id(sequence).await
    }

    pub async fn begin_transaction(&self) -> Result<bool> {
        self.driver.begin_transaction().await?;
        Ok(true)
    }

    pub async fn commit(&self) -> Result<bool> {
        self.driver.commit().await?;
        Ok(true)
    }

    pub async fn rollback(&self) -> Result<bool> {
        self.driver.rollback().await?;
        Ok(true)
    }

    /// `INSERT INTO <table> (c1,c2) VALUES (:c1,:c2)`, bound by name.
    pub async fn insert<K, V, I>(&self, table: &str, params: I) -> Result<bool>
    where
        K: Into<String>,
        V: Into<SqlValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        InsertBuilder::new(Arc::clone(&self.driver), table)
            .values(params)
            .execute()
            .await
    }

    /// `UPDATE <table> SET c1 = ?,c2 = ? WHERE k1 = ? AND k2 = ?`, bound
    /// positionally with `params` values followed by `conditions` values.
    pub async fn update<K1, V1, I1, K2, V2, I2>(
        &self,
        table: &str,
        params: I1,
        conditions: I2,
    ) -> Result<bool>
    where
        K1: Into<String>,
        V1: Into<SqlValue>,
        I1: IntoIterator<Item = (K1, V1)>,
        K2: Into<String>,
        V2: Into<SqlValue>,
        I2: IntoIterator<Item = (K2, V2)>,
    {
        UpdateBuilder::new(Arc::clone(&self.driver), table)
            .set(params)
            .where_eq(conditions)
            .execute()
            .await
    }

    /// `DELETE FROM <table> WHERE k1 = ? AND k2 = ?`, bound positionally.
    pub async fn delete<K, V, I>(&self, table: &str, conditions: I) -> Result<bool>
    where
        K: Into<String>,
        V: Into<SqlValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        DeleteBuilder::new(Arc::clone(&self.driver), table)
            .where_eq(conditions)
            .execute()
            .await
    }
}
