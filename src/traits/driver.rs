use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Params, RawQueryResult};

/// Trait for database driver implementations.
/// Drivers are responsible for:
/// - Holding exactly one connection to the database
/// - Rewriting `?` / `:name` placeholders into their native style
/// - Converting SqlValue parameters to native types
/// - Executing statements and converting results to RawQueryResult
///
/// Every driver-level failure is returned as an error. "No data" is never an
/// error: it is an empty result or `None`.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Short driver name, e.g. `"sqlite"`.
    fn name(&self) -> &str;

    /// Compile `sql` without executing it.
    /// Malformed SQL fails with `DbError::PrepareFailed`.
    async fn prepare(&self, sql: &str) -> Result<()>;

    /// Execute `sql` with the given parameters and fetch every row.
    async fn execute(&self, sql: &str, params: &Params) -> Result<RawQueryResult>;

    /// Execute `sql` without parameters.
    /// `None` means the driver produced no executable result.
    async fn query(&self, sql: &str) -> Result<Option<RawQueryResult>> {
        self.execute(sql, &Params::None).await.map(Some)
    }

    /// The most recently generated id on this connection.
    /// `sequence` is only meaningful for sequence-based databases.
    async fn last_insert_id(&self, sequence: Option<&str>) -> Result<Option<String>>;

    async fn begin_transaction(&self) -> Result<()>;

    async fn commit(&self) -> Result<()>;

    async fn rollback(&self) -> Result<()>;
}
