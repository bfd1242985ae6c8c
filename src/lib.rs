//! nefertix - A thin, driver-agnostic database access helper
//!
//! # Example
//! ```ignore
//! use nefertix::{ConnectionConfig, ConnectionFactory, Params};
//!
//! // Connect to database
//! let config = ConnectionConfig::new("pgsql", "app")
//!     .host("localhost")
//!     .port(5432)
//!     .credentials("app", "secret");
//! let db = ConnectionFactory::from_config(&config).await?;
//!
//! // Write and read back
//! db.insert("users", [("name", "Ann")]).await?;
//! let name = db
//!     .single("SELECT name FROM users WHERE id = :id", Params::named([("id", 1)]))
//!     .await?;
//! ```

pub mod clauses;
pub mod config;
pub mod drivers;
pub mod dsn;
pub mod error;
pub mod placeholders;
pub mod traits;
pub mod types;

mod builders;
mod database;
mod factory;
mod statement;

// Re-export main types for convenient access
pub use config::ConnectionConfig;
pub use database::Database;
pub use dsn::{Driver, Dsn};
pub use error::{DbError, Result};
pub use factory::ConnectionFactory;
pub use statement::Statement;
pub use traits::DatabaseDriver;
pub use types::{Params, QueryResult, RawQueryResult, Row, SqlValue};
