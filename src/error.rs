use thiserror::Error;

/// Error type for nefertix operations
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Invalid DSN: {0}")]
    InvalidDsn(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prepare failed: {0}")]
    PrepareFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Parameter mismatch: {0}")]
    ParameterMismatch(String),

    #[error("Empty {0} clause")]
    EmptyClause(&'static str),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),
}

/// Result type alias for nefertix operations
pub type Result<T> = std::result::Result<T, DbError>;
