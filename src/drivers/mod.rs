mod mysql;
mod sqlite;
mod tokio_postgres;

pub use self::in_memory_test::{InMemoryTestDriver, InMemoryTestResponseBuilder, RecordedQuery};
pub use self::mysql::MysqlDriver;
pub use self::sqlite::{SqliteDriver, MEMORY_PATH};
pub use self::tokio_postgres::TokioPostgresDriver;
