use nefertix::error::DbError;
use nefertix::types::{Params, SqlValue};
use nefertix::{ConnectionConfig, ConnectionFactory, Database};

async fn memory_db() -> Database {
    let db = ConnectionFactory::from_dsn("sqlite::memory:", None, None)
        .await
        .unwrap();
    db.query("CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE, age INTEGER)")
        .await
        .unwrap();
    db
}

#[tokio::test]
async fn test_insert_and_read_back() {
    let db = memory_db().await;

    assert_eq!(db.last_insert_id(None).await.unwrap(), None);

    assert!(db
        .insert("users", [("name", SqlValue::from("Ann")), ("age", SqlValue::from(30))])
        .await
        .unwrap());
    assert_eq!(db.last_insert_id(None).await.unwrap(), Some("1".to_string()));

    let row = db
        .row(
            "SELECT id, name, age FROM users WHERE name = :name",
            Params::named([("name", "Ann")]),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(row.columns(), vec!["id", "name", "age"]);
    assert_eq!(row.get("id").unwrap(), &SqlValue::Int64(1));
    assert_eq!(row.get("name").unwrap(), &SqlValue::from("Ann"));
    assert_eq!(row.get("age").unwrap(), &SqlValue::Int64(30));
}

#[tokio::test]
async fn test_update_and_delete() {
    let db = memory_db().await;
    db.insert("users", [("name", SqlValue::from("Ann")), ("age", SqlValue::from(30))])
        .await
        .unwrap();
    db.insert("users", [("name", SqlValue::from("Bob")), ("age", SqlValue::from(40))])
        .await
        .unwrap();

    db.update(
        "users",
        [("age", SqlValue::from(31)), ("name", SqlValue::from("Annie"))],
        [("id", 1)],
    )
    .await
    .unwrap();

    let age = db
        .single("SELECT age FROM users WHERE name = ?", Params::positional(["Annie"]))
        .await
        .unwrap();
    assert_eq!(age, Some(SqlValue::Int64(31)));

    // The other row is untouched
    let bob = db
        .single("SELECT age FROM users WHERE id = ?", Params::positional([2]))
        .await
        .unwrap();
    assert_eq!(bob, Some(SqlValue::Int64(40)));

    db.delete("users", [("id", 2)]).await.unwrap();
    let count = db
        .single("SELECT COUNT(*) FROM users", Params::None)
        .await
        .unwrap();
    assert_eq!(count, Some(SqlValue::Int64(1)));
}

#[tokio::test]
async fn test_no_match_is_not_an_error() {
    let db = memory_db().await;

    let value = db
        .single("SELECT name FROM users WHERE id = ?", Params::positional([42]))
        .await
        .unwrap();
    let row = db
        .row("SELECT * FROM users WHERE id = ?", Params::positional([42]))
        .await
        .unwrap();

    assert!(value.is_none());
    assert!(row.is_none());
}

#[tokio::test]
async fn test_null_value_is_a_value() {
    let db = memory_db().await;
    db.insert("users", [("name", SqlValue::from("Ann")), ("age", SqlValue::Null)])
        .await
        .unwrap();

    let age = db
        .single("SELECT age FROM users WHERE id = 1", Params::None)
        .await
        .unwrap();
    assert_eq!(age, Some(SqlValue::Null));
}

#[tokio::test]
async fn test_malformed_sql_fails_to_prepare() {
    let db = memory_db().await;

    let err = db.prepare("SELEC * FROM users").await.unwrap_err();
    assert!(matches!(err, DbError::PrepareFailed(_)));

    let err = db
        .single("SELECT * FROM missing_table", Params::None)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::PrepareFailed(_)));
}

#[tokio::test]
async fn test_constraint_violation_is_an_error() {
    let db = memory_db().await;
    db.insert("users", [("name", "Ann")]).await.unwrap();

    let err = db.insert("users", [("name", "Ann")]).await.unwrap_err();
    assert!(matches!(err, DbError::QueryFailed(_)));
}

#[tokio::test]
async fn test_transactions() {
    let db = memory_db().await;

    assert!(db.begin_transaction().await.unwrap());
    db.insert("users", [("name", "Ann")]).await.unwrap();
    assert!(db.rollback().await.unwrap());

    let count = db
        .single("SELECT COUNT(*) FROM users", Params::None)
        .await
        .unwrap();
    assert_eq!(count, Some(SqlValue::Int64(0)));

    assert!(db.begin_transaction().await.unwrap());
    assert!(matches!(
        db.begin_transaction().await,
        Err(DbError::TransactionFailed(_))
    ));
    db.insert("users", [("name", "Bob")]).await.unwrap();
    assert!(db.commit().await.unwrap());

    assert!(matches!(db.commit().await, Err(DbError::TransactionFailed(_))));

    let count = db
        .single("SELECT COUNT(*) FROM users", Params::None)
        .await
        .unwrap();
    assert_eq!(count, Some(SqlValue::Int64(1)));
}

#[tokio::test]
async fn test_from_config_and_from_dsn_open_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    let path = path.to_str().unwrap();

    let config = ConnectionConfig::new("sqlite", path)
        .host("ignored.example.com")
        .port(3306)
        .charset("latin1");
    assert_eq!(config.dsn(), format!("sqlite:{}", path));

    let writer = ConnectionFactory::from_config(&config).await.unwrap();
    writer
        .query("CREATE TABLE notes (body TEXT)")
        .await
        .unwrap();
    writer.insert("notes", [("body", "hello")]).await.unwrap();

    let reader = ConnectionFactory::from_dsn(&format!("sqlite:{}", path), None, None)
        .await
        .unwrap();
    let body = reader
        .single("SELECT body FROM notes", Params::None)
        .await
        .unwrap();
    assert_eq!(body, Some(SqlValue::from("hello")));
    assert_eq!(reader.driver_name(), "sqlite");
}

#[tokio::test]
async fn test_connection_errors() {
    let err = ConnectionFactory::from_dsn("sqlite:/nonexistent-dir/sub/app.db", None, None)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, DbError::ConnectionFailed(_)));

    let err = ConnectionFactory::from_dsn("oci:dbname=//localhost/XE", None, None)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, DbError::UnsupportedDriver(name) if name == "oci"));

    let err = ConnectionFactory::from_dsn("not a dsn", None, None)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, DbError::InvalidDsn(_)));
}
