use ignomi_core::db::migrations::latest_version;
use ignomi_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "app_stats");
    assert_index_exists(&conn, "idx_frecency");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app_usage.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO app_stats (app_id, launch_count, last_launch, created_at)
             VALUES ('firefox.desktop', 3, 100, 50);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM app_stats;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn open_db_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("ignomi").join("app_usage.db");

    let conn = open_db(&path).unwrap();

    assert!(path.exists());
    assert_eq!(journal_mode(&conn), "wal");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn launch_count_below_one_is_rejected_by_schema() {
    let conn = open_db_in_memory().unwrap();

    let result = conn.execute(
        "INSERT INTO app_stats (app_id, launch_count, last_launch, created_at)
         VALUES ('zero.desktop', 0, 1, 1);",
        [],
    );

    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn journal_mode(conn: &Connection) -> String {
    conn.query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert!(
        sqlite_object_exists(conn, "table", table_name),
        "expected table `{table_name}` to exist"
    );
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert!(
        sqlite_object_exists(conn, "index", index_name),
        "expected index `{index_name}` to exist"
    );
}

fn sqlite_object_exists(conn: &Connection, kind: &str, name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2);",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}
