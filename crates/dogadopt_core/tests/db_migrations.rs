use dogadopt_core::db::migrations::latest_version;
use dogadopt_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in ["breeds", "dogs", "adopters", "adoption_applications"] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shelter.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO breeds (uuid, name) VALUES ('b-1', 'Akita');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let breeds: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM breeds;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(breeds, 1);
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
fn foreign_keys_are_enforced_and_cascade() {
    let conn = open_db_in_memory().unwrap();

    let dangling = conn.execute(
        "INSERT INTO dogs (uuid, name, age, sex, breed_id) VALUES ('d-1', 'Rex', 2, 'M', 'nope');",
        [],
    );
    match dangling {
        Err(err) => assert!(DbError::from(err).is_constraint_violation()),
        Ok(_) => panic!("dangling breed reference must be rejected"),
    }

    conn.execute_batch(
        "INSERT INTO breeds (uuid, name) VALUES ('b-1', 'Labrador');
         INSERT INTO dogs (uuid, name, age, sex, breed_id) VALUES ('d-1', 'Rex', 2, 'M', 'b-1');
         DELETE FROM breeds WHERE uuid = 'b-1';",
    )
    .unwrap();
    let dogs: i64 = conn
        .query_row("SELECT COUNT(*) FROM dogs;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(dogs, 0);
}

#[test]
fn relation_indexes_exist() {
    let conn = open_db_in_memory().unwrap();
    let indexes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(indexes, 3);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
