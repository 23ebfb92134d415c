//! Shelter schema history.
//!
//! # Responsibility
//! - List the numbered schema steps shipped with this build.
//! - Bring a connection from its recorded schema version up to the latest.
//!
//! # Invariants
//! - Step versions start at 1 and increase by exactly one.
//! - Pending steps run in a single transaction; a failing step leaves the
//!   database at its previous version.
//! - The schema version lives in `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "shelter_tables",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "relation_indexes",
        sql: include_str!("0002_relation_indexes.sql"),
    },
];

/// Schema version produced by the newest step of this build.
pub fn latest_version() -> u32 {
    last_version(SCHEMA_STEPS)
}

/// Schema version recorded on `conn`; `0` for a fresh database.
pub fn current_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Runs every schema step newer than the connection's recorded version.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database was written by a newer
///   build.
/// - `MigrationFailed` naming the step that SQLite rejected.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    upgrade(conn, SCHEMA_STEPS)
}

fn last_version(steps: &[SchemaStep]) -> u32 {
    steps.last().map_or(0, |step| step.version)
}

fn upgrade(conn: &mut Connection, steps: &[SchemaStep]) -> DbResult<()> {
    let from_version = current_version(conn)?;
    let to_version = last_version(steps);
    if from_version > to_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: to_version,
        });
    }

    let pending: Vec<&SchemaStep> = steps
        .iter()
        .filter(|step| step.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        run_step(&tx, step).map_err(|source| {
            error!(
                "event=db_migrate module=db status=error version={} name={} error={source}",
                step.version, step.name
            );
            DbError::MigrationFailed {
                version: step.version,
                name: step.name,
                source,
            }
        })?;
        info!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={to_version}");
    Ok(())
}

fn run_step(conn: &Connection, step: &SchemaStep) -> rusqlite::Result<()> {
    conn.execute_batch(step.sql)?;
    conn.pragma_update(None, "user_version", step.version)
}

#[cfg(test)]
mod tests {
    use super::{current_version, upgrade, SchemaStep, SCHEMA_STEPS};
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn step_versions_are_contiguous_from_one() {
        for (index, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
    }

    #[test]
    fn failing_step_is_named_and_rolls_back() {
        let steps = [
            SchemaStep {
                version: 1,
                name: "kennels",
                sql: "CREATE TABLE kennels (id INTEGER PRIMARY KEY);",
            },
            SchemaStep {
                version: 2,
                name: "broken",
                sql: "CREATE TABLE kennels (id INTEGER PRIMARY KEY);",
            },
        ];
        let mut conn = Connection::open_in_memory().unwrap();

        match upgrade(&mut conn, &steps) {
            Err(DbError::MigrationFailed { version, name, .. }) => {
                assert_eq!(version, 2);
                assert_eq!(name, "broken");
            }
            other => panic!("expected failed step, got {other:?}"),
        }

        assert_eq!(current_version(&conn).unwrap(), 0);
        let kennels: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'kennels';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(kennels, 0);
    }

    #[test]
    fn upgrade_resumes_from_recorded_version() {
        let steps = [
            SchemaStep {
                version: 1,
                name: "kennels",
                sql: "CREATE TABLE kennels (id INTEGER PRIMARY KEY);",
            },
            SchemaStep {
                version: 2,
                name: "kennel_size",
                sql: "ALTER TABLE kennels ADD COLUMN size INTEGER;",
            },
        ];
        let mut conn = Connection::open_in_memory().unwrap();

        upgrade(&mut conn, &steps[..1]).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 1);

        upgrade(&mut conn, &steps).unwrap();
        upgrade(&mut conn, &steps).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 2);
    }
}
