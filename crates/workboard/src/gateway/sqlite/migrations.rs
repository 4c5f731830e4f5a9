//! Schema upgrades for the local store.
//!
//! Applied versions are recorded in `_migrations`; each pending step runs
//! in its own transaction together with its record. A step that adds a
//! column is recorded without running when the column is already there.

use rusqlite::{params, Connection};

use crate::gateway::GatewayError;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
    /// `(table, column)` this step adds, if any.
    adds_column: Option<(&'static str, &'static str)>,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "create_request_table",
        sql: include_str!("sql/001_create_request.sql"),
        adds_column: None,
    },
    SchemaStep {
        version: 2,
        name: "create_objects_table",
        sql: include_str!("sql/002_create_objects.sql"),
        adds_column: None,
    },
    SchemaStep {
        version: 3,
        name: "add_is_work_done_to_request",
        sql: include_str!("sql/003_add_is_work_done.sql"),
        adds_column: Some(("request", "is_work_done")),
    },
    SchemaStep {
        version: 4,
        name: "add_check_marks_to_request",
        sql: include_str!("sql/004_add_check_marks.sql"),
        adds_column: Some(("request", "check_marks")),
    },
];

/// Brings the schema up to the latest version.
pub fn run_all(conn: &Connection) -> Result<(), GatewayError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let applied: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;

    for step in STEPS.iter().filter(|s| s.version > applied) {
        apply_step(conn, step)?;
    }
    Ok(())
}

fn apply_step(conn: &Connection, step: &SchemaStep) -> Result<(), GatewayError> {
    let present = match step.adds_column {
        Some((table, column)) => column_exists(conn, table, column)?,
        None => false,
    };

    let failed = |e: rusqlite::Error| GatewayError::Migration {
        version: step.version,
        reason: e.to_string(),
    };

    conn.execute_batch("BEGIN").map_err(failed)?;
    match record_step(conn, step, present) {
        Ok(()) => conn.execute_batch("COMMIT").map_err(failed),
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(failed(e))
        }
    }
}

fn record_step(conn: &Connection, step: &SchemaStep, present: bool) -> rusqlite::Result<()> {
    if present {
        log::info!("Schema v{} ({}) already present", step.version, step.name);
    } else {
        log::info!("Applying schema v{}: {}", step.version, step.name);
        conn.execute_batch(step.sql)?;
    }
    conn.execute(
        "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
        params![step.version, step.name],
    )?;
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, GatewayError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        params![table, column],
        |r| r.get(0),
    )?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_run_on_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();

        let count: u32 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, STEPS.len() as u32);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();
        run_all(&conn).unwrap();

        let count: u32 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, STEPS.len() as u32);
    }

    #[test]
    fn test_request_table_has_late_columns() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();

        assert!(column_exists(&conn, "request", "is_work_done").unwrap());
        assert!(column_exists(&conn, "request", "check_marks").unwrap());
    }

    #[test]
    fn test_add_column_skipped_when_present() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(include_str!("sql/001_create_request.sql"))
            .unwrap();
        conn.execute_batch("ALTER TABLE request ADD COLUMN is_work_done INTEGER;")
            .unwrap();

        run_all(&conn).unwrap();
        assert!(column_exists(&conn, "request", "is_work_done").unwrap());
    }

    #[test]
    fn test_column_lookup_on_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!column_exists(&conn, "request", "id").unwrap());
    }

    #[test]
    fn test_failed_step_is_not_recorded() {
        let conn = Connection::open_in_memory().unwrap();
        // A hand-made request table lacking created_at breaks the v1 index.
        conn.execute_batch("CREATE TABLE request (id INTEGER PRIMARY KEY);")
            .unwrap();

        assert!(run_all(&conn).is_err());
        let count: u32 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
