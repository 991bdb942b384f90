use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};
use tracing::{debug, info};

/// Schema version written to `PRAGMA user_version` once all tables exist.
pub const SCHEMA_VERSION: i32 = 1;

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Check if a table exists.
pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Current `PRAGMA user_version`; 0 for a fresh file.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
}

/// Create the `persons` table (the roster).
fn create_persons_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS persons (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            cohort      TEXT NOT NULL DEFAULT '',
            grp         TEXT NOT NULL DEFAULT '',
            created_at  TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Create the `events` table.
fn create_events_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            date        TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Create the `sessions` table (attendance records under an event).
fn create_sessions_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id    INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
            name        TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_event ON sessions(event_id);
        "#,
    )?;
    Ok(())
}

/// Create the `entries` table: one row per (session, person).
fn create_entries_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            session_id  INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
            person_id   TEXT NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
            status      TEXT NOT NULL DEFAULT 'Absent'
                        CHECK(status IN ('Present','Absent','Excused')),
            timestamp   TEXT NULL,
            PRIMARY KEY (session_id, person_id)
        );

        CREATE INDEX IF NOT EXISTS idx_entries_person ON entries(person_id);
        "#,
    )?;
    Ok(())
}

/// Bring the schema up to `SCHEMA_VERSION`. Safe to run repeatedly.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    let version = schema_version(conn)?;
    debug!(version, target_version = SCHEMA_VERSION, "checking schema");

    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    // 2) Create missing tables, parents first
    for (name, create) in [
        ("persons", create_persons_table as fn(&Connection) -> Result<()>),
        ("events", create_events_table),
        ("sessions", create_sessions_table),
        ("entries", create_entries_table),
    ] {
        if !table_exists(conn, name)? {
            create(conn)?;
            success(format!("Created {name} table."));
        }
    }

    // 3) Stamp the version
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    info!(version = SCHEMA_VERSION, "schema migrated");

    Ok(())
}
