use crate::errors::AppError;
use crate::models::entry::{Entry, EntryKey, EntryView};
use crate::models::event::Event;
use crate::models::person::Person;
use crate::models::session::Session;
use crate::models::status::AttendanceStatus;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

/// Storage format of every timestamp column.
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_ts(col: usize, raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT)
        .map_err(|_| conversion_error(col, AppError::Other(format!("Invalid timestamp: {raw}"))))
}

pub fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

// ---------------------------
// Persons
// ---------------------------

pub fn map_person(row: &Row) -> Result<Person> {
    Ok(Person {
        id: row.get("id")?,
        name: row.get("name")?,
        cohort: row.get("cohort")?,
        group: row.get("grp")?,
    })
}

/// Insert a person unless the id already exists.
/// Returns `true` when a row was inserted.
pub fn insert_person_ignore(conn: &Connection, p: &Person, created_at: &str) -> Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO persons (id, name, cohort, grp, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![p.id, p.name, p.cohort, p.group, created_at],
    )?;
    Ok(n == 1)
}

pub fn load_persons(conn: &Connection) -> Result<Vec<Person>> {
    let mut stmt = conn.prepare_cached("SELECT id, name, cohort, grp FROM persons ORDER BY rowid")?;
    let rows = stmt.query_map([], map_person)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_person(conn: &Connection, id: &str) -> Result<Option<Person>> {
    conn.query_row(
        "SELECT id, name, cohort, grp FROM persons WHERE id = ?1",
        [id],
        map_person,
    )
    .optional()
}

pub fn delete_person(conn: &Connection, id: &str) -> Result<usize> {
    conn.execute("DELETE FROM persons WHERE id = ?1", [id])
}

// ---------------------------
// Events
// ---------------------------

pub fn map_event(row: &Row) -> Result<Event> {
    let date_str: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|_| {
        conversion_error(0, AppError::Other(format!("Invalid event date: {date_str}")))
    })?;

    Ok(Event {
        id: row.get("id")?,
        name: row.get("name")?,
        date,
    })
}

pub fn insert_event(conn: &Connection, name: &str, date: &NaiveDate, created_at: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (name, date, created_at) VALUES (?1, ?2, ?3)",
        params![name, date.format(DATE_FORMAT).to_string(), created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_events(conn: &Connection) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare_cached("SELECT id, name, date FROM events ORDER BY id ASC")?;
    let rows = stmt.query_map([], map_event)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_event(conn: &Connection, id: i64) -> Result<Option<Event>> {
    conn.query_row("SELECT id, name, date FROM events WHERE id = ?1", [id], map_event)
        .optional()
}

// ---------------------------
// Sessions
// ---------------------------

pub fn map_session(row: &Row) -> Result<Session> {
    let created_raw: String = row.get("created_at")?;
    Ok(Session {
        id: row.get("id")?,
        event_id: row.get("event_id")?,
        name: row.get("name")?,
        created_at: parse_ts(3, &created_raw)?,
    })
}

pub fn insert_session(
    conn: &Connection,
    event_id: i64,
    name: &str,
    created_at: &NaiveDateTime,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO sessions (event_id, name, created_at) VALUES (?1, ?2, ?3)",
        params![event_id, name, format_ts(created_at)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_sessions_for_event(conn: &Connection, event_id: i64) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, event_id, name, created_at FROM sessions
         WHERE event_id = ?1
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([event_id], map_session)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_session(conn: &Connection, id: i64) -> Result<Option<Session>> {
    conn.query_row(
        "SELECT id, event_id, name, created_at FROM sessions WHERE id = ?1",
        [id],
        map_session,
    )
    .optional()
}

// ---------------------------
// Entries
// ---------------------------

const ENTRY_VIEW_SELECT: &str = "
    SELECT e.session_id, e.person_id, e.status, e.timestamp,
           p.id, p.name, p.cohort, p.grp,
           s.name AS session_name
    FROM entries e
    JOIN persons p  ON p.id = e.person_id
    JOIN sessions s ON s.id = e.session_id";

pub fn map_entry(row: &Row) -> Result<Entry> {
    let status_str: String = row.get("status")?;
    let status = AttendanceStatus::from_db_str(&status_str)
        .ok_or_else(|| conversion_error(2, AppError::InvalidStatus(status_str.clone())))?;

    let ts_raw: Option<String> = row.get("timestamp")?;
    let timestamp = match ts_raw {
        Some(raw) => Some(parse_ts(3, &raw)?),
        None => None,
    };

    Ok(Entry {
        session_id: row.get("session_id")?,
        person_id: row.get("person_id")?,
        status,
        timestamp,
    })
}

pub fn map_entry_view(row: &Row) -> Result<EntryView> {
    Ok(EntryView {
        entry: map_entry(row)?,
        person: map_person(row)?,
        session_name: row.get("session_name")?,
    })
}

/// Snapshot insert: a fresh entry is always `Absent` with no timestamp.
pub fn insert_absent_entry(conn: &Connection, session_id: i64, person_id: &str) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO entries (session_id, person_id, status, timestamp)
         VALUES (?1, ?2, 'Absent', NULL)",
    )?;
    stmt.execute(params![session_id, person_id])?;
    Ok(())
}

pub fn load_entry(conn: &Connection, key: &EntryKey) -> Result<Option<Entry>> {
    conn.query_row(
        "SELECT session_id, person_id, status, timestamp FROM entries
         WHERE session_id = ?1 AND person_id = ?2",
        params![key.session_id, key.person_id],
        map_entry,
    )
    .optional()
}

pub fn load_entry_view(conn: &Connection, key: &EntryKey) -> Result<Option<EntryView>> {
    let sql = format!("{ENTRY_VIEW_SELECT} WHERE e.session_id = ?1 AND e.person_id = ?2");
    conn.query_row(&sql, params![key.session_id, key.person_id], map_entry_view)
        .optional()
}

pub fn load_entry_views_for_session(conn: &Connection, session_id: i64) -> Result<Vec<EntryView>> {
    let sql = format!("{ENTRY_VIEW_SELECT} WHERE e.session_id = ?1 ORDER BY e.rowid ASC");
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map([session_id], map_entry_view)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_entry_views_for_event(conn: &Connection, event_id: i64) -> Result<Vec<EntryView>> {
    let sql = format!(
        "{ENTRY_VIEW_SELECT} WHERE s.event_id = ?1 ORDER BY s.id ASC, e.rowid ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map([event_id], map_entry_view)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Overwrite status and timestamp of an existing entry.
/// Returns the number of rows touched (0 when the key is unknown).
pub fn update_entry_status(
    conn: &Connection,
    key: &EntryKey,
    status: AttendanceStatus,
    at: &NaiveDateTime,
) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "UPDATE entries SET status = ?1, timestamp = ?2
         WHERE session_id = ?3 AND person_id = ?4",
    )?;
    stmt.execute(params![
        status.to_db_str(),
        format_ts(at),
        key.session_id,
        key.person_id
    ])
}

pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
}
