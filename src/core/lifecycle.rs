//! Events, sessions and the roster snapshot taken when a session is created.

use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries::{
    insert_absent_entry, insert_event, insert_session, load_entry_views_for_event,
    load_entry_views_for_session, load_event, load_events, load_persons, load_session,
    load_sessions_for_event,
};
use crate::errors::{AppError, AppResult};
use crate::models::entry::EntryView;
use crate::models::event::Event;
use crate::models::session::Session;
use chrono::Local;
use tracing::{info, warn};

pub struct LifecycleLogic;

fn required_name<'a>(what: &str, name: &'a str) -> AppResult<&'a str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{what} name must not be empty")));
    }
    Ok(trimmed)
}

impl LifecycleLogic {
    /// Create an event dated today.
    pub fn create_event(pool: &DbPool, name: &str) -> AppResult<Event> {
        let name = required_name("event", name)?;
        let now = Local::now();
        let date = now.date_naive();

        let id = insert_event(&pool.conn, name, &date, &now.to_rfc3339())?;
        info!(event_id = id, name, "event created");
        audit(&pool.conn, "event_create", &id.to_string(), name);

        Ok(Event {
            id,
            name: name.to_string(),
            date,
        })
    }

    pub fn list_events(pool: &DbPool) -> AppResult<Vec<Event>> {
        Ok(load_events(&pool.conn)?)
    }

    pub fn get_event(pool: &DbPool, event_id: i64) -> AppResult<Event> {
        load_event(&pool.conn, event_id)?.ok_or(AppError::EventNotFound(event_id))
    }

    pub fn get_session(pool: &DbPool, session_id: i64) -> AppResult<Session> {
        load_session(&pool.conn, session_id)?.ok_or(AppError::SessionNotFound(session_id))
    }

    /// Create a session under `event_id` and snapshot the roster into it.
    ///
    /// The session row and one `Absent` entry per current roster member are
    /// written in a single transaction: either all of them become visible or
    /// none does. People added to the roster later are never back-filled.
    pub fn create_session(pool: &mut DbPool, event_id: i64, name: &str) -> AppResult<Session> {
        let name = required_name("session", name)?;
        // fail fast, before opening the transaction
        Self::get_event(pool, event_id)?;

        let created_at = Local::now().naive_local();

        let tx = pool.conn.transaction()?;

        let session_id = insert_session(&tx, event_id, name, &created_at)?;
        let roster = load_persons(&tx)?;
        for person in &roster {
            if let Err(e) = insert_absent_entry(&tx, session_id, &person.id) {
                warn!(
                    session_id,
                    person_id = %person.id,
                    error = %e,
                    "snapshot insert failed, rolling back"
                );
                // dropping `tx` rolls everything back
                return Err(e.into());
            }
        }

        tx.commit()?;

        info!(session_id, event_id, entries = roster.len(), "session created");
        audit(
            &pool.conn,
            "session_create",
            &session_id.to_string(),
            &format!("{name} (event {event_id}, {} people)", roster.len()),
        );

        Ok(Session {
            id: session_id,
            event_id,
            name: name.to_string(),
            created_at,
        })
    }

    /// Sessions of an event; empty when the event has none (or does not exist).
    pub fn list_sessions_for_event(pool: &DbPool, event_id: i64) -> AppResult<Vec<Session>> {
        Ok(load_sessions_for_event(&pool.conn, event_id)?)
    }

    /// Entries of one session in snapshot order.
    pub fn list_entries_for_session(pool: &DbPool, session_id: i64) -> AppResult<Vec<EntryView>> {
        Ok(load_entry_views_for_session(&pool.conn, session_id)?)
    }

    /// Entries of every session of an event, session by session.
    pub fn list_entries_for_event(pool: &DbPool, event_id: i64) -> AppResult<Vec<EntryView>> {
        Ok(load_entry_views_for_event(&pool.conn, event_id)?)
    }
}
