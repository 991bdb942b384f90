//! Attendance state machine.
//!
//! States are flat: any status may follow any status, including itself.
//! Every write stamps the entry with the time of the write, so a repeated
//! status refreshes the timestamp to the most recent observation.

use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries::{load_entry, update_entry_status};
use crate::errors::{AppError, AppResult};
use crate::models::entry::{Entry, EntryKey};
use crate::models::status::AttendanceStatus;
use chrono::{Local, NaiveDateTime};
use tracing::debug;

pub struct AttendanceLogic;

impl AttendanceLogic {
    /// Set the status of an existing entry, stamped with the current local time.
    ///
    /// This is the single write path for entries: manual overrides and the
    /// scan pipeline both come through here.
    pub fn set_status(pool: &DbPool, key: &EntryKey, status: AttendanceStatus) -> AppResult<Entry> {
        Self::set_status_at(pool, key, status, Local::now().naive_local())
    }

    /// Same as [`set_status`](Self::set_status) with an explicit timestamp.
    pub fn set_status_at(
        pool: &DbPool,
        key: &EntryKey,
        status: AttendanceStatus,
        at: NaiveDateTime,
    ) -> AppResult<Entry> {
        let touched = update_entry_status(&pool.conn, key, status, &at)?;
        if touched == 0 {
            return Err(AppError::EntryNotFound {
                session_id: key.session_id,
                person_id: key.person_id.clone(),
            });
        }

        debug!(
            session_id = key.session_id,
            person_id = %key.person_id,
            %status,
            "status set"
        );
        audit(
            &pool.conn,
            "status",
            &format!("{}/{}", key.session_id, key.person_id),
            status.to_db_str(),
        );

        load_entry(&pool.conn, key)?.ok_or_else(|| AppError::EntryNotFound {
            session_id: key.session_id,
            person_id: key.person_id.clone(),
        })
    }
}
