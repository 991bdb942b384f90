use chrono::NaiveDateTime;
use serde::Serialize;

/// One attendance-taking occasion under an event (a "record").
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Session {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    pub created_at: NaiveDateTime,
}
