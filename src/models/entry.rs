use super::person::Person;
use super::status::AttendanceStatus;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Identifies exactly one entry row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub session_id: i64,
    pub person_id: String,
}

impl EntryKey {
    pub fn new(session_id: i64, person_id: impl Into<String>) -> Self {
        Self {
            session_id,
            person_id: person_id.into(),
        }
    }
}

/// Attendance state of one person within one session.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Entry {
    pub session_id: i64,
    pub person_id: String,
    pub status: AttendanceStatus,
    /// `None` until the first status write.
    pub timestamp: Option<NaiveDateTime>,
}

impl Entry {
    pub fn timestamp_str(&self) -> String {
        self.timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

/// An entry joined with its person and owning session, as shown and exported.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntryView {
    pub entry: Entry,
    pub person: Person,
    pub session_name: String,
}
