// src/export/model.rs

use crate::models::entry::EntryView;
use serde::Serialize;

/// Flat row used by every export format.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AttendanceExport {
    pub person_id: String,
    pub name: String,
    pub cohort: String,
    pub group: String,
    pub session: String,
    pub status: String,
    pub timestamp: String,
}

impl From<&EntryView> for AttendanceExport {
    fn from(v: &EntryView) -> Self {
        Self {
            person_id: v.person.id.clone(),
            name: v.person.name.clone(),
            cohort: v.person.cohort.clone(),
            group: v.person.group.clone(),
            session: v.session_name.clone(),
            status: v.entry.status.to_db_str().to_string(),
            timestamp: v.entry.timestamp_str(),
        }
    }
}

/// Column headers, in the order of `to_cells`.
pub(crate) fn get_headers() -> Vec<&'static str> {
    vec![
        "ID",
        "Name",
        "Cohort",
        "Group",
        "Session",
        "Status",
        "Timestamp",
    ]
}

pub(crate) fn to_cells(r: &AttendanceExport) -> Vec<&str> {
    vec![
        r.person_id.as_str(),
        r.name.as_str(),
        r.cohort.as_str(),
        r.group.as_str(),
        r.session.as_str(),
        r.status.as_str(),
        r.timestamp.as_str(),
    ]
}
