use chrono::NaiveDate;
use serde::Serialize;

/// A scheduled occasion attendance is taken for. Immutable once created.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate, // ⇔ events.date (TEXT "YYYY-MM-DD")
}

impl Event {
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
