// src/export/excel_date.rs

use chrono::{NaiveDate, NaiveDateTime};

/// Excel number format used for attendance timestamps.
pub(crate) const TIMESTAMP_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Interpret an exported timestamp (`YYYY-MM-DD HH:MM:SS`) as an Excel serial.
/// Empty or unparsable strings yield `None` and are written as text.
pub(crate) fn timestamp_to_excel_serial(s: &str) -> Option<f64> {
    let dt = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()?;
    let excel_epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;

    let duration = dt - excel_epoch;

    let days = duration.num_days() as f64;
    let secs = (duration.num_seconds() - duration.num_days() * 86400) as f64;

    Some(days + secs / 86400.0)
}
