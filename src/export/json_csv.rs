// src/export/json_csv.rs

use crate::errors::{AppError, AppResult};
use crate::export::model::{get_headers, to_cells};
use crate::export::{AttendanceExport, ReportHeader, notify_export_success};
use crate::ui::messages::info;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    generated_on: &'a str,
    total: usize,
    rows: &'a [AttendanceExport],
}

/// Export JSON pretty-printed, with the report header as metadata.
pub(crate) fn export_json(
    header: &ReportHeader,
    rows: &[AttendanceExport],
    path: &Path,
) -> AppResult<()> {
    info(format!("Exporting to JSON: {}", path.display()));

    let report = JsonReport {
        title: &header.title,
        generated_on: &header.generated_on,
        total: rows.len(),
        rows,
    };

    let json_data = serde_json::to_string_pretty(&report)
        .map_err(|e| AppError::Export(format!("JSON serialization error: {e}")))?;

    let mut file = File::create(path)?;
    file.write_all(json_data.as_bytes())?;

    notify_export_success("JSON", path);
    Ok(())
}

/// Export CSV: one header line, then one line per entry.
pub(crate) fn export_csv(rows: &[AttendanceExport], path: &Path) -> AppResult<()> {
    info(format!("Exporting to CSV: {}", path.display()));

    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(get_headers())?;
    for row in rows {
        wtr.write_record(to_cells(row))?;
    }

    wtr.flush()?;

    notify_export_success("CSV", path);
    Ok(())
}
