// src/export/logic.rs

use crate::core::filter::filter_entries;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::AttendanceExport;
use crate::export::xlsx::export_xlsx;
use crate::export::{ExportFormat, ReportHeader};
use crate::models::context::ViewContext;
use crate::models::status::StatusFilter;
use crate::ui::messages::warning;
use chrono::Local;
use std::path::Path;
use tracing::info;

/// High-level export logic.
pub struct ExportLogic;

impl ExportLogic {
    /// Load the entries of `ctx`, apply the search/status projection and
    /// collect them as flat export rows (input order preserved).
    pub fn collect_rows(
        pool: &DbPool,
        ctx: &ViewContext,
        search: &str,
        status: StatusFilter,
    ) -> AppResult<Vec<AttendanceExport>> {
        let entries = ctx.load_entries(pool)?;
        Ok(filter_entries(&entries, search, status)
            .map(AttendanceExport::from)
            .collect())
    }

    /// Export the attendance of `ctx` to `file`.
    ///
    /// - `file` must be an absolute path
    /// - existing files need `force` or an interactive confirmation
    /// - an empty projection only prints a warning, no file is written
    ///
    /// Returns the number of rows written.
    pub fn export(
        pool: &DbPool,
        ctx: &ViewContext,
        format: ExportFormat,
        file: &str,
        search: &str,
        status: StatusFilter,
        force: bool,
    ) -> AppResult<usize> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "output file path must be absolute: {file}"
            )));
        }

        let label = ctx.label(pool)?;
        let rows = Self::collect_rows(pool, ctx, search, status)?;

        if rows.is_empty() {
            warning("No attendance data to export.");
            return Ok(0);
        }

        ensure_writable(path, force)?;

        let header = ReportHeader {
            title: format!("Attendance Report - {label}"),
            generated_on: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        match format {
            ExportFormat::Csv => export_csv(&rows, path)?,
            ExportFormat::Json => export_json(&header, &rows, path)?,
            ExportFormat::Xlsx => export_xlsx(&header, &rows, path)?,
        }

        info!(
            format = format.as_str(),
            %status,
            rows = rows.len(),
            path = %path.display(),
            "export written"
        );
        Ok(rows.len())
    }
}
