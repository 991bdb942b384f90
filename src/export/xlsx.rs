// src/export/xlsx.rs

use crate::errors::{AppError, AppResult};
use crate::export::excel_date::{TIMESTAMP_NUM_FORMAT, timestamp_to_excel_serial};
use crate::export::model::{get_headers, to_cells};
use crate::export::{AttendanceExport, ReportHeader, notify_export_success};
use crate::ui::messages::info;
use rust_xlsxwriter::{Color, Format, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

/// Row of the column headers; rows above hold the report title block.
const HEADER_ROW: u32 = 4;
const MAX_COL_WIDTH: usize = 50;
const TIMESTAMP_COL: usize = 6;

/// XLSX export with a title block, styled header, banded rows and
/// auto-sized columns.
pub(crate) fn export_xlsx(
    header: &ReportHeader,
    rows: &[AttendanceExport],
    path: &Path,
) -> AppResult<()> {
    info(format!("Exporting to XLSX: {}", path.display()));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Attendance Data").map_err(to_export_error)?;

    // ---------------------------
    // Title block
    // ---------------------------
    let title_format = Format::new().set_bold().set_font_size(14);
    worksheet
        .write_with_format(0, 0, header.title.as_str(), &title_format)
        .map_err(to_export_error)?;
    worksheet
        .write(1, 0, format!("Generated on: {}", header.generated_on))
        .map_err(to_export_error)?;
    worksheet
        .write(2, 0, format!("Total People: {}", rows.len()))
        .map_err(to_export_error)?;

    // ---------------------------
    // Header
    // ---------------------------
    let headers = get_headers();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, title) in headers.iter().enumerate() {
        worksheet
            .write_with_format(HEADER_ROW, col as u16, *title, &header_format)
            .map_err(to_export_error)?;
    }

    worksheet.set_freeze_panes(HEADER_ROW + 1, 0).ok();

    let mut col_widths: Vec<usize> = headers.iter().map(|h| UnicodeWidthStr::width(*h)).collect();

    let band1 = Color::RGB(0xEAF3FB);
    let band2 = Color::RGB(0xFFFFFF);

    // ---------------------------
    // Rows
    // ---------------------------
    for (row_index, entry) in rows.iter().enumerate() {
        let row = HEADER_ROW + 1 + row_index as u32;
        let band_color = if row_index % 2 == 0 { band1 } else { band2 };

        for (col, value) in to_cells(entry).into_iter().enumerate() {
            write_xlsx_cell(worksheet, row, col, value, band_color)?;
            col_widths[col] = col_widths[col].max(UnicodeWidthStr::width(value));
        }
    }

    for (c, w) in col_widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, (*w).min(MAX_COL_WIDTH) as f64 + 2.0)
            .map_err(to_export_error)?;
    }

    workbook.save(path).map_err(to_export_error)?;

    notify_export_success("XLSX", path);
    Ok(())
}

/// Timestamps become Excel date cells; everything else (ids included) stays text.
fn write_xlsx_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: usize,
    s: &str,
    bg: Color,
) -> AppResult<()> {
    let base = Format::new()
        .set_background_color(bg)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    if col == TIMESTAMP_COL
        && let Some(serial) = timestamp_to_excel_serial(s)
    {
        let fmt = base.set_num_format(TIMESTAMP_NUM_FORMAT);
        worksheet
            .write_with_format(row, col as u16, serial, &fmt)
            .map_err(to_export_error)?;
        return Ok(());
    }

    worksheet
        .write_with_format(row, col as u16, s, &base)
        .map_err(to_export_error)?;

    Ok(())
}

fn to_export_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(e.to_string())
}
