// Excel / ODS import (calamine) and mismatch report export (rust_xlsxwriter)

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, XlsxError};

use ledgermatch_recon::error::ReconError;
use ledgermatch_recon::model::{CellValue, MismatchReport};

use crate::report::{OutputCell, ReportLayout};

/// Name of the worksheet written by [`export_reports`].
pub const REPORT_SHEET: &str = "Mismatches";

/// Read one sheet of a workbook (xlsx, xlsm, xls, xlsb, ods) into raw rows,
/// header row included. The first sheet is used when `sheet` is `None`.
pub fn read_rows(label: &str, bytes: &[u8], sheet: Option<&str>) -> Result<Vec<Vec<CellValue>>, ReconError> {
    let mut workbook: Sheets<_> = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ReconError::parse(label, format!("failed to open workbook: {e}")))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => sheet_names.iter().find(|s| s.as_str() == name).cloned().ok_or_else(|| {
            ReconError::parse(
                label,
                format!("sheet '{name}' not found (available: {})", sheet_names.join(", ")),
            )
        })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ReconError::parse(label, "workbook contains no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ReconError::parse(label, format!("failed to read sheet '{sheet_name}': {e}")))?;

    log::debug!(
        "{label}: reading sheet '{sheet_name}' ({} rows x {} cols)",
        range.height(),
        range.width()
    );

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect())
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Absent,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        // Store as TRUE/FALSE text, the way spreadsheets display them
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // Spreadsheet error text, e.g. `#DIV/0!`
        Data::Error(e) => CellValue::Text(e.to_string()),
        // Dates compare by serial number
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.as_str()),
    }
}

/// Export mismatch reports as an xlsx workbook with a single sheet.
pub fn export_reports(layout: &ReportLayout, reports: &[MismatchReport]) -> Result<Vec<u8>, ReconError> {
    build_workbook(layout, reports).map_err(|e| ReconError::Output(format!("xlsx: {e}")))
}

fn build_workbook(layout: &ReportLayout, reports: &[MismatchReport]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(REPORT_SHEET)?;

    for (col, header) in layout.headers().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }
    worksheet.set_freeze_panes(1, 0)?;
    worksheet.set_column_width(0, 40)?;

    for (i, report) in reports.iter().enumerate() {
        // rust_xlsxwriter uses 0-based row/col as u32/u16
        let row = (i + 1) as u32;
        for (col, cell) in layout.row(report).iter().enumerate() {
            let col = col as u16;
            match cell {
                OutputCell::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                OutputCell::Number(n) => {
                    worksheet.write_number(row, col, *n)?;
                }
            }
        }
    }

    workbook.save_to_buffer()
}
