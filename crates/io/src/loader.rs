// Table loading: raw bytes in, typed Table out

use std::path::Path;

use sha2::{Digest, Sha256};

use ledgermatch_recon::error::ReconError;
use ledgermatch_recon::model::{CellValue, Table};

/// Recognized input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Xlsx,
    Xls,
    Xlsb,
    Ods,
    Csv,
    Tsv,
}

impl TableFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "xlsb" => Some(Self::Xlsb),
            "ods" => Some(Self::Ods),
            "csv" | "txt" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            _ => None,
        }
    }

    pub fn is_workbook(&self) -> bool {
        matches!(self, Self::Xlsx | Self::Xls | Self::Xlsb | Self::Ods)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Sheet to read from a workbook. First sheet when unset. Ignored for CSV/TSV.
    pub sheet: Option<String>,
}

/// Decode `bytes` into a [`Table`] labelled `label`.
///
/// The first row of the sheet names the columns (trimmed; blank header cells
/// become `Column<N>`). Fully empty data rows are dropped. The table carries
/// the SHA-256 of `bytes` as its fingerprint.
pub fn load_table(
    label: &str,
    bytes: &[u8],
    format: TableFormat,
    options: &LoadOptions,
) -> Result<Table, ReconError> {
    let raw_rows = match format {
        TableFormat::Csv => crate::csv::read_rows(label, bytes, None)?,
        TableFormat::Tsv => crate::csv::read_rows(label, bytes, Some(b'\t'))?,
        _ => crate::xlsx::read_rows(label, bytes, options.sheet.as_deref())?,
    };

    let mut rows = raw_rows.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| ReconError::parse(label, "input has no header row"))?;

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell.to_string().trim() {
            "" => format!("Column{}", i + 1),
            name => name.to_string(),
        })
        .collect();

    let data: Vec<Vec<CellValue>> = rows.filter(|row| !is_blank_row(row)).collect();

    log::info!("{label}: loaded {} rows, {} columns", data.len(), columns.len());

    Ok(Table::new(label, columns, data)?.with_fingerprint(fingerprint(bytes)))
}

/// Lowercase hex SHA-256 of the input bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn is_blank_row(row: &[CellValue]) -> bool {
    row.iter().all(|cell| match cell {
        CellValue::Absent => true,
        CellValue::Text(s) => s.trim().is_empty(),
        CellValue::Number(_) => false,
    })
}
