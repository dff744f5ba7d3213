// Flat report layout shared by the CSV and XLSX writers

use ledgermatch_recon::model::{Comparable, MismatchReport};
use ledgermatch_recon::ReconConfig;

/// One output cell. Numbers stay numbers so spreadsheets can sum them.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCell {
    Text(String),
    Number(f64),
}

impl From<&Comparable> for OutputCell {
    fn from(value: &Comparable) -> Self {
        match value {
            Comparable::Number(n) => Self::Number(*n),
            Comparable::Text(s) => Self::Text(s.clone()),
        }
    }
}

/// Column layout of the flat mismatch table:
/// `key, <left>_<col>, <right>_<col>, ..., mismatch`.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    columns: Vec<String>,
    headers: Vec<String>,
}

impl ReportLayout {
    pub fn from_config(config: &ReconConfig) -> Self {
        let columns = config.compare_names();

        let mut headers = Vec::with_capacity(columns.len() * 2 + 2);
        headers.push(config.output.key_header.clone());
        for col in &columns {
            headers.push(format!("{}_{}", config.left.label, col));
            headers.push(format!("{}_{}", config.right.label, col));
        }
        headers.push(config.output.mismatch_header.clone());

        Self { columns, headers }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row(&self, report: &MismatchReport) -> Vec<OutputCell> {
        let mut cells = Vec::with_capacity(self.headers.len());
        cells.push(OutputCell::Text(report.key.clone()));
        for col in &self.columns {
            match report.field(col) {
                Some(field) => {
                    cells.push(OutputCell::from(&field.left));
                    cells.push(OutputCell::from(&field.right));
                }
                None => {
                    cells.push(OutputCell::Text(String::new()));
                    cells.push(OutputCell::Text(String::new()));
                }
            }
        }
        cells.push(OutputCell::Text(report.mismatch_in()));
        cells
    }
}
