use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A single cell as read from an input table.
///
/// `Absent` is a real value, not a missing key: a blank spreadsheet cell is
/// `Absent`, and is distinct from `Number(0.0)` and `Text("")`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Absent,
}

impl CellValue {
    /// Build a text cell; empty strings become `Absent`.
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::Absent
        } else {
            Self::Text(s)
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
            Self::Absent => Ok(()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Absent => serializer.serialize_none(),
        }
    }
}

/// Render a number the way a spreadsheet shows it: integers without decimals.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// One data row of a [`Table`]. `row` is the 0-based data row index.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub row: usize,
    pub values: Vec<CellValue>,
}

/// An immutable, loaded table. Every record exposes every column.
#[derive(Debug, Clone)]
pub struct Table {
    label: String,
    fingerprint: Option<String>,
    columns: Vec<String>,
    positions: HashMap<String, usize>,
    records: Vec<Record>,
}

impl Table {
    /// Build a table from a header row and data rows.
    ///
    /// Column names are trimmed; two names that trim to the same string are
    /// rejected. Short rows are padded with `Absent`, long rows truncated.
    pub fn new(
        label: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, ReconError> {
        let label = label.into();
        let columns: Vec<String> = columns.into_iter().map(|c| c.trim().to_string()).collect();

        let mut positions = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            if positions.insert(name.clone(), idx).is_some() {
                return Err(ReconError::DuplicateColumn {
                    table: label,
                    column: name.clone(),
                });
            }
        }

        let width = columns.len();
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(row, mut values)| {
                values.resize(width, CellValue::Absent);
                Record { row, values }
            })
            .collect();

        Ok(Self {
            label,
            fingerprint: None,
            columns,
            positions,
            records,
        })
    }

    /// Attach a content fingerprint of the source bytes.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Position of a column the caller cannot work without.
    pub fn require_column(&self, name: &str) -> Result<usize, ReconError> {
        self.column_index(name).ok_or_else(|| ReconError::MissingColumn {
            table: self.label.clone(),
            column: name.to_string(),
        })
    }

    /// Value of `column` in data row `row`. `None` if either does not exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.records.get(row).and_then(|r| r.values.get(col))
    }
}

// ---------------------------------------------------------------------------
// Comparison output
// ---------------------------------------------------------------------------

/// A cell after coercion, ready for equality comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Comparable {
    Number(f64),
    Text(String),
}

impl fmt::Display for Comparable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Both sides' coerced values for one compare column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldComparison {
    pub column: String,
    pub left: Comparable,
    pub right: Comparable,
}

impl FieldComparison {
    pub fn is_match(&self) -> bool {
        self.left == self.right
    }
}

/// One matched key whose records disagree on at least one compare column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MismatchReport {
    pub key: String,
    /// Every compare column, in configured order, not just the mismatching ones.
    pub fields: Vec<FieldComparison>,
    /// Names of the disagreeing columns, in configured order.
    pub mismatched: Vec<String>,
}

impl MismatchReport {
    /// Mismatching column names joined for display, e.g. `"Credit, Balance"`.
    pub fn mismatch_in(&self) -> String {
        self.mismatched.join(", ")
    }

    pub fn field(&self, column: &str) -> Option<&FieldComparison> {
        self.fields.iter().find(|f| f.column == column)
    }
}

// ---------------------------------------------------------------------------
// Diagnostics + Output
// ---------------------------------------------------------------------------

/// A common key skipped because it is ambiguous on at least one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub key: String,
    pub left_count: usize,
    pub right_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconDiagnostics {
    pub left_rows: usize,
    pub right_rows: usize,
    pub left_keys: usize,
    pub right_keys: usize,
    pub common_keys: usize,
    /// Common keys resolved to exactly one record on each side.
    pub compared: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub skipped_duplicates: usize,
    pub left_only: usize,
    pub right_only: usize,
    pub duplicate_keys: Vec<DuplicateKey>,
}

/// Deterministic result of one reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconOutcome {
    pub reports: Vec<MismatchReport>,
    pub diagnostics: ReconDiagnostics,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    pub key_column: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub left: SourceInfo,
    pub right: SourceInfo,
    pub compare_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconDiagnostics,
    pub reports: Vec<MismatchReport>,
}
