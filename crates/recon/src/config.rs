use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::coerce::ColumnKind;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Which columns to join on and compare. Defaults describe a bank statement
/// (`Narration`) against a ledger export (`Description`), compared on
/// `Credit`, `Debit` and `Balance`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "SideConfig::default_left")]
    pub left: SideConfig,
    #[serde(default = "SideConfig::default_right")]
    pub right: SideConfig,
    #[serde(default = "default_compare")]
    pub compare: Vec<CompareColumn>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            left: SideConfig::default_left(),
            right: SideConfig::default_right(),
            compare: default_compare(),
            output: OutputConfig::default(),
        }
    }
}

fn default_name() -> String {
    "default".into()
}

fn default_compare() -> Vec<CompareColumn> {
    ["Credit", "Debit", "Balance"]
        .into_iter()
        .map(CompareColumn::numeric)
        .collect()
}

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SideConfig {
    /// Prefix used for this side's columns in the output, e.g. `File1_Credit`.
    pub label: String,
    /// Key column name (after header trimming).
    pub key: String,
    /// Sheet to read from workbook inputs. First sheet when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
}

impl SideConfig {
    fn default_left() -> Self {
        Self {
            label: "File1".into(),
            key: "Narration".into(),
            sheet: None,
        }
    }

    fn default_right() -> Self {
        Self {
            label: "File2".into(),
            key: "Description".into(),
            sheet: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Compare columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompareColumn {
    pub column: String,
    #[serde(default)]
    pub kind: ColumnKind,
}

impl CompareColumn {
    pub fn numeric(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            kind: ColumnKind::Numeric,
        }
    }

    pub fn text(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            kind: ColumnKind::Text,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Header of the key column in the flat output.
    #[serde(default = "default_key_header")]
    pub key_header: String,
    #[serde(default = "default_mismatch_header")]
    pub mismatch_header: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            key_header: default_key_header(),
            mismatch_header: default_mismatch_header(),
        }
    }
}

fn default_key_header() -> String {
    "Description".into()
}

fn default_mismatch_header() -> String {
    "Mismatch In".into()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let mut config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.trim_names();
        config.validate()?;
        Ok(config)
    }

    /// Trim key and compare column names. Table headers are trimmed on load,
    /// so `key = " Narration "` must name the same column.
    pub fn trim_names(&mut self) {
        for side in [&mut self.left, &mut self.right] {
            side.key = side.key.trim().to_string();
        }
        for c in &mut self.compare {
            c.column = c.column.trim().to_string();
        }
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn compare_names(&self) -> Vec<String> {
        self.compare.iter().map(|c| c.column.clone()).collect()
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (side, cfg) in [("left", &self.left), ("right", &self.right)] {
            if cfg.key.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{side}.key must not be empty")));
            }
            if cfg.label.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{side}.label must not be empty")));
            }
        }

        if self.left.label == self.right.label {
            return Err(ReconError::ConfigValidation(format!(
                "left and right labels must differ, both are '{}'",
                self.left.label
            )));
        }

        if self.compare.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one compare column is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for c in &self.compare {
            if c.column.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "compare column names must not be empty".into(),
                ));
            }
            if !seen.insert(c.column.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "compare column '{}' listed more than once",
                    c.column
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
