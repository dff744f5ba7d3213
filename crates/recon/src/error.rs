use std::fmt;

/// Broad class of a [`ReconError`], used by callers to pick exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Schema,
    Config,
    Output,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// Input bytes could not be decoded into a table.
    Parse { table: String, message: String },
    /// A required column is missing after header normalization.
    MissingColumn { table: String, column: String },
    /// Two header cells trim to the same column name.
    DuplicateColumn { table: String, column: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty key name, duplicate compare column, etc.).
    ConfigValidation(String),
    /// Output sink failed to render the reports.
    Output(String),
}

impl ReconError {
    pub fn parse(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            table: table.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::Parse,
            Self::MissingColumn { .. } | Self::DuplicateColumn { .. } => ErrorKind::Schema,
            Self::ConfigParse(_) | Self::ConfigValidation(_) => ErrorKind::Config,
            Self::Output(_) => ErrorKind::Output,
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { table, message } => write!(f, "table '{table}': cannot parse input: {message}"),
            Self::MissingColumn { table, column } => {
                write!(f, "table '{table}': missing column '{column}'")
            }
            Self::DuplicateColumn { table, column } => {
                write!(f, "table '{table}': column '{column}' appears more than once after trimming")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Output(msg) => write!(f, "output error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
