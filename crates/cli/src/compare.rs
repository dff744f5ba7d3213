//! `lmatch compare` and `lmatch validate`: load two tables, reconcile, report.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use ledgermatch_io::{load_table, LoadOptions, ReportLayout, TableFormat};
use ledgermatch_recon::config::{CompareColumn, SideConfig};
use ledgermatch_recon::model::{ReconResult, Table};
use ledgermatch_recon::{ColumnKind, ReconConfig};

use crate::exit_codes::{exit_code_for, EXIT_CONFIG, EXIT_MISMATCH, EXIT_OUTPUT, EXIT_USAGE};
use crate::CliError;

/// Duplicate keys listed in the human summary before truncating.
const MAX_LISTED_DUPLICATES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xlsx,
    Csv,
    Json,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Left input (bank statement side): .xlsx, .xls, .xlsb, .ods, .csv, .tsv
    pub left: PathBuf,

    /// Right input (ledger side)
    pub right: PathBuf,

    /// TOML config file (defaults apply when omitted)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Key column in the left input [default: Narration]
    #[arg(long)]
    pub left_key: Option<String>,

    /// Key column in the right input [default: Description]
    #[arg(long)]
    pub right_key: Option<String>,

    /// Columns to compare, comma-separated. Suffix `:text` to compare as text
    /// (e.g. `Credit,Debit,Status:text`) [default: Credit,Debit,Balance]
    #[arg(long, value_delimiter = ',')]
    pub compare: Vec<String>,

    /// Sheet to read from a left workbook (first sheet when unset)
    #[arg(long)]
    pub sheet_left: Option<String>,

    /// Sheet to read from a right workbook (first sheet when unset)
    #[arg(long)]
    pub sheet_right: Option<String>,

    /// Prefix for left columns in the output [default: File1]
    #[arg(long)]
    pub left_label: Option<String>,

    /// Prefix for right columns in the output [default: File2]
    #[arg(long)]
    pub right_label: Option<String>,

    /// Write the mismatch table to FILE
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Output file format (inferred from --out extension when omitted)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Print the full result as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Exit 1 when keys were skipped as duplicates, even without mismatches
    #[arg(long)]
    pub strict_duplicates: bool,

    /// Suppress the summary on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

fn engine_err(err: ledgermatch_recon::ReconError) -> CliError {
    CliError {
        code: exit_code_for(&err),
        message: err.to_string(),
        hint: None,
    }
}

pub fn cmd_compare(args: CompareArgs) -> Result<(), CliError> {
    let config = resolve_config(&args)?;

    let left = read_table(&args.left, config.left.sheet.as_deref())?;
    let right = read_table(&args.right, config.right.sheet.as_deref())?;

    let result = ledgermatch_recon::run(&config, &left, &right).map_err(|e| {
        let hint = match &e {
            ledgermatch_recon::ReconError::MissingColumn { .. } => {
                Some("set the key column with --left-key/--right-key or in the config".to_string())
            }
            _ => None,
        };
        CliError { hint, ..engine_err(e) }
    })?;

    if let Some(ref path) = args.out {
        write_output(path, args.format, &config, &result)?;
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if args.json {
        let json = ledgermatch_io::json::to_json(&result).map_err(engine_err)?;
        println!("{json}");
    }

    if !args.quiet {
        print_summary(&result);
    }

    let s = &result.summary;
    if s.mismatched > 0 {
        return Err(CliError::new(EXIT_MISMATCH, "mismatches found"));
    }
    if args.strict_duplicates && s.skipped_duplicates > 0 {
        return Err(CliError::new(
            EXIT_MISMATCH,
            "duplicate keys skipped (--strict-duplicates)",
        ));
    }
    Ok(())
}

/// Config file (or defaults) with command-line overrides applied, validated.
fn resolve_config(args: &CompareArgs) -> Result<ReconConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => ReconConfig::default(),
    };

    apply_side(&mut config.left, &args.left_key, &args.left_label, &args.sheet_left);
    apply_side(&mut config.right, &args.right_key, &args.right_label, &args.sheet_right);

    if !args.compare.is_empty() {
        config.compare = args
            .compare
            .iter()
            .map(|entry| parse_compare_entry(entry))
            .collect::<Result<_, _>>()?;
    }

    config.trim_names();
    config
        .validate()
        .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?;
    Ok(config)
}

fn apply_side(side: &mut SideConfig, key: &Option<String>, label: &Option<String>, sheet: &Option<String>) {
    if let Some(key) = key {
        side.key = key.clone();
    }
    if let Some(label) = label {
        side.label = label.clone();
    }
    if let Some(sheet) = sheet {
        side.sheet = Some(sheet.clone());
    }
}

/// Parse `NAME` or `NAME:numeric` / `NAME:text`.
fn parse_compare_entry(entry: &str) -> Result<CompareColumn, CliError> {
    let (name, kind) = match entry.rsplit_once(':') {
        Some((name, "numeric")) => (name, ColumnKind::Numeric),
        Some((name, "text")) => (name, ColumnKind::Text),
        _ => (entry, ColumnKind::Numeric),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::args(format!("invalid --compare entry: '{entry}'"))
            .with_hint("expected NAME, NAME:numeric or NAME:text"));
    }
    Ok(CompareColumn {
        column: name.to_string(),
        kind,
    })
}

fn read_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::args(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(|e| CliError::new(EXIT_CONFIG, format!("{}: {e}", path.display())))
}

fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table, CliError> {
    let format = TableFormat::from_path(path).ok_or_else(|| {
        CliError::args(format!("cannot infer input format: {}", path.display()))
            .with_hint("supported: .xlsx .xlsm .xls .xlsb .ods .csv .txt .tsv .tab")
    })?;
    let bytes = std::fs::read(path)
        .map_err(|e| CliError::args(format!("cannot read {}: {e}", path.display())))?;

    if sheet.is_some() && !format.is_workbook() {
        log::warn!("{}: --sheet ignored for delimited text input", path.display());
    }

    let options = LoadOptions {
        sheet: sheet.map(str::to_string),
    };
    load_table(&path.display().to_string(), &bytes, format, &options).map_err(engine_err)
}

fn write_output(
    path: &Path,
    format: Option<OutputFormat>,
    config: &ReconConfig,
    result: &ReconResult,
) -> Result<(), CliError> {
    let format = format
        .or_else(|| OutputFormat::from_path(path))
        .ok_or_else(|| {
            CliError::args(format!("cannot infer output format: {}", path.display()))
                .with_hint("use --format xlsx|csv|json or an .xlsx/.csv/.json extension")
        })?;

    let layout = ReportLayout::from_config(config);
    let bytes = match format {
        OutputFormat::Xlsx => ledgermatch_io::xlsx::export_reports(&layout, &result.reports),
        OutputFormat::Csv => ledgermatch_io::csv::export_reports(&layout, &result.reports),
        OutputFormat::Json => ledgermatch_io::json::to_json(result).map(String::into_bytes),
    }
    .map_err(engine_err)?;

    std::fs::write(path, bytes)
        .map_err(|e| CliError::new(EXIT_OUTPUT, format!("cannot write {}: {e}", path.display())))?;
    log::info!("wrote {} mismatch rows to {}", result.reports.len(), path.display());
    Ok(())
}

fn print_summary(result: &ReconResult) {
    let s = &result.summary;
    eprintln!(
        "{} common keys: {} matched, {} mismatched, {} skipped (duplicate keys)",
        s.common_keys, s.matched, s.mismatched, s.skipped_duplicates,
    );
    eprintln!(
        "unmatched: {} only in {}, {} only in {}",
        s.left_only, result.meta.left.label, s.right_only, result.meta.right.label,
    );

    for dup in s.duplicate_keys.iter().take(MAX_LISTED_DUPLICATES) {
        eprintln!(
            "  skipped '{}' ({} left, {} right)",
            dup.key, dup.left_count, dup.right_count
        );
    }
    if s.duplicate_keys.len() > MAX_LISTED_DUPLICATES {
        eprintln!("  ... and {} more", s.duplicate_keys.len() - MAX_LISTED_DUPLICATES);
    }
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!(
        "valid: '{}' joins {}.{} to {}.{} on {} column(s): {}",
        config.name,
        config.left.label,
        config.left.key,
        config.right.label,
        config.right.key,
        config.compare.len(),
        config.compare_names().join(", "),
    );
    Ok(())
}

pub fn cmd_init_config(output: Option<PathBuf>) -> Result<(), CliError> {
    let toml = ReconConfig::default()
        .to_toml()
        .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?;

    match output {
        Some(path) => {
            if path.exists() {
                return Err(CliError::new(EXIT_USAGE, format!("{} already exists", path.display()))
                    .with_hint("remove it or pick another --output path"));
            }
            std::fs::write(&path, toml)
                .map_err(|e| CliError::new(EXIT_OUTPUT, format!("cannot write {}: {e}", path.display())))?;
            eprintln!("wrote {}", path.display());
        }
        None => print!("{toml}"),
    }
    Ok(())
}
