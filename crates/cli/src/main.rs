//! `lmatch`: match two ledger tables on a key column and report the
//! rows whose amounts disagree.

mod compare;
mod exit_codes;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use compare::CompareArgs;
use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "lmatch")]
#[command(about = "Key-matched reconciliation of bank statements against ledgers")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). LMATCH_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile two tables and report mismatching rows
    #[command(after_help = "\
Examples:
  lmatch compare bank.xlsx ledger.xlsx --out matched_output.xlsx
  lmatch compare bank.csv ledger.csv --compare Credit,Debit --json
  lmatch compare bank.xlsx books.ods --config recon.toml --sheet-left April
  lmatch compare a.csv b.csv --left-key Ref --right-key Ref --strict-duplicates

Exit codes:
  0  no mismatches      4  missing or duplicate column
  1  mismatches found   5  invalid config
  2  usage error        6  output write failed
  3  parse error")]
    Compare(CompareArgs),

    /// Parse and validate a config file without running
    #[command(after_help = "\
Examples:
  lmatch validate recon.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },

    /// Print the default config as TOML (or write it to a file)
    #[command(after_help = "\
Examples:
  lmatch init-config > recon.toml
  lmatch init-config --output recon.toml")]
    InitConfig {
        /// Write to FILE instead of stdout (refuses to overwrite)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  ledgermatch-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Compare(args) => compare::cmd_compare(args),
        Commands::Validate { config } => compare::cmd_validate(config),
        Commands::InitConfig { output } => compare::cmd_init_config(output),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
