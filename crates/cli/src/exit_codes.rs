//! CLI Exit Code Registry
//!
//! Single source of truth for `lmatch` exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success, no mismatches                             |
//! | 1    | Mismatches found (or skipped duplicates, strict)   |
//! | 2    | CLI usage error (bad args, unreadable input file)  |
//! | 3    | Input could not be parsed                          |
//! | 4    | Schema error (missing or duplicate column)         |
//! | 5    | Invalid config                                     |
//! | 6    | Output could not be written                        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `exit_code_for` or the command's error handling

use ledgermatch_recon::{ErrorKind, ReconError};

/// Success - reconciliation ran and every common key matched.
pub const EXIT_SUCCESS: u8 = 0;

/// Mismatches found. Like `diff(1)`, exit 1 means "inputs differ."
pub const EXIT_MISMATCH: u8 = 1;

/// Usage error - bad arguments, unknown file type, unreadable file.
pub const EXIT_USAGE: u8 = 2;

/// An input file is not valid CSV/TSV/workbook data.
pub const EXIT_PARSE: u8 = 3;

/// Key or compare column missing, or a header names a column twice.
pub const EXIT_SCHEMA: u8 = 4;

/// Config file failed to parse or validate.
pub const EXIT_CONFIG: u8 = 5;

/// Output file could not be encoded or written.
pub const EXIT_OUTPUT: u8 = 6;

/// Map an engine error to its exit code.
pub fn exit_code_for(err: &ReconError) -> u8 {
    match err.kind() {
        ErrorKind::Parse => EXIT_PARSE,
        ErrorKind::Schema => EXIT_SCHEMA,
        ErrorKind::Config => EXIT_CONFIG,
        ErrorKind::Output => EXIT_OUTPUT,
    }
}
