//! `ledgermatch-recon`: key-matched two-table reconciliation engine.
//!
//! Pure engine crate: receives loaded tables, returns mismatch reports.
//! No CLI or IO dependencies.

pub mod coerce;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod key;
pub mod model;

pub use coerce::{coerce, ColumnKind};
pub use config::{CompareColumn, ReconConfig};
pub use engine::{reconcile, reconcile_tables, run};
pub use error::{ErrorKind, ReconError};
pub use index::{KeyIndex, Resolution};
pub use key::normalize_key;
pub use model::{CellValue, MismatchReport, ReconOutcome, ReconResult, Table};
