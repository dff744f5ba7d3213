// Table loading and report export

pub mod csv;
pub mod json;
pub mod loader;
pub mod report;
pub mod xlsx;

pub use loader::{fingerprint, load_table, LoadOptions, TableFormat};
pub use report::{OutputCell, ReportLayout};
