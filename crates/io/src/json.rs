// JSON export

use serde::Serialize;

use ledgermatch_recon::error::ReconError;

/// Serialize any result value as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, ReconError> {
    serde_json::to_string_pretty(value).map_err(|e| ReconError::Output(format!("json: {e}")))
}
