// JSON export

use std::path::Path;

use devtrack_recon::StatisticsReport;

use crate::error::IoError;

/// The statistics (summary, disciplines and records) as pretty JSON.
/// `path` only labels errors.
pub fn render_statistics(report: &StatisticsReport, path: &Path) -> Result<Vec<u8>, IoError> {
    serde_json::to_vec_pretty(report).map_err(|e| IoError::write(path, e))
}
