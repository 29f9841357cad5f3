// File I/O operations

pub mod csv;
pub mod error;
pub mod json;
pub mod output;
pub mod xlsx;

use std::path::Path;

use devtrack_engine::Workbook;

pub use error::IoError;
pub use output::StagedOutputs;

/// Extensions read as delimited text; everything else goes through calamine.
const TEXT_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Load a workbook, picking the reader from the file extension.
pub fn load(path: &Path) -> Result<Workbook, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        csv::import(path)
    } else {
        xlsx::import(path)
    }
}
