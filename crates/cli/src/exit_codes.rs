//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | General error (unspecified)                               |
//! | 2    | CLI usage error (bad args, missing config, unknown sheet) |
//! | 3    | Required columns missing from a header row                |
//! | 4    | Header row present but no data rows below it              |
//! | 5    | Input file missing or not a readable spreadsheet          |
//! | 6    | Config failed to parse or validate                        |
//! | 7    | An output file could not be written                       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the mapping functions below

use devtrack_io::IoError;
use devtrack_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable config path, unknown sheet.
pub const EXIT_USAGE: u8 = 2;

/// A required column label is absent from the header row.
pub const EXIT_MISSING_COLUMNS: u8 = 3;

/// The table has a header but no non-blank data rows.
pub const EXIT_EMPTY_INPUT: u8 = 4;

/// Input could not be opened or decoded as a spreadsheet.
pub const EXIT_UNREADABLE: u8 = 5;

/// TOML syntax error or failed config validation.
pub const EXIT_INVALID_CONFIG: u8 = 6;

/// Report, database or JSON output could not be written.
pub const EXIT_WRITE: u8 = 7;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::MissingColumns { .. } => EXIT_MISSING_COLUMNS,
        ReconError::EmptyInput { .. } => EXIT_EMPTY_INPUT,
        ReconError::UnreadableSource(_) => EXIT_UNREADABLE,
        ReconError::SheetNotFound { .. } => EXIT_USAGE,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
    }
}

/// Map an I/O error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Read { .. } | IoError::Unreadable { .. } => EXIT_UNREADABLE,
        IoError::Write { .. } => EXIT_WRITE,
    }
}
