use std::path::PathBuf;

use devtrack_recon::ReconError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    /// The file could not be opened or read at all.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The bytes were read but are not a spreadsheet we understand.
    #[error("{context}: {message}")]
    Unreadable { context: String, message: String },
    #[error("cannot write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },
}

impl IoError {
    pub(crate) fn unreadable(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Unreadable {
            context: context.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn write(path: &std::path::Path, message: impl ToString) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// Input failures surface to the engine as an unreadable source.
impl From<IoError> for ReconError {
    fn from(err: IoError) -> Self {
        ReconError::UnreadableSource(err.to_string())
    }
}
