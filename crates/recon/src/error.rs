use std::fmt;

use thiserror::Error;

/// Which ingestion pass raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPass {
    Overview,
    Statistics,
    Transcription,
}

impl fmt::Display for IngestPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overview => write!(f, "overview ingestion"),
            Self::Statistics => write!(f, "statistics ingestion"),
            Self::Transcription => write!(f, "transcription"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReconError {
    /// Required labels absent from the header row. Nothing is ingested.
    #[error("{pass}: missing columns: {}", columns.join(", "))]
    MissingColumns { pass: IngestPass, columns: Vec<String> },
    /// Header present but no non-blank data rows below it.
    #[error("{pass}: no data rows")]
    EmptyInput { pass: IngestPass },
    /// Byte stream could not be read as a spreadsheet.
    #[error("unreadable source: {0}")]
    UnreadableSource(String),
    #[error("sheet not found: '{sheet}'")]
    SheetNotFound { sheet: String },
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("config validation error: {0}")]
    ConfigValidation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_pass() {
        let err = ReconError::MissingColumns {
            pass: IngestPass::Overview,
            columns: vec!["Titel".into(), "Actiehouder".into()],
        };
        assert_eq!(err.to_string(), "overview ingestion: missing columns: Titel, Actiehouder");

        let err = ReconError::EmptyInput { pass: IngestPass::Statistics };
        assert_eq!(err.to_string(), "statistics ingestion: no data rows");
    }
}
