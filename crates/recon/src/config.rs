use serde::Deserialize;

use crate::error::ReconError;

/// Spreadsheet row limit; header rows must fall inside it.
const MAX_HEADER_ROW: usize = 1_048_575;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    /// Report metadata label; defaults to `name`.
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub station: String,
    pub overview: SourceConfig,
    #[serde(default)]
    pub statistics: Option<SourceConfig>,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub file: String,
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub header_row: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub file: String,
    #[serde(default)]
    pub sheet: Option<String>,
    /// The database keeps a title row above its header.
    #[serde(default = "default_database_header_row")]
    pub header_row: usize,
    /// Where the transcribed workbook goes; defaults to overwriting `file`.
    #[serde(default)]
    pub output: Option<String>,
}

fn default_database_header_row() -> usize {
    1
}

// ---------------------------------------------------------------------------
// Rules + Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_true")]
    pub require_action_holder: bool,
    #[serde(default = "default_assessment_values")]
    pub assessment_values: Vec<String>,
    #[serde(default = "default_handled_values")]
    pub handled_values: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            require_action_holder: true,
            assessment_values: default_assessment_values(),
            handled_values: default_handled_values(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_assessment_values() -> Vec<String> {
    vec!["Measures needed".into(), "Maatregelen nodig".into()]
}

fn default_handled_values() -> Vec<String> {
    vec!["Handled".into(), "Afgehandeld".into()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_output")]
    pub output: String,
    #[serde(default)]
    pub json: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_report_output(),
            json: None,
        }
    }
}

fn default_report_output() -> String {
    "report.xlsx".into()
}

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Row filters used by the ingestion passes.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOptions {
    /// Only count an active measure as overdue-track when it has a holder.
    pub require_action_holder: bool,
    /// `Maatregelen beoordeling` values that mean "measures needed".
    pub assessment_values: Vec<String>,
    /// `Status (2)` values that mean "handled".
    pub handled_values: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        RulesConfig::default().ingest_options()
    }
}

impl IngestOptions {
    pub fn is_measures_needed(&self, value: &str) -> bool {
        matches_any(&self.assessment_values, value)
    }

    pub fn is_handled(&self, value: &str) -> bool {
        matches_any(&self.handled_values, value)
    }
}

/// Trimmed, case-insensitive equality.
pub(crate) fn eq_label(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn matches_any(candidates: &[String], value: &str) -> bool {
    candidates.iter().any(|c| eq_label(c, value))
}

impl RulesConfig {
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            require_action_holder: self.require_action_holder,
            assessment_values: self.assessment_values.clone(),
            handled_values: self.handled_values.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        if self.overview.file.trim().is_empty() {
            return Err(ReconError::ConfigValidation("overview.file must not be empty".into()));
        }

        let mut header_rows = vec![("overview", self.overview.header_row)];
        if let Some(ref stats) = self.statistics {
            if stats.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "statistics.file must not be empty".into(),
                ));
            }
            header_rows.push(("statistics", stats.header_row));
        }
        if let Some(ref db) = self.database {
            if db.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation("database.file must not be empty".into()));
            }
            header_rows.push(("database", db.header_row));
        }
        for (section, row) in header_rows {
            if row > MAX_HEADER_ROW {
                return Err(ReconError::ConfigValidation(format!(
                    "{section}.header_row {row} is beyond the last spreadsheet row"
                )));
            }
        }

        if self.rules.assessment_values.is_empty() {
            return Err(ReconError::ConfigValidation(
                "rules.assessment_values must list at least one value".into(),
            ));
        }
        if self.rules.handled_values.is_empty() {
            return Err(ReconError::ConfigValidation(
                "rules.handled_values must list at least one value".into(),
            ));
        }

        Ok(())
    }

    /// Report metadata project label.
    pub fn project_label(&self) -> &str {
        self.project.as_deref().unwrap_or(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
