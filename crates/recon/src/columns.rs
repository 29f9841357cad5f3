//! Semantic column labels. Matching is trim + case-insensitive.

pub const CODE: &str = "Code";
pub const TITLE: &str = "Titel";
pub const MEASURE_CODE: &str = "Code (2)";
pub const MEASURE: &str = "Maatregel";
pub const MEASURE_STATUS: &str = "Status (2)";
pub const STATUS: &str = "Status";
pub const ACTION_HOLDER: &str = "Actiehouder";
pub const AUTHOR: &str = "Opsteller";
pub const PLANNED_DATE: &str = "Geplande datum klaar";

pub const ASSESSMENT: &str = "Maatregelen beoordeling";
pub const DONE_DATE: &str = "Datum klaar";
pub const CAUSING_DISCIPLINE: &str = "Veroorzakende Discipline";

/// Synthetic database columns filled by transcription.
pub const EXPORT_TIMESTAMP: &str = "Date export";
pub const STATION: &str = "Station";

/// Deviation status values.
pub const STATUS_ACTIVE: &str = "Vigerend";
pub const STATUS_CONCEPT: &str = "Concept";

pub const OVERVIEW_COLUMNS: &[&str] = &[
    CODE,
    TITLE,
    MEASURE_CODE,
    MEASURE,
    MEASURE_STATUS,
    STATUS,
    ACTION_HOLDER,
    AUTHOR,
    PLANNED_DATE,
];

pub const STATISTICS_COLUMNS: &[&str] = &[
    CODE,
    TITLE,
    MEASURE_CODE,
    MEASURE,
    MEASURE_STATUS,
    STATUS,
    ACTION_HOLDER,
    AUTHOR,
    PLANNED_DATE,
    ASSESSMENT,
    DONE_DATE,
    CAUSING_DISCIPLINE,
];
