use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Classification outcomes
// ---------------------------------------------------------------------------

/// Deadline status of an active measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Remark {
    Overdue,
    DueSoon,
    NoActionNeeded,
    NoDate,
}

impl Remark {
    /// Display label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overdue => "Verlopen",
            Self::DueSoon => "Verloopt binnen 31 dagen",
            Self::NoActionNeeded => "Geen actie nodig",
            Self::NoDate => "Geen datum",
        }
    }
}

impl fmt::Display for Remark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overdue => write!(f, "overdue"),
            Self::DueSoon => write!(f, "due_soon"),
            Self::NoActionNeeded => write!(f, "no_action_needed"),
            Self::NoDate => write!(f, "no_date"),
        }
    }
}

/// Completion bucket of a handled measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    OnTime,
    Late,
    MissingDates,
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnTime => write!(f, "on_time"),
            Self::Late => write!(f, "late"),
            Self::MissingDates => write!(f, "missing_dates"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficLight {
    Red,
    Orange,
    Green,
}

impl fmt::Display for TrafficLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Orange => write!(f, "orange"),
            Self::Green => write!(f, "green"),
        }
    }
}

// ---------------------------------------------------------------------------
// Overview records
// ---------------------------------------------------------------------------

/// Active measure on the overdue track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationRecord {
    pub code: String,
    pub title: String,
    pub measure_code: String,
    pub measure: String,
    pub status: String,
    pub measure_status: String,
    pub action_holder: String,
    pub planned_date: Option<NaiveDate>,
    pub remark: Remark,
}

/// Deviation still in draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptRecord {
    pub code: String,
    pub title: String,
    pub status: String,
    pub author: String,
    pub planned_date: Option<NaiveDate>,
}

/// Result of one overview ingestion pass. Records are sorted by code.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverviewIngest {
    pub deviations: Vec<DeviationRecord>,
    pub concepts: Vec<ConceptRecord>,
    pub action_holders: BTreeSet<String>,
    /// Rows whose planned date was present but unparsable.
    pub unparsable_dates: usize,
}

impl OverviewIngest {
    pub fn count(&self, remark: Remark) -> usize {
        self.deviations.iter().filter(|d| d.remark == remark).count()
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Handled measure, bucketed by completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsRecord {
    pub code: String,
    pub title: String,
    pub measure: String,
    pub action_holder: String,
    pub planned_date: Option<NaiveDate>,
    pub done_date: Option<NaiveDate>,
    pub completion: Completion,
    /// Only set for `Late`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_late: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discipline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub total_filtered: usize,
    pub valid_dates: usize,
    pub on_time_count: usize,
    pub overdue_count: usize,
    pub missing_dates: usize,
    pub on_time_percent: f64,
    pub overdue_percent: f64,
    pub traffic_light: TrafficLight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisciplineStat {
    pub discipline: String,
    pub total_late_days: i64,
    pub occurrences: usize,
    pub average_late_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub summary: SummaryStatistics,
    /// Sorted by average lateness, highest first.
    pub disciplines: Vec<DisciplineStat>,
    pub records: Vec<StatisticsRecord>,
}

impl StatisticsReport {
    pub fn records_in(&self, completion: Completion) -> impl Iterator<Item = &StatisticsRecord> {
        self.records.iter().filter(move |r| r.completion == completion)
    }
}
