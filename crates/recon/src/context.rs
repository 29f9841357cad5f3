use chrono::{Local, NaiveDate, NaiveDateTime};

/// Per-invocation inputs that are not part of the source data: the clock
/// and the labels stamped into outputs. Built by the caller and passed into
/// every engine call; the engine never reads the clock itself.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub today: NaiveDate,
    pub now: NaiveDateTime,
    /// Project label written into report metadata.
    pub project: String,
    /// Label written into the database `Station` column.
    pub station: String,
}

impl RunContext {
    pub fn new(now: NaiveDateTime, project: impl Into<String>, station: impl Into<String>) -> Self {
        Self {
            today: now.date(),
            now,
            project: project.into(),
            station: station.into(),
        }
    }

    /// Context stamped with the local wall clock.
    pub fn now_local(project: impl Into<String>, station: impl Into<String>) -> Self {
        Self::new(Local::now().naive_local(), project, station)
    }
}
