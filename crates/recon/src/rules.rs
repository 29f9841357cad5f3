//! Date rules. Total functions: every input maps to exactly one outcome.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::model::{Completion, Remark};

/// Measures due within this many days of the run are flagged `DueSoon`.
pub const DUE_SOON_WINDOW_DAYS: i64 = 31;

/// Deadline status of a planned date relative to the run timestamp.
///
/// A planned date means midnight at the start of that day, so a measure due
/// today is already overdue once the day has begun.
pub fn classify_deadline(planned: Option<NaiveDate>, now: NaiveDateTime) -> Remark {
    let Some(planned) = planned else {
        return Remark::NoDate;
    };
    let due = planned.and_time(NaiveTime::MIN);
    if due < now {
        Remark::Overdue
    } else if due <= now + Duration::days(DUE_SOON_WINDOW_DAYS) {
        Remark::DueSoon
    } else {
        Remark::NoActionNeeded
    }
}

/// Completion bucket. Finishing on the planned date counts as on time.
pub fn classify_completion(planned: Option<NaiveDate>, done: Option<NaiveDate>) -> Completion {
    match (planned, done) {
        (Some(planned), Some(done)) if done > planned => Completion::Late,
        (Some(_), Some(_)) => Completion::OnTime,
        _ => Completion::MissingDates,
    }
}

/// Whole days between planned and done (negative when early).
pub fn days_late(planned: NaiveDate, done: NaiveDate) -> i64 {
    (done - planned).num_days()
}
