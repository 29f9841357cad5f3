//! Column-aligned transcription of the overview into the database sheet.
//!
//! Columns are paired by normalized header label, so the two sheets may
//! order and count their columns differently. Unlike ingestion this is
//! best-effort: source columns that are missing simply leave blanks. A source
//! without data rows is still refused, since it would clear the database.

use devtrack_engine::header::normalize_label;
use devtrack_engine::{format_timestamp, CellValue, HeaderIndex, Sheet};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::columns::{self, OVERVIEW_COLUMNS};
use crate::context::RunContext;
use crate::error::{IngestPass, ReconError};

/// What to write into one target column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnPlan {
    /// No header label; never touched.
    Skip,
    ExportTimestamp,
    Station,
    Source(usize),
    /// Labelled but absent from the source.
    Unmatched,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranscriptionStats {
    /// Data rows taken from the source.
    pub source_rows: usize,
    /// Data rows the target had before.
    pub previous_rows: usize,
    /// Stale target rows cleared past the end of the source.
    pub cleared_rows: usize,
    pub matched_columns: Vec<String>,
    pub unmatched_columns: Vec<String>,
}

/// Transcribed copy of the database sheet plus what happened.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub sheet: Sheet,
    pub stats: TranscriptionStats,
}

fn plan_columns(target: &HeaderIndex, source: &HeaderIndex) -> Vec<ColumnPlan> {
    let timestamp = normalize_label(columns::EXPORT_TIMESTAMP);
    let station = normalize_label(columns::STATION);

    target
        .labels()
        .iter()
        .map(|label| {
            let key = normalize_label(label);
            if key.is_empty() {
                ColumnPlan::Skip
            } else if key == timestamp {
                ColumnPlan::ExportTimestamp
            } else if key == station {
                ColumnPlan::Station
            } else {
                source
                    .lookup(label)
                    .map(ColumnPlan::Source)
                    .unwrap_or(ColumnPlan::Unmatched)
            }
        })
        .collect()
}

/// Copy `source` rows into a fresh copy of `target`, matching columns by
/// header label.
///
/// Rows within the source's extent get the matched value (blank when the
/// target column has no source counterpart). Rows past it are cleared in
/// matched and synthetic columns and left alone in unmatched ones. The
/// declared extent grows to cover everything written.
///
/// Fails with `EmptyInput` when the source has no non-blank rows below its
/// header; the target is left as it was.
pub fn transcribe(
    source: &Sheet,
    source_header_row: usize,
    target: &Sheet,
    target_header_row: usize,
    ctx: &RunContext,
) -> Result<Transcription, ReconError> {
    let source_rows: Vec<&[CellValue]> = source
        .rows()
        .skip(source_header_row + 1)
        .filter(|row| !row.iter().all(CellValue::is_blank))
        .collect();
    if source_rows.is_empty() {
        return Err(ReconError::EmptyInput { pass: IngestPass::Transcription });
    }

    let source_header = HeaderIndex::build(source.row(source_header_row));
    let target_header = HeaderIndex::build(target.row(target_header_row));

    let missing = source_header.missing(OVERVIEW_COLUMNS);
    if !missing.is_empty() {
        warn!(columns = %missing.join(", "), "source lacks overview columns; transcribing what matches");
    }

    let plans = plan_columns(&target_header, &source_header);
    let source_count = source_rows.len();
    let previous_rows = target.data_row_count(target_header_row);
    let total_rows = source_count.max(previous_rows);
    let timestamp = format_timestamp(ctx.now);

    let mut sheet = target.clone();
    for offset in 0..total_rows {
        let row = target_header_row + 1 + offset;
        let source_row = source_rows.get(offset);

        for (col, plan) in plans.iter().enumerate() {
            let value = match (plan, source_row) {
                (ColumnPlan::Skip, _) => continue,
                (ColumnPlan::Unmatched, None) => continue,
                (ColumnPlan::Unmatched, Some(_)) => CellValue::Empty,
                (ColumnPlan::ExportTimestamp, Some(_)) => CellValue::Text(timestamp.clone()),
                (ColumnPlan::Station, Some(_)) => CellValue::Text(ctx.station.clone()),
                (ColumnPlan::Source(src), Some(cells)) => {
                    cells.get(*src).cloned().unwrap_or_default()
                }
                (_, None) => CellValue::Empty,
            };
            sheet.set(row, col, value);
        }
    }
    sheet.widen_extent(target_header_row + 1 + total_rows, target_header.len());

    let mut stats = TranscriptionStats {
        source_rows: source_count,
        previous_rows,
        cleared_rows: previous_rows.saturating_sub(source_count),
        ..TranscriptionStats::default()
    };
    for (label, plan) in target_header.labels().iter().zip(&plans) {
        match plan {
            ColumnPlan::Source(_) => stats.matched_columns.push(label.clone()),
            ColumnPlan::Unmatched => stats.unmatched_columns.push(label.clone()),
            _ => {}
        }
    }

    debug!(unmatched = ?stats.unmatched_columns, "target columns without source");
    info!(
        rows = source_count,
        cleared = stats.cleared_rows,
        matched = stats.matched_columns.len(),
        "database transcribed"
    );

    Ok(Transcription { sheet, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx() -> RunContext {
        let now = NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        RunContext::new(now, "Project", "Noord")
    }

    fn t(s: &str) -> CellValue {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.into())
        }
    }

    fn source(n: usize) -> Sheet {
        let mut rows = vec![vec![t("Code"), t("Titel"), t("Actiehouder")]];
        for i in 1..=n {
            rows.push(vec![t(&format!("D{i}")), t(&format!("T{i}")), t("Alice")]);
        }
        Sheet::from_rows("Overzicht", rows)
    }

    /// Title row, then header `[Station, actiehouder, Notes, CODE, Date export]`
    /// with `existing` stale data rows.
    fn target(existing: usize) -> Sheet {
        let mut rows = vec![
            vec![t("Database")],
            vec![t("Station"), t(" actiehouder"), t("Notes"), t("CODE"), t("Date export")],
        ];
        for i in 1..=existing {
            rows.push(vec![t("Oud"), t("Bob"), t(&format!("note {i}")), t(&format!("OLD{i}")), t("1-1-2020")]);
        }
        Sheet::from_rows("Data", rows)
    }

    #[test]
    fn matches_columns_by_label() {
        let out = transcribe(&source(2), 0, &target(0), 1, &ctx()).unwrap();
        let s = &out.sheet;
        assert_eq!(s.get(2, 0), &t("Noord"));
        assert_eq!(s.get(2, 1), &t("Alice"));
        assert_eq!(s.get(2, 3), &t("D1"));
        assert_eq!(s.get(3, 3), &t("D2"));
        assert_eq!(s.get(2, 4), &t("17-10-2026 08:30:00"));
        assert_eq!(out.stats.matched_columns, vec!["actiehouder", "CODE"]);
        assert_eq!(out.stats.unmatched_columns, vec!["Notes"]);
    }

    #[test]
    fn grows_past_existing_rows() {
        let out = transcribe(&source(5), 0, &target(3), 1, &ctx()).unwrap();
        let s = &out.sheet;
        assert!(s.data_row_count(1) >= 5);
        for row in 2..=6 {
            assert_eq!(s.get(row, 3), &t(&format!("D{}", row - 1)));
            // unmatched column is blanked within the source range
            assert_eq!(s.get(row, 2), &CellValue::Empty);
        }
        assert_eq!(s.get(5, 0), &t("Noord"));
        assert_eq!(s.get(6, 1), &t("Alice"));
        assert_eq!(s.extent().rows, 7);
        assert_eq!(out.stats.cleared_rows, 0);
    }

    #[test]
    fn clears_stale_rows_past_source() {
        let out = transcribe(&source(1), 0, &target(3), 1, &ctx()).unwrap();
        let s = &out.sheet;
        assert_eq!(s.get(2, 3), &t("D1"));
        for row in 3..=4 {
            assert_eq!(s.get(row, 0), &CellValue::Empty);
            assert_eq!(s.get(row, 1), &CellValue::Empty);
            assert_eq!(s.get(row, 3), &CellValue::Empty);
            assert_eq!(s.get(row, 4), &CellValue::Empty);
        }
        // unmatched column is left alone outside the source range
        assert_eq!(s.get(3, 2), &t("note 2"));
        assert_eq!(s.get(4, 2), &t("note 3"));
        assert_eq!(out.stats.cleared_rows, 2);
    }

    #[test]
    fn extent_is_never_shrunk() {
        let mut tgt = target(1);
        tgt.widen_extent(50, 12);
        let out = transcribe(&source(2), 0, &tgt, 1, &ctx()).unwrap();
        assert_eq!(out.sheet.extent().rows, 50);
        assert_eq!(out.sheet.extent().cols, 12);
        // every declared row past the source was cleared in matched columns
        assert_eq!(out.stats.previous_rows, 48);
        assert_eq!(out.stats.cleared_rows, 46);
    }

    #[test]
    fn missing_source_columns_are_best_effort() {
        let src = Sheet::from_rows(
            "Overzicht",
            vec![vec![t("Code")], vec![t("D1")], vec![t("D2")]],
        );
        let out = transcribe(&src, 0, &target(0), 1, &ctx()).unwrap();
        assert_eq!(out.sheet.get(2, 3), &t("D1"));
        assert_eq!(out.sheet.get(2, 1), &CellValue::Empty);
        assert_eq!(out.stats.unmatched_columns, vec!["actiehouder", "Notes"]);
    }

    #[test]
    fn header_only_source_is_refused() {
        let src = Sheet::from_rows("Overzicht", vec![vec![t("Code"), t("Titel")], vec![t(" ")]]);
        let err = transcribe(&src, 0, &target(2), 1, &ctx()).unwrap_err();
        assert!(matches!(err, ReconError::EmptyInput { pass: IngestPass::Transcription }));

        // A header row pointing past the data behaves the same
        let err = transcribe(&source(3), 3, &target(2), 1, &ctx()).unwrap_err();
        assert!(matches!(err, ReconError::EmptyInput { .. }));
    }

    #[test]
    fn input_sheet_is_not_mutated() {
        let tgt = target(2);
        let before = tgt.clone();
        let _ = transcribe(&source(4), 0, &tgt, 1, &ctx()).unwrap();
        assert_eq!(tgt, before);
    }

    #[test]
    fn header_without_label_is_untouched() {
        let mut tgt = Sheet::from_rows(
            "Data",
            vec![vec![], vec![t("Code"), CellValue::Empty], vec![t("OLD"), t("keep")]],
        );
        tgt.widen_extent(3, 2);
        let out = transcribe(&source(1), 0, &tgt, 1, &ctx()).unwrap();
        assert_eq!(out.sheet.get(2, 0), &t("D1"));
        assert_eq!(out.sheet.get(2, 1), &t("keep"));
    }
}
