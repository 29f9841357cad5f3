//! Header-driven ingestion of overview and statistics sheets.
//!
//! Both passes are independent: each builds its own header index, checks its
//! own required columns, and returns freshly allocated records.

use chrono::{NaiveDate, NaiveDateTime};
use devtrack_engine::{coerce_date, CellValue, HeaderIndex, Sheet};
use feruca::{Collator, Locale, Tailoring};
use tracing::{debug, info, warn};

use crate::columns::{self, OVERVIEW_COLUMNS, STATISTICS_COLUMNS};
use crate::config::{eq_label, IngestOptions};
use crate::error::{IngestPass, ReconError};
use crate::model::{
    Completion, ConceptRecord, DeviationRecord, OverviewIngest, Remark, StatisticsRecord,
};
use crate::rules::{classify_completion, classify_deadline, days_late};

/// Resolved positions of the required columns for one pass.
struct Columns {
    header: HeaderIndex,
}

impl Columns {
    /// Index the header row and fail fast on any missing required label.
    fn resolve(
        sheet: &Sheet,
        header_row: usize,
        required: &[&str],
        pass: IngestPass,
    ) -> Result<Self, ReconError> {
        if sheet.populated_rows() <= header_row {
            return Err(ReconError::EmptyInput { pass });
        }

        let header = HeaderIndex::build(sheet.row(header_row));
        let missing = header.missing(required);
        if !missing.is_empty() {
            return Err(ReconError::MissingColumns { pass, columns: missing });
        }

        for dup in header.duplicates() {
            warn!(%pass, label = %dup, "duplicate header label; first column wins");
        }

        Ok(Self { header })
    }

    fn cell<'a>(&self, row: &'a [CellValue], label: &str) -> &'a CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.header
            .lookup(label)
            .and_then(|col| row.get(col))
            .unwrap_or(&EMPTY)
    }

    fn text(&self, row: &[CellValue], label: &str) -> String {
        self.cell(row, label).text()
    }

    /// Date of a cell plus whether a non-blank value failed to parse.
    fn date(&self, row: &[CellValue], label: &str) -> (Option<NaiveDate>, bool) {
        let cell = self.cell(row, label);
        let date = coerce_date(cell);
        (date, date.is_none() && !cell.is_blank())
    }
}

/// Non-blank rows below the header. Fails with `EmptyInput` when there are none.
fn data_rows(
    sheet: &Sheet,
    header_row: usize,
    pass: IngestPass,
) -> Result<Vec<&[CellValue]>, ReconError> {
    let rows: Vec<&[CellValue]> = sheet
        .rows()
        .skip(header_row + 1)
        .filter(|row| !row.iter().all(CellValue::is_blank))
        .collect();
    if rows.is_empty() {
        return Err(ReconError::EmptyInput { pass });
    }
    Ok(rows)
}

/// Unicode collation under CLDR root, which Dutch uses untailored.
/// Punctuation is non-ignorable so it sorts before digits instead of vanishing;
/// fully equal keys fall back to byte order.
fn code_collator() -> Collator {
    Collator::new(Tailoring::Cldr(Locale::Root), false, true)
}

/// Stable sort by code. Accents and case only break ties, lowercase first.
/// Digits compare one at a time, so `A10` sorts before `A2`.
fn sort_by_code<T>(items: &mut [T], code: impl Fn(&T) -> &str) {
    let mut collator = code_collator();
    items.sort_by(|a, b| collator.collate(code(a), code(b)));
}

/// Overview pass: overdue-track deviations, concepts and action holders.
pub fn ingest_overview(
    sheet: &Sheet,
    header_row: usize,
    now: NaiveDateTime,
    options: &IngestOptions,
) -> Result<OverviewIngest, ReconError> {
    let pass = IngestPass::Overview;
    let cols = Columns::resolve(sheet, header_row, OVERVIEW_COLUMNS, pass)?;
    let rows = data_rows(sheet, header_row, pass)?;

    let mut out = OverviewIngest::default();

    for row in &rows {
        let status = cols.text(row, columns::STATUS);
        let (planned_date, unparsable) = cols.date(row, columns::PLANNED_DATE);
        if unparsable {
            out.unparsable_dates += 1;
            debug!(
                code = %cols.text(row, columns::CODE),
                value = %cols.cell(row, columns::PLANNED_DATE).display(),
                "planned date not recognised; treated as missing"
            );
        }

        if eq_label(&status, columns::STATUS_ACTIVE) {
            let remark = classify_deadline(planned_date, now);
            let action_holder = cols.text(row, columns::ACTION_HOLDER);
            let needs_holder = options.require_action_holder && action_holder.is_empty();
            if remark != Remark::NoActionNeeded && !needs_holder {
                if !action_holder.is_empty() {
                    out.action_holders.insert(action_holder.clone());
                }
                out.deviations.push(DeviationRecord {
                    code: cols.text(row, columns::CODE),
                    title: cols.text(row, columns::TITLE),
                    measure_code: cols.text(row, columns::MEASURE_CODE),
                    measure: cols.text(row, columns::MEASURE),
                    status: status.clone(),
                    measure_status: cols.text(row, columns::MEASURE_STATUS),
                    action_holder,
                    planned_date,
                    remark,
                });
            }
        }

        if eq_label(&status, columns::STATUS_CONCEPT) {
            out.concepts.push(ConceptRecord {
                code: cols.text(row, columns::CODE),
                title: cols.text(row, columns::TITLE),
                status,
                author: cols.text(row, columns::AUTHOR),
                planned_date,
            });
        }
    }

    sort_by_code(&mut out.deviations, |d| &d.code);
    sort_by_code(&mut out.concepts, |c| &c.code);

    if out.unparsable_dates > 0 {
        warn!(count = out.unparsable_dates, "overview rows with unrecognised planned dates");
    }
    info!(
        rows = rows.len(),
        deviations = out.deviations.len(),
        concepts = out.concepts.len(),
        holders = out.action_holders.len(),
        "overview ingested"
    );

    Ok(out)
}

/// Statistics pass: handled measures that needed action, bucketed by completion.
pub fn ingest_statistics(
    sheet: &Sheet,
    header_row: usize,
    options: &IngestOptions,
) -> Result<Vec<StatisticsRecord>, ReconError> {
    let pass = IngestPass::Statistics;
    let cols = Columns::resolve(sheet, header_row, STATISTICS_COLUMNS, pass)?;
    let rows = data_rows(sheet, header_row, pass)?;

    let mut records = Vec::new();
    let mut unparsable = 0usize;

    for row in &rows {
        if !options.is_measures_needed(&cols.text(row, columns::ASSESSMENT)) {
            continue;
        }
        if !options.is_handled(&cols.text(row, columns::MEASURE_STATUS)) {
            continue;
        }

        let (planned_date, bad_planned) = cols.date(row, columns::PLANNED_DATE);
        let (done_date, bad_done) = cols.date(row, columns::DONE_DATE);
        if bad_planned || bad_done {
            unparsable += 1;
        }

        let completion = classify_completion(planned_date, done_date);
        let late_by = match (completion, planned_date, done_date) {
            (Completion::Late, Some(p), Some(d)) => Some(days_late(p, d)),
            _ => None,
        };
        let discipline = Some(cols.text(row, columns::CAUSING_DISCIPLINE))
            .filter(|d| !d.is_empty());

        records.push(StatisticsRecord {
            code: cols.text(row, columns::CODE),
            title: cols.text(row, columns::TITLE),
            measure: cols.text(row, columns::MEASURE),
            action_holder: cols.text(row, columns::ACTION_HOLDER),
            planned_date,
            done_date,
            completion,
            days_late: late_by,
            discipline,
        });
    }

    if unparsable > 0 {
        warn!(count = unparsable, "statistics rows with unrecognised dates");
    }
    info!(rows = rows.len(), filtered = records.len(), "statistics ingested");

    Ok(records)
}
