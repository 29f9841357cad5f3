//! Report layout: three sheets (overdue measures, concepts, action holders),
//! each with a metadata block above a single data table.
//!
//! This module only decides *what* goes where and how wide columns are;
//! the io crate turns a [`Report`] into a styled workbook.

use devtrack_engine::{format_timestamp, CellValue};
use serde::Serialize;

use crate::columns;
use crate::context::RunContext;
use crate::model::OverviewIngest;

/// 0-based row of the table header (metadata occupies the rows above).
pub const TABLE_HEADER_ROW: usize = 3;

pub const MIN_COLUMN_WIDTH: usize = 10;
pub const MAX_COLUMN_WIDTH: usize = 60;
/// Padding added to the longest text in a column.
const WIDTH_PADDING: usize = 2;

pub const SHEET_OVERDUE: &str = "Verlopen acties";
pub const SHEET_CONCEPTS: &str = "Concepten";
pub const SHEET_HOLDERS: &str = "Actiehouders";

const REMARK_HEADER: &str = "Opmerking";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSheet {
    pub name: String,
    /// Key/value pairs written in columns A and B of the first rows.
    pub metadata: Vec<(String, String)>,
    pub headers: Vec<String>,
    /// Never empty: a blank placeholder row stands in for "no records".
    pub rows: Vec<Vec<CellValue>>,
    /// Character widths, one per table column.
    pub column_widths: Vec<usize>,
}

impl ReportSheet {
    fn new(name: &str, kind: &str, ctx: &RunContext, headers: &[&str], rows: Vec<Vec<CellValue>>) -> Self {
        let metadata = vec![
            ("Project".to_string(), ctx.project.clone()),
            ("Type".to_string(), kind.to_string()),
            ("Gegenereerd".to_string(), format_timestamp(ctx.now)),
        ];
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows = if rows.is_empty() {
            vec![vec![CellValue::Empty; headers.len()]]
        } else {
            rows
        };
        let column_widths = column_widths(&metadata, &headers, &rows);
        Self {
            name: name.to_string(),
            metadata,
            headers,
            rows,
            column_widths,
        }
    }

    /// Row index of the first data row.
    pub fn first_data_row(&self) -> usize {
        TABLE_HEADER_ROW + 1
    }

    /// True when the only row is the placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.rows.len() == 1 && self.rows[0].iter().all(CellValue::is_blank)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub sheets: Vec<ReportSheet>,
}

impl Report {
    pub fn sheet(&self, name: &str) -> Option<&ReportSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// `clamp(longest text + 2, 10, 60)` per column, over header, metadata and
/// data cells. Metadata keys count toward column A, values toward column B.
pub fn column_widths(
    metadata: &[(String, String)],
    headers: &[String],
    rows: &[Vec<CellValue>],
) -> Vec<usize> {
    let cols = headers
        .len()
        .max(rows.iter().map(|r| r.len()).max().unwrap_or(0))
        .max(if metadata.is_empty() { 0 } else { 2 });
    let mut longest = vec![0usize; cols];

    let mut observe = |col: usize, text: &str| {
        let len = text.chars().count();
        if len > longest[col] {
            longest[col] = len;
        }
    };

    for (key, value) in metadata {
        observe(0, key);
        observe(1, value);
    }
    for (col, header) in headers.iter().enumerate() {
        observe(col, header);
    }
    for row in rows {
        for (col, cell) in row.iter().enumerate() {
            observe(col, &cell.display());
        }
    }

    longest
        .into_iter()
        .map(|len| (len + WIDTH_PADDING).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH))
        .collect()
}

/// Lay out the report from the current overview records.
pub fn build_report(overview: &OverviewIngest, ctx: &RunContext) -> Report {
    let overdue_rows = overview
        .deviations
        .iter()
        .map(|d| {
            vec![
                CellValue::from(d.code.as_str()),
                CellValue::from(d.title.as_str()),
                CellValue::from(d.measure_code.as_str()),
                CellValue::from(d.measure.as_str()),
                CellValue::from(d.measure_status.as_str()),
                CellValue::from(d.action_holder.as_str()),
                CellValue::from(d.planned_date),
                CellValue::from(d.remark.label()),
            ]
        })
        .collect();

    let concept_rows = overview
        .concepts
        .iter()
        .map(|c| {
            vec![
                CellValue::from(c.code.as_str()),
                CellValue::from(c.title.as_str()),
                CellValue::from(c.status.as_str()),
                CellValue::from(c.author.as_str()),
                CellValue::from(c.planned_date),
            ]
        })
        .collect();

    let holder_rows = overview
        .action_holders
        .iter()
        .map(|h| vec![CellValue::from(h.as_str())])
        .collect();

    Report {
        sheets: vec![
            ReportSheet::new(
                SHEET_OVERDUE,
                "Verlopen en binnenkort verlopende maatregelen",
                ctx,
                &[
                    columns::CODE,
                    columns::TITLE,
                    columns::MEASURE_CODE,
                    columns::MEASURE,
                    columns::MEASURE_STATUS,
                    columns::ACTION_HOLDER,
                    columns::PLANNED_DATE,
                    REMARK_HEADER,
                ],
                overdue_rows,
            ),
            ReportSheet::new(
                SHEET_CONCEPTS,
                "Afwijkingen in concept",
                ctx,
                &[
                    columns::CODE,
                    columns::TITLE,
                    columns::STATUS,
                    columns::AUTHOR,
                    columns::PLANNED_DATE,
                ],
                concept_rows,
            ),
            ReportSheet::new(SHEET_HOLDERS, "Actiehouders", ctx, &[columns::ACTION_HOLDER], holder_rows),
        ],
    }
}
