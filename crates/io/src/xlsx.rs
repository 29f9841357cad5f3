// Excel import/export
//
// Import goes through calamine (xlsx, xlsm, xls, xlsb, ods); export writes
// xlsx with rust_xlsxwriter.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use rust_xlsxwriter::{Color, Format, Worksheet};
use tracing::{debug, info};

use devtrack_engine::cell::parse_date_text;
use devtrack_engine::serial::{date_to_serial, serial_to_date};
use devtrack_engine::{CellValue, Sheet, Workbook};
use devtrack_recon::report::{Report, ReportSheet, TABLE_HEADER_ROW};

use crate::error::IoError;
use crate::output::write_atomic;

/// Display format for date cells (nl-NL short date, no zero padding).
const DATE_NUM_FORMAT: &str = "d-m-yyyy";

const HEADER_FILL: u32 = 0x1F4E78;
const HEADER_FONT: u32 = 0xFFFFFF;
const BAND_FILL: u32 = 0xDDEBF7;

// ============================================================================
// Import
// ============================================================================

/// Import a spreadsheet file (xlsx, xlsm, xls, xlsb, ods).
pub fn import(path: &Path) -> Result<Workbook, IoError> {
    // Surface missing/unreadable files as I/O errors rather than format errors
    std::fs::metadata(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut sheets = open_workbook_auto(path)
        .map_err(|e| IoError::unreadable(format!("cannot open {}", path.display()), e))?;
    let workbook = read_sheets(&mut sheets)?;

    info!(
        path = %path.display(),
        sheets = workbook.sheets().len(),
        "imported workbook"
    );
    Ok(workbook)
}

/// Import a spreadsheet held in memory. The format is detected from the bytes.
pub fn import_bytes(bytes: &[u8]) -> Result<Workbook, IoError> {
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| IoError::unreadable("cannot open spreadsheet stream", e))?;
    read_sheets(&mut sheets)
}

fn read_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Workbook, IoError> {
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(IoError::unreadable("spreadsheet", "contains no sheets"));
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| IoError::unreadable(format!("cannot read sheet '{}'", sheet_name), e))?;

        let mut sheet = Sheet::new(sheet_name.clone());

        // Range start offset (data may not begin at A1)
        let (start_row, start_col) = range.start().unwrap_or((0, 0));

        for (row_idx, row) in range.rows().enumerate() {
            let target_row = start_row as usize + row_idx;
            for (col_idx, cell) in row.iter().enumerate() {
                let value = convert_cell(cell);
                if value.is_blank() {
                    continue;
                }
                sheet.set(target_row, start_col as usize + col_idx, value);
            }
        }

        if let Some((end_row, end_col)) = range.end() {
            sheet.widen_extent(end_row as usize + 1, end_col as usize + 1);
        }

        debug!(
            sheet = %sheet.name,
            rows = sheet.extent().rows,
            cols = sheet.extent().cols,
            "read sheet"
        );
        sheets.push(sheet);
    }

    Ok(Workbook::from_sheets(sheets))
}

/// Classify one calamine cell. Plain numbers stay numbers; only cells the
/// source marks as dates become [`CellValue::Date`].
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => {
            // Time-only values (serial < 1) and durations have no calendar date.
            // as_datetime() accounts for the 1904 date system.
            let serial = dt.as_f64();
            if dt.is_duration() || serial < 1.0 {
                return CellValue::Number(serial);
            }
            match dt.as_datetime().map(|d| d.date()).or_else(|| serial_to_date(serial)) {
                Some(date) => CellValue::Date(date),
                None => CellValue::Number(serial),
            }
        }
        Data::DateTimeIso(s) => match parse_date_text(s) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ============================================================================
// Export
// ============================================================================

/// Write every sheet of a workbook to an xlsx file, replacing it in one step.
///
/// Dates are written as serial numbers with a `d-m-yyyy` number format. The
/// declared extent survives even where it reaches past the populated cells.
pub fn export_workbook(workbook: &Workbook, path: &Path) -> Result<(), IoError> {
    let bytes = render_workbook(workbook, path)?;
    write_atomic(path, &bytes)?;
    info!(path = %path.display(), sheets = workbook.sheets().len(), "wrote workbook");
    Ok(())
}

/// Serialize a workbook to xlsx bytes. `path` only labels errors.
pub fn render_workbook(workbook: &Workbook, path: &Path) -> Result<Vec<u8>, IoError> {
    let mut book = rust_xlsxwriter::Workbook::new();
    let date_format = Format::new().set_num_format(DATE_NUM_FORMAT);

    for sheet in workbook.sheets() {
        let worksheet = book.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .map_err(|e| IoError::write(path, format!("sheet name '{}': {}", sheet.name, e)))?;
        write_sheet_cells(sheet, worksheet, &date_format)
            .map_err(|e| IoError::write(path, e))?;
    }

    book.save_to_buffer().map_err(|e| IoError::write(path, e))
}

fn write_sheet_cells(sheet: &Sheet, worksheet: &mut Worksheet, date_format: &Format) -> Result<(), String> {
    let mut max_col = 0usize;

    for (row, cells) in sheet.rows().enumerate() {
        max_col = max_col.max(cells.len());
        for (col, value) in cells.iter().enumerate() {
            write_value(worksheet, row, col, value, None, date_format)?;
        }
    }

    // Keep the declared bounds: a blank needs a non-default format to be written
    let extent = sheet.extent();
    if extent.rows > 0
        && extent.cols > 0
        && (extent.rows > sheet.populated_rows() || extent.cols > max_col)
        && sheet.get(extent.rows - 1, extent.cols - 1).is_blank()
    {
        let marker = Format::new().set_unlocked();
        worksheet
            .write_blank((extent.rows - 1) as u32, (extent.cols - 1) as u16, &marker)
            .map_err(|e| format!("Failed to mark extent of '{}': {}", sheet.name, e))?;
    }

    Ok(())
}

/// Write one typed value. `base` carries row styling (banding); dates get
/// the date number format layered on top of it.
fn write_value(
    worksheet: &mut Worksheet,
    row: usize,
    col: usize,
    value: &CellValue,
    base: Option<&Format>,
    date_format: &Format,
) -> Result<(), String> {
    let row32 = row as u32;
    let col16 = col as u16;
    let err = |e: rust_xlsxwriter::XlsxError| format!("Failed to write cell ({}, {}): {}", row, col, e);

    match value {
        CellValue::Empty => {
            if let Some(format) = base {
                worksheet.write_blank(row32, col16, format).map_err(err)?;
            }
        }
        CellValue::Text(s) => {
            match base {
                Some(format) => worksheet.write_string_with_format(row32, col16, s, format),
                None => worksheet.write_string(row32, col16, s),
            }
            .map_err(err)?;
        }
        CellValue::Number(n) => {
            match base {
                Some(format) => worksheet.write_number_with_format(row32, col16, *n, format),
                None => worksheet.write_number(row32, col16, *n),
            }
            .map_err(err)?;
        }
        CellValue::Date(d) => {
            worksheet
                .write_number_with_format(row32, col16, date_to_serial(*d), date_format)
                .map_err(err)?;
        }
    }
    Ok(())
}

/// Write the styled report workbook: metadata block, coloured header,
/// banded rows, frozen header and an autofilter over each table.
pub fn export_report(report: &Report, path: &Path) -> Result<(), IoError> {
    let bytes = render_report(report, path)?;
    write_atomic(path, &bytes)?;
    info!(path = %path.display(), sheets = report.sheets.len(), "wrote report");
    Ok(())
}

/// Serialize the report workbook to xlsx bytes. `path` only labels errors.
pub fn render_report(report: &Report, path: &Path) -> Result<Vec<u8>, IoError> {
    let mut book = rust_xlsxwriter::Workbook::new();
    let styles = ReportStyles::new();

    for report_sheet in &report.sheets {
        let worksheet = book.add_worksheet();
        worksheet
            .set_name(&report_sheet.name)
            .map_err(|e| IoError::write(path, format!("sheet name '{}': {}", report_sheet.name, e)))?;
        write_report_sheet(report_sheet, worksheet, &styles).map_err(|e| IoError::write(path, e))?;
    }

    book.save_to_buffer().map_err(|e| IoError::write(path, e))
}

struct ReportStyles {
    key: Format,
    header: Format,
    band: Format,
    date: Format,
    band_date: Format,
}

impl ReportStyles {
    fn new() -> Self {
        Self {
            key: Format::new().set_bold(),
            header: Format::new()
                .set_bold()
                .set_font_color(Color::RGB(HEADER_FONT))
                .set_background_color(Color::RGB(HEADER_FILL)),
            band: Format::new().set_background_color(Color::RGB(BAND_FILL)),
            date: Format::new().set_num_format(DATE_NUM_FORMAT),
            band_date: Format::new()
                .set_num_format(DATE_NUM_FORMAT)
                .set_background_color(Color::RGB(BAND_FILL)),
        }
    }
}

fn write_report_sheet(sheet: &ReportSheet, worksheet: &mut Worksheet, styles: &ReportStyles) -> Result<(), String> {
    for (row, (key, value)) in sheet.metadata.iter().enumerate() {
        worksheet
            .write_string_with_format(row as u32, 0, key, &styles.key)
            .map_err(|e| format!("Failed to write metadata '{}': {}", key, e))?;
        worksheet
            .write_string(row as u32, 1, value)
            .map_err(|e| format!("Failed to write metadata '{}': {}", key, e))?;
    }

    let header_row = TABLE_HEADER_ROW as u32;
    for (col, label) in sheet.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(header_row, col as u16, label, &styles.header)
            .map_err(|e| format!("Failed to write header '{}': {}", label, e))?;
    }

    let first = sheet.first_data_row();
    for (idx, cells) in sheet.rows.iter().enumerate() {
        // Even rows (counting data rows from 1) are banded
        let banded = idx % 2 == 1;
        let (base, date_format) = if banded {
            (Some(&styles.band), &styles.band_date)
        } else {
            (None, &styles.date)
        };
        for (col, value) in cells.iter().enumerate() {
            write_value(worksheet, first + idx, col, value, base, date_format)?;
        }
    }

    for (col, width) in sheet.column_widths.iter().enumerate() {
        worksheet
            .set_column_width(col as u16, *width as f64)
            .map_err(|e| format!("Failed to set column {} width: {}", col, e))?;
    }

    worksheet
        .set_freeze_panes(header_row + 1, 0)
        .map_err(|e| format!("Failed to set freeze panes: {}", e))?;

    if !sheet.headers.is_empty() {
        let last_row = (first + sheet.rows.len() - 1) as u32;
        let last_col = (sheet.headers.len() - 1) as u16;
        worksheet
            .autofilter(header_row, 0, last_row, last_col)
            .map_err(|e| format!("Failed to set autofilter: {}", e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use chrono::NaiveDate;
    use devtrack_recon::model::{ConceptRecord, DeviationRecord, OverviewIngest, Remark};
    use devtrack_recon::report::{build_report, SHEET_CONCEPTS, SHEET_HOLDERS, SHEET_OVERDUE};
    use devtrack_recon::RunContext;
    use tempfile::tempdir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_sheet() -> Sheet {
        let mut sheet = Sheet::new("Data");
        sheet.set(0, 0, "Code".into());
        sheet.set(0, 1, "Count".into());
        sheet.set(0, 2, "Geplande datum klaar".into());
        sheet.set(1, 0, "D1".into());
        sheet.set(1, 1, CellValue::Number(42.0));
        sheet.set(1, 2, CellValue::Date(d(2026, 10, 16)));
        sheet
    }

    #[test]
    fn test_workbook_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roundtrip.xlsx");

        let workbook = Workbook::from_sheets(vec![sample_sheet()]);
        export_workbook(&workbook, &path).unwrap();

        let imported = import(&path).unwrap();
        let sheet = imported.sheet("Data").unwrap();
        assert_eq!(sheet.get(0, 0), &CellValue::Text("Code".into()));
        assert_eq!(sheet.get(1, 0), &CellValue::Text("D1".into()));
        assert_eq!(sheet.get(1, 1), &CellValue::Number(42.0));
        assert_eq!(sheet.get(1, 2), &CellValue::Date(d(2026, 10, 16)));
    }

    #[test]
    fn test_import_bytes_matches_file_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bytes.xlsx");
        export_workbook(&Workbook::from_sheets(vec![sample_sheet()]), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let from_bytes = import_bytes(&bytes).unwrap();
        let from_file = import(&path).unwrap();
        assert_eq!(from_bytes, from_file);
    }

    #[test]
    fn test_import_preserves_offset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("offset.xlsx");

        // Header on the second row, like the deviation database
        let mut sheet = Sheet::new("Data");
        sheet.set(0, 0, "Deviation database".into());
        sheet.set(1, 2, "Code".into());
        sheet.set(2, 2, "D1".into());
        export_workbook(&Workbook::from_sheets(vec![sheet]), &path).unwrap();

        let imported = import(&path).unwrap();
        let sheet = imported.first_sheet().unwrap();
        assert_eq!(sheet.get(1, 2), &CellValue::Text("Code".into()));
        assert_eq!(sheet.get(2, 2), &CellValue::Text("D1".into()));
        assert_eq!(sheet.extent().rows, 3);
        assert_eq!(sheet.extent().cols, 3);
    }

    #[test]
    fn test_import_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = import(&dir.path().join("nope.xlsx")).unwrap_err();
        assert!(matches!(err, IoError::Read { .. }), "got: {err}");
    }

    #[test]
    fn test_import_garbage_is_unreadable() {
        let err = import_bytes(b"definitely not a spreadsheet").unwrap_err();
        assert!(matches!(err, IoError::Unreadable { .. }), "got: {err}");
    }

    #[test]
    fn test_convert_cell_kinds() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(convert_cell(&Data::String("  ".into())), CellValue::Empty);
        assert_eq!(convert_cell(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(convert_cell(&Data::Bool(true)), CellValue::Text("TRUE".into()));
        assert_eq!(
            convert_cell(&Data::DateTimeIso("2026-10-16".into())),
            CellValue::Date(d(2026, 10, 16))
        );
        assert_eq!(
            convert_cell(&Data::DateTimeIso("12:30:00".into())),
            CellValue::Text("12:30:00".into())
        );
    }

    #[test]
    fn test_convert_cell_date_systems() {
        let dt = |value, is_1904| Data::DateTime(ExcelDateTime::new(value, ExcelDateTimeType::DateTime, is_1904));

        // 2026-10-16 in the 1900 system
        assert_eq!(convert_cell(&dt(46311.0, false)), CellValue::Date(d(2026, 10, 16)));
        // The same serial counts from 1904-01-01 in Mac workbooks
        assert_eq!(
            convert_cell(&dt(46311.0, true)),
            CellValue::Date(d(2026, 10, 16) + chrono::Duration::days(1462))
        );
        // Time of day only
        assert_eq!(convert_cell(&dt(0.5, false)), CellValue::Number(0.5));
    }

    #[test]
    fn test_report_export_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");

        let ingest = OverviewIngest {
            deviations: vec![DeviationRecord {
                code: "D1".into(),
                title: "Leak".into(),
                measure_code: "M1".into(),
                measure: "Fix seal".into(),
                status: "Vigerend".into(),
                measure_status: "Open".into(),
                action_holder: "Alice".into(),
                planned_date: Some(d(2026, 10, 16)),
                remark: Remark::Overdue,
            }],
            concepts: Vec::<ConceptRecord>::new(),
            action_holders: ["Alice".to_string()].into_iter().collect(),
            unparsable_dates: 0,
        };
        let now = d(2026, 10, 17).and_hms_opt(9, 30, 0).unwrap();
        let ctx = RunContext::new(now, "Station Noord", "Noord");
        let report = build_report(&ingest, &ctx);

        export_report(&report, &path).unwrap();

        let imported = import(&path).unwrap();
        assert_eq!(imported.sheet_names(), vec![SHEET_OVERDUE, SHEET_CONCEPTS, SHEET_HOLDERS]);

        let overdue = imported.sheet(SHEET_OVERDUE).unwrap();
        assert_eq!(overdue.get(0, 0), &CellValue::Text("Project".into()));
        assert_eq!(overdue.get(0, 1), &CellValue::Text("Station Noord".into()));
        assert_eq!(overdue.get(2, 1), &CellValue::Text("17-10-2026 09:30:00".into()));
        assert_eq!(overdue.get(TABLE_HEADER_ROW, 0), &CellValue::Text("Code".into()));
        assert_eq!(overdue.get(TABLE_HEADER_ROW + 1, 0), &CellValue::Text("D1".into()));
        assert_eq!(overdue.get(TABLE_HEADER_ROW + 1, 6), &CellValue::Date(d(2026, 10, 16)));
        assert_eq!(
            overdue.get(TABLE_HEADER_ROW + 1, 7),
            &CellValue::Text(Remark::Overdue.label().into())
        );

        // Concepts table is a placeholder: header present, data row blank
        let concepts = imported.sheet(SHEET_CONCEPTS).unwrap();
        assert_eq!(concepts.get(TABLE_HEADER_ROW, 0), &CellValue::Text("Code".into()));
        assert!(concepts.is_row_blank(TABLE_HEADER_ROW + 1));
    }
}
