use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::serial;

/// A single typed cell. The type is decided once when the grid is loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    /// Classify free-form input (CSV fields, command-line values).
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if let Ok(num) = trimmed.parse::<f64>() {
            if num.is_finite() {
                return CellValue::Number(num);
            }
        }

        CellValue::Text(trimmed.to_string())
    }

    /// Empty cells and whitespace-only text both count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) | CellValue::Date(_) => false,
        }
    }

    /// String form used for comparisons, codes and column widths.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Date(d) => format_date(Some(*d)),
        }
    }

    /// Trimmed display string.
    pub fn text(&self) -> String {
        self.display().trim().to_string()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<Option<NaiveDate>> for CellValue {
    fn from(d: Option<NaiveDate>) -> Self {
        d.map(CellValue::Date).unwrap_or(CellValue::Empty)
    }
}

/// Interpret a cell as a calendar date.
///
/// Native dates pass through, numbers are read as date serials, text goes
/// through [`parse_date_text`]. Anything that does not yield a valid date is
/// `None`; this never fails.
pub fn coerce_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => serial::serial_to_date(*n),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Empty => None,
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Parse a date written as text. ISO forms first, then the Dutch display
/// form (`d-m-yyyy`), then US slash dates and long month names.
pub fn parse_date_text(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Render a date in the fixed display locale (nl-NL short date, `d-m-yyyy`).
/// `None` renders as an empty string.
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{}-{}-{}", d.day(), d.month(), d.year()),
        None => String::new(),
    }
}

/// Render a timestamp in the fixed display locale (`d-m-yyyy HH:MM:SS`).
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    format!("{} {}", format_date(Some(ts.date())), ts.format("%H:%M:%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn from_input_infers_type() {
        assert_eq!(CellValue::from_input("  "), CellValue::Empty);
        assert_eq!(CellValue::from_input("42"), CellValue::Number(42.0));
        assert_eq!(CellValue::from_input(" 3.5 "), CellValue::Number(3.5));
        assert_eq!(CellValue::from_input("Vigerend"), CellValue::Text("Vigerend".into()));
        assert_eq!(CellValue::from_input("NaN"), CellValue::Text("NaN".into()));
    }

    #[test]
    fn coerce_native_date_passes_through() {
        let d = ymd(2026, 3, 4);
        assert_eq!(coerce_date(&CellValue::Date(d)), Some(d));
    }

    #[test]
    fn coerce_number_as_serial() {
        assert_eq!(coerce_date(&CellValue::Number(45292.0)), Some(ymd(2024, 1, 1)));
        assert_eq!(coerce_date(&CellValue::Number(45292.6)), Some(ymd(2024, 1, 1)));
        assert_eq!(coerce_date(&CellValue::Number(0.0)), None);
    }

    #[test]
    fn coerce_text_forms() {
        let want = ymd(2026, 3, 4);
        for s in [
            "2026-03-04",
            "2026-03-04T10:15:00",
            "2026-03-04T10:15:00Z",
            "2026-03-04 10:15:00",
            "4-3-2026",
            "04-03-2026",
            "03/04/2026",
            "4.3.2026",
            "4 March 2026",
            "March 4, 2026",
        ] {
            assert_eq!(coerce_date(&CellValue::Text(s.into())), Some(want), "input {s:?}");
        }
    }

    #[test]
    fn coerce_garbage_is_none() {
        assert_eq!(coerce_date(&CellValue::Text("n.v.t.".into())), None);
        assert_eq!(coerce_date(&CellValue::Text("".into())), None);
        assert_eq!(coerce_date(&CellValue::Text("31-02-2026".into())), None);
        assert_eq!(coerce_date(&CellValue::Empty), None);
    }

    #[test]
    fn format_date_dutch_short() {
        assert_eq!(format_date(Some(ymd(2026, 3, 4))), "4-3-2026");
        assert_eq!(format_date(Some(ymd(2026, 12, 31))), "31-12-2026");
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn format_date_round_trips_through_parser() {
        let d = ymd(2025, 11, 7);
        assert_eq!(parse_date_text(&format_date(Some(d))), Some(d));
    }

    #[test]
    fn format_timestamp_has_time() {
        let ts = ymd(2026, 10, 17).and_hms_opt(9, 5, 3).unwrap();
        assert_eq!(format_timestamp(ts), "17-10-2026 09:05:03");
    }

    #[test]
    fn display_numbers() {
        assert_eq!(CellValue::Number(12.0).display(), "12");
        assert_eq!(CellValue::Number(1.25).display(), "1.25");
        assert_eq!(CellValue::Date(ymd(2026, 1, 2)).display(), "2-1-2026");
    }

    #[test]
    fn blank_detection() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::Text("   ".into()).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }
}
