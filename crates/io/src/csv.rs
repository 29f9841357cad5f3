// CSV/TSV import

use std::borrow::Cow;
use std::path::Path;

use tracing::debug;

use devtrack_engine::{CellValue, Sheet, Workbook};

use crate::error::IoError;

/// Delimiters tried when sniffing; earlier ones win a tied score.
const DELIMITERS: &[u8] = b"\t;,|";

/// Records sampled when sniffing.
const SNIFF_RECORDS: usize = 10;

/// Import a delimited text file as a single-sheet workbook named after the file.
///
/// Bytes that are not UTF-8 are decoded as Windows-1252, which is what Excel
/// writes for "CSV" on Dutch Windows installs.
pub fn import(path: &Path) -> Result<Workbook, IoError> {
    let bytes = std::fs::read(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let content = decode(&bytes);
    let delimiter = sniff_delimiter(&content);
    debug!(path = %path.display(), delimiter = %(delimiter as char).escape_default(), "sniffed delimiter");

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1");
    let sheet = import_from_string(name, &content, delimiter)
        .map_err(|e| IoError::unreadable(format!("cannot parse {}", path.display()), e))?;
    Ok(Workbook::from_sheets(vec![sheet]))
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let (text, malformed) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    if !malformed {
        return text;
    }
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text
}

/// Field widths of the first records when split on `delimiter`. Parsing the
/// sample as one stream keeps quoted line breaks inside their field.
fn sample_widths(content: &str, delimiter: u8) -> Vec<usize> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes())
        .records()
        .take(SNIFF_RECORDS)
        .map_while(Result::ok)
        .map(|record| record.len())
        .collect()
}

/// Pick the delimiter whose split agrees best with the first record's width.
///
/// A candidate must split the first record into more than one field. Its
/// score is the width times the number of sampled records of that width.
/// Falls back to a comma.
fn sniff_delimiter(content: &str) -> u8 {
    let mut best: Option<(usize, u8)> = None;
    for &delimiter in DELIMITERS {
        let widths = sample_widths(content, delimiter);
        let Some(&width) = widths.first().filter(|&&w| w > 1) else {
            continue;
        };
        let score = width * widths.iter().filter(|&&w| w == width).count();
        if best.map_or(true, |(top, _)| score > top) {
            best = Some((score, delimiter));
        }
    }
    best.map_or(b',', |(_, delimiter)| delimiter)
}

fn import_from_string(name: &str, content: &str, delimiter: u8) -> Result<Sheet, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut sheet = Sheet::new(name);
    let mut rows = 0usize;
    let mut cols = 0usize;

    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        for (col_idx, field) in record.iter().enumerate() {
            let value = CellValue::from_input(field);
            if !value.is_blank() {
                sheet.set(row_idx, col_idx, value);
            }
        }
        rows = row_idx + 1;
        cols = cols.max(record.len());
    }

    // Blank trailing fields and rows still count toward the declared bounds
    sheet.widen_extent(rows, cols);
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sniffs_common_delimiters() {
        for delimiter in [b'\t', b';', b',', b'|'] {
            let sep = (delimiter as char).to_string();
            let content = ["Code", "Titel", "Status"].join(&sep)
                + "\n"
                + &["D1", "Leak", "Vigerend"].join(&sep)
                + "\n";
            assert_eq!(sniff_delimiter(&content), delimiter, "content: {content:?}");
        }
    }

    #[test]
    fn sniff_ignores_delimiters_inside_quotes() {
        let content = "Code;Titel;Actiehouder\n\"D1\";\"Leak, north side\";\"Doe, Jane\"\nD2;\"Crack\";Bob\n";
        assert_eq!(sniff_delimiter(content), b';');

        // A quoted line break does not start a new record
        let content = "Code;Maatregel\nD1;\"Fix,\nthen check\"\nD2;Weld\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn sniff_falls_back_to_comma() {
        assert_eq!(sniff_delimiter(""), b',');
        assert_eq!(sniff_delimiter("Code\nD1\n"), b',');
    }

    #[test]
    fn test_semicolon_csv_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("overview.csv");
        fs::write(&path, "Code;Titel;Aantal\nD1;Leak;30\nD2;;17\n").unwrap();

        let workbook = import(&path).unwrap();
        let sheet = workbook.sheet("overview").unwrap();
        assert_eq!(sheet.get(0, 0), &CellValue::Text("Code".into()));
        assert_eq!(sheet.get(1, 1), &CellValue::Text("Leak".into()));
        assert_eq!(sheet.get(1, 2), &CellValue::Number(30.0));
        assert_eq!(sheet.get(2, 1), &CellValue::Empty);
        assert_eq!(sheet.extent().rows, 3);
        assert_eq!(sheet.extent().cols, 3);
    }

    #[test]
    fn test_utf8_bom_is_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, "\u{FEFF}Code;Titel\nD1;Leak\n").unwrap();

        let workbook = import(&path).unwrap();
        let sheet = workbook.first_sheet().unwrap();
        assert_eq!(sheet.get(0, 0), &CellValue::Text("Code".into()));
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Geplande datum klaar;Opmerking\n1-2-2026;Caf\xe9\n" in Windows-1252
        let mut bytes = b"Geplande datum klaar;Opmerking\n1-2-2026;Caf".to_vec();
        bytes.push(0xE9);
        bytes.push(b'\n');
        fs::write(&path, bytes).unwrap();

        let workbook = import(&path).unwrap();
        let sheet = workbook.first_sheet().unwrap();
        assert_eq!(sheet.get(1, 1), &CellValue::Text("Café".into()));
        // Text dates stay text; rules coerce them when they need a date
        assert_eq!(sheet.get(1, 0), &CellValue::Text("1-2-2026".into()));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = import(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, IoError::Read { .. }));
    }
}
