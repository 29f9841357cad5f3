use serde::Serialize;

use crate::cell::CellValue;

static EMPTY: CellValue = CellValue::Empty;

/// Declared bounds of a sheet (the spreadsheet's used range), in rows and
/// columns counted from A1. May exceed the populated cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Extent {
    pub rows: usize,
    pub cols: usize,
}

/// Dense row-major grid of typed cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    cells: Vec<Vec<CellValue>>,
    extent: Extent,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
            extent: Extent::default(),
        }
    }

    /// Build a sheet from rows starting at A1. The extent covers every row
    /// given and the widest of them.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let extent = Extent {
            rows: rows.len(),
            cols: rows.iter().map(|r| r.len()).max().unwrap_or(0),
        };
        Self {
            name: name.into(),
            cells: rows,
            extent,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Set a cell, growing the grid and the extent to cover it.
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.cells.len() <= row {
            self.cells.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.cells[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
        self.widen_extent(row + 1, col + 1);
    }

    /// Cells of one row; empty slice past the populated grid.
    pub fn row(&self, row: usize) -> &[CellValue] {
        self.cells.get(row).map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.cells.iter().map(|r| r.as_slice())
    }

    pub fn is_row_blank(&self, row: usize) -> bool {
        self.row(row).iter().all(CellValue::is_blank)
    }

    /// Number of populated rows (may be less than the declared extent).
    pub fn populated_rows(&self) -> usize {
        self.cells.len()
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Rows below `header_row` within the declared extent.
    pub fn data_row_count(&self, header_row: usize) -> usize {
        let rows = self.extent.rows.max(self.cells.len());
        rows.saturating_sub(header_row + 1)
    }

    /// Grow the declared extent; never shrinks.
    pub fn widen_extent(&mut self, rows: usize, cols: usize) {
        self.extent.rows = self.extent.rows.max(rows);
        self.extent.cols = self.extent.cols.max(cols);
    }
}
