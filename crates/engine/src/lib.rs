//! `devtrack-engine`: typed cell grid model.
//!
//! Cells are classified once when a grid is loaded; everything downstream
//! works on [`cell::CellValue`] and never re-inspects raw source data.

pub mod cell;
pub mod header;
pub mod serial;
pub mod sheet;
pub mod workbook;

pub use cell::{coerce_date, format_date, format_timestamp, CellValue};
pub use header::HeaderIndex;
pub use sheet::{Extent, Sheet};
pub use workbook::Workbook;
