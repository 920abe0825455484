//! Spreadsheet input for the tabular files.
//!
//! Both the legal table and the complaint store are written as CSV, but may
//! be read from `.xlsx` / `.xls` / `.xlsm` / `.ods` workbooks. The first
//! worksheet is used; its first row is the header.

use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use thiserror::Error;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook has no worksheets")]
    NoSheet,
}

/// Header plus data rows, every cell rendered as a trimmed string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRows {
    pub headers: Vec<String>,

    /// (1-based row number within the sheet, cells)
    pub rows: Vec<(u64, Vec<String>)>,
}

/// Whether `path` names a workbook rather than a CSV file
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            SPREADSHEET_EXTENSIONS.iter().any(|known| *known == ext)
        })
        .unwrap_or(false)
}

/// Read the first worksheet of the workbook at `path`
pub fn read_spreadsheet(path: &Path) -> Result<SheetRows, SpreadsheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SpreadsheetError::NoSheet)??;

    let first_row = range.start().map(|(row, _)| u64::from(row)).unwrap_or(0);
    let mut rows = range.rows().enumerate();

    let headers = match rows.next() {
        Some((_, cells)) => cells.iter().map(cell_text).collect(),
        None => return Ok(SheetRows::default()),
    };

    let rows = rows
        .map(|(i, cells)| (first_row + i as u64 + 1, cells.iter().map(cell_text).collect()))
        .filter(|(_, cells): &(u64, Vec<String>)| cells.iter().any(|c| !c.is_empty()))
        .collect();

    Ok(SheetRows { headers, rows })
}

/// Render a cell the way it reads in the sheet; date cells become `YYYY-MM-DD`
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        _ => cell.to_string().trim().to_string(),
    }
}
