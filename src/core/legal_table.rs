//! Legal reference table loading.
//!
//! The table is a CSV file or a spreadsheet (`.xlsx` and friends, first
//! worksheet) with a header row. `Articulo` (or `Artículo`) is required;
//! `Pena Prision` (or the older `Pena`) and `Multa` are optional and default
//! to "N/A".
//!
//! Loaded tables are cached per path by `LegalTableCache`. There is no
//! invalidation: edits to the file are seen only by a fresh cache.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use super::tabular::{is_spreadsheet, read_spreadsheet, SpreadsheetError};
use crate::domain::{LegalEntry, LegalTable, NOT_AVAILABLE};

// Listed in priority order: a canonical header wins over a legacy one
const CODE_COLUMNS: &[&str] = &["articulo", "artículo"];
const PRISON_COLUMNS: &[&str] = &["pena prision", "pena prisión", "pena"];
const FINE_COLUMNS: &[&str] = &["multa"];

/// The legal table could not be loaded; fatal at startup
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("Legal table not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read legal table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed legal table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed legal table: {0}")]
    Spreadsheet(#[from] SpreadsheetError),

    #[error("Legal table is missing required column: {0}")]
    MissingColumn(&'static str),
}

/// Load a legal table from disk (uncached)
///
/// The reader is picked by extension: spreadsheets through calamine,
/// anything else as CSV.
pub fn load_legal_table(path: &Path) -> Result<LegalTable, DataLoadError> {
    let table = if is_spreadsheet(path) {
        if !path.exists() {
            return Err(DataLoadError::NotFound(path.to_path_buf()));
        }
        let sheet = read_spreadsheet(path)?;
        table_from_rows(&sheet.headers, sheet.rows.into_iter().map(|(_, cells)| Ok(cells)))?
    } else {
        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                DataLoadError::NotFound(path.to_path_buf())
            } else {
                DataLoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        parse_legal_table(bytes.as_slice())?
    };

    tracing::info!(path = %path.display(), entries = table.len(), "Loaded legal table");
    Ok(table)
}

/// Parse a legal table from any CSV source
pub fn parse_legal_table<R: Read>(reader: R) -> Result<LegalTable, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let rows = reader
        .into_records()
        .map(|row| -> Result<Vec<String>, DataLoadError> { Ok(row?.iter().map(String::from).collect()) });

    table_from_rows(&headers, rows)
}

fn table_from_rows<I>(headers: &[String], rows: I) -> Result<LegalTable, DataLoadError>
where
    I: IntoIterator<Item = Result<Vec<String>, DataLoadError>>,
{
    let code_idx = find_column(headers, CODE_COLUMNS).ok_or(DataLoadError::MissingColumn("Articulo"))?;
    let prison_idx = find_column(headers, PRISON_COLUMNS);
    let fine_idx = find_column(headers, FINE_COLUMNS);

    let mut entries = Vec::new();
    for row in rows {
        let row = row?;
        let code = row.get(code_idx).map(|c| c.trim()).unwrap_or("");
        if code.is_empty() {
            continue;
        }

        entries.push(LegalEntry::new(
            code,
            optional_cell(&row, prison_idx),
            optional_cell(&row, fine_idx),
        ));
    }

    Ok(LegalTable::new(entries))
}

/// Index of the header matching the earliest of `names` (case-insensitive)
fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();

    names
        .iter()
        .find_map(|name| normalized.iter().position(|header| header.as_str() == *name))
}

fn optional_cell(row: &[String], idx: Option<usize>) -> String {
    match idx.and_then(|i| row.get(i)).map(|value| value.trim()) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Process-lifetime cache of loaded legal tables, keyed by path
///
/// Constructed explicitly and owned by whoever needs it; repeated loads of
/// the same path return the table read the first time.
#[derive(Debug, Default)]
pub struct LegalTableCache {
    tables: Mutex<HashMap<PathBuf, Arc<LegalTable>>>,
}

impl LegalTableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, reading the file only on the first call
    ///
    /// Failed loads are not cached.
    pub fn load(&self, path: &Path) -> Result<Arc<LegalTable>, DataLoadError> {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(table) = tables.get(path) {
            tracing::debug!(path = %path.display(), "Legal table cache hit");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(load_legal_table(path)?);
        tables.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.tables.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_table(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("delitos.csv");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_canonical_columns() {
        let csv = "Articulo,Pena Prision,Multa\nHurto,1-3 años,10 SMLV\nLesiones,2-4 años,\n";
        let table = parse_legal_table(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0], LegalEntry::new("Hurto", "1-3 años", "10 SMLV"));
        assert_eq!(table.entries()[1].fine, "N/A");
    }

    #[test]
    fn test_parse_accepts_accented_and_legacy_headers() {
        let csv = "Artículo,Pena\nHurto,1-3 años\n";
        let table = parse_legal_table(csv.as_bytes()).unwrap();

        assert_eq!(table.entries()[0].offense_code, "Hurto");
        assert_eq!(table.entries()[0].prison_penalty, "1-3 años");
        assert_eq!(table.entries()[0].fine, "N/A");
    }

    #[test]
    fn test_parse_only_code_column() {
        let table = parse_legal_table("Articulo\nHurto\n\nEstafa\n".as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[1].prison_penalty, "N/A");
    }

    #[test]
    fn test_missing_code_column_fails() {
        let result = parse_legal_table("Delito,Pena\nHurto,1-3 años\n".as_bytes());
        assert!(matches!(result, Err(DataLoadError::MissingColumn("Articulo"))));
    }

    #[test]
    fn test_canonical_prison_column_wins_over_legacy() {
        let csv = "Articulo,Pena,Pena Prision,Multa\nHurto,viejo,1-3 años,10 SMLV\n";
        let table = parse_legal_table(csv.as_bytes()).unwrap();

        assert_eq!(table.entries()[0].prison_penalty, "1-3 años");
        assert_eq!(table.entries()[0].fine, "10 SMLV");
    }

    #[test]
    fn test_invalid_utf8_is_csv_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("delitos.csv");
        std::fs::write(&path, b"Articulo,Multa\n\xff\xfe,10\n").unwrap();

        let result = load_legal_table(&path);
        assert!(matches!(result, Err(DataLoadError::Csv(_))));
    }

    #[test]
    fn test_directory_at_table_path_is_io_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("delitos.csv");
        std::fs::create_dir(&path).unwrap();

        match load_legal_table(&path) {
            Err(DataLoadError::Io { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_xlsx_table() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("DELITOS Y PENAS CLASIFICADAS.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in ["Articulo", "Pena Prision", "Multa"].iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_string(1, 0, "Hurto").unwrap();
        sheet.write_string(1, 1, "1-3 años").unwrap();
        sheet.write_number(1, 2, 10).unwrap();
        sheet.write_string(2, 0, "Homicidio").unwrap();
        workbook.save(&path).unwrap();

        let table = load_legal_table(&path).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0], LegalEntry::new("Hurto", "1-3 años", "10"));
        assert_eq!(table.entries()[1], LegalEntry::new("Homicidio", "N/A", "N/A"));
    }

    #[test]
    fn test_missing_xlsx_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_legal_table(&temp.path().join("tabla.xlsx"));
        assert!(matches!(result, Err(DataLoadError::NotFound(_))));
    }

    #[test]
    fn test_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let result = load_legal_table(&temp.path().join("nope.csv"));
        assert!(matches!(result, Err(DataLoadError::NotFound(_))));
    }

    #[test]
    fn test_cache_does_not_reread_file() {
        let temp = TempDir::new().unwrap();
        let path = write_table(&temp, "Articulo,Pena Prision,Multa\nHurto,1-3 años,10 SMLV\n");

        let cache = LegalTableCache::new();
        let first = cache.load(&path).unwrap();

        // Changes on disk are not observed by the same cache
        std::fs::write(&path, "Articulo\nEstafa\n").unwrap();
        let second = cache.load(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.entries()[0].offense_code, "Hurto");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_does_not_keep_failures() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("delitos.csv");
        let cache = LegalTableCache::new();

        assert!(cache.load(&path).is_err());
        assert!(cache.is_empty());

        std::fs::write(&path, "Articulo\nHurto\n").unwrap();
        assert_eq!(cache.load(&path).unwrap().len(), 1);
    }
}
