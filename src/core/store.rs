//! Complaint store: a single CSV file rewritten on every append.
//!
//! Every append reads the whole table, adds one row and rewrites the file
//! with the fixed `STORE_COLUMNS` header, so rows written under an older
//! column layout are migrated on the next write. There is no row identity.
//!
//! A store opened on a spreadsheet path (`registro.xlsx`) reads that workbook
//! as its initial content and writes to the CSV next to it
//! (`registro.csv`); the workbook is never written.
//!
//! Writers are serialized by an in-process mutex and an advisory lock on a
//! sidecar `<store>.lock` file. File work runs on the blocking pool. The new
//! content goes to a temporary file in the same directory and is renamed over
//! the store, but a crash between the two can still leave a stale temporary
//! file behind.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use fs2::FileExt;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::Mutex;

use super::tabular::{is_spreadsheet, read_spreadsheet, SpreadsheetError};
use crate::domain::{ComplaintRecord, Role, STORE_COLUMNS};

/// Column names written by the earlier layout, mapped to `STORE_COLUMNS` indexes
const LEGACY_COLUMNS: &[(&str, usize)] = &[
    ("Indiciado_Nombre", 3),
    ("Indiciado_Doc", 4),
    ("Indiciado_Email", 5),
    ("Victima_Nombre", 7),
    ("Victima_Doc", 8),
    ("Victima_Email", 9),
    ("Artículo", 11),
];

/// Errors reading or writing the complaint store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Store spreadsheet error: {0}")]
    Spreadsheet(#[from] SpreadsheetError),

    #[error("Malformed store row at line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("Failed to lock store {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// File-backed complaint store
pub struct ComplaintStore {
    files: StoreFiles,

    /// Held across each read-modify-write cycle
    guard: Mutex<()>,
}

impl ComplaintStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let requested = path.into();
        let (path, legacy) = if is_spreadsheet(&requested) {
            (requested.with_extension("csv"), Some(requested))
        } else {
            (requested, None)
        };

        let mut lock_name = path.as_os_str().to_owned();
        lock_name.push(".lock");

        Self {
            files: StoreFiles {
                path,
                legacy,
                lock_path: PathBuf::from(lock_name),
            },
            guard: Mutex::new(()),
        }
    }

    /// The CSV file appends are written to
    pub fn path(&self) -> &Path {
        &self.files.path
    }

    /// Read-only spreadsheet the store was opened on, if any
    pub fn legacy_source(&self) -> Option<&Path> {
        self.files.legacy.as_deref()
    }

    /// Append one record, rewriting the whole file
    pub async fn append(&self, record: &ComplaintRecord) -> Result<(), StoreError> {
        let _guard = self.guard.lock().await;
        let record = record.clone();

        let total = self.blocking(move |files| files.append(record)).await?;
        tracing::info!(path = %self.files.path.display(), total, "Appended complaint");
        Ok(())
    }

    /// All stored records in insertion order; empty when the file is absent
    pub async fn list_all(&self) -> Result<Vec<ComplaintRecord>, StoreError> {
        let _guard = self.guard.lock().await;
        self.blocking(|files| files.list_all()).await
    }

    /// Delete the store file (and the spreadsheet it was opened on); a
    /// missing file is not an error
    ///
    /// The `<store>.lock` file stays: another process may be blocked on it,
    /// and unlinking it would let a later writer lock a different inode.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.guard.lock().await;

        if self.blocking(|files| files.clear()).await? {
            tracing::info!(path = %self.files.path.display(), "Cleared complaint store");
        }
        Ok(())
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(StoreFiles) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let files = self.files.clone();
        tokio::task::spawn_blocking(move || op(files)).await?
    }
}

/// Paths of one store; every method blocks on file locks and I/O
#[derive(Debug, Clone)]
struct StoreFiles {
    path: PathBuf,
    legacy: Option<PathBuf>,
    lock_path: PathBuf,
}

impl StoreFiles {
    fn append(&self, record: ComplaintRecord) -> Result<usize, StoreError> {
        let dir = parent_dir(&self.path);
        std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(|source| self.lock_error(source))?;

        let mut records = self.read_current()?;
        records.push(record);
        write_records(&self.path, &records)?;

        // Lock is released when file is dropped
        Ok(records.len())
    }

    fn list_all(&self) -> Result<Vec<ComplaintRecord>, StoreError> {
        if self.current_source().is_none() {
            return Ok(Vec::new());
        }

        let lock = self.open_lock()?;
        lock.lock_shared().map_err(|source| self.lock_error(source))?;

        self.read_current()
    }

    /// Returns whether anything was removed
    fn clear(&self) -> Result<bool, StoreError> {
        if self.current_source().is_none() {
            return Ok(false);
        }

        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(|source| self.lock_error(source))?;

        let mut removed = false;
        for path in std::iter::once(&self.path).chain(self.legacy.as_ref()) {
            match std::fs::remove_file(path) {
                Ok(()) => removed = true,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::io(path, e)),
            }
        }

        Ok(removed)
    }

    /// The CSV once written, otherwise the spreadsheet it was opened on
    fn current_source(&self) -> Option<&Path> {
        if self.path.exists() {
            return Some(&self.path);
        }
        self.legacy.as_deref().filter(|legacy| legacy.exists())
    }

    fn read_current(&self) -> Result<Vec<ComplaintRecord>, StoreError> {
        match self.current_source() {
            Some(path) => read_records(path),
            None => Ok(Vec::new()),
        }
    }

    fn open_lock(&self) -> Result<File, StoreError> {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|source| self.lock_error(source))
    }

    fn lock_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Lock {
            path: self.lock_path.clone(),
            source,
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Read every row of `path`, mapping columns by header name
///
/// Spreadsheets are read through calamine, anything else as CSV.
fn read_records(path: &Path) -> Result<Vec<ComplaintRecord>, StoreError> {
    if is_spreadsheet(path) {
        let sheet = read_spreadsheet(path)?;
        let columns = column_map(&sheet.headers);
        return sheet
            .rows
            .iter()
            .map(|(line, cells)| parse_row(cells, &columns, *line))
            .collect();
    }

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let columns = column_map(&headers);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let cells: Vec<String> = row.iter().map(String::from).collect();
        records.push(parse_row(&cells, &columns, line)?);
    }

    Ok(records)
}

/// For each canonical column, the index of the matching header (if any)
fn column_map(headers: &[String]) -> [Option<usize>; 13] {
    let names: Vec<&str> = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect();

    let mut columns = [None; 13];
    for (i, canonical) in STORE_COLUMNS.iter().enumerate() {
        columns[i] = names.iter().position(|name| name == canonical);
    }
    for (legacy, i) in LEGACY_COLUMNS {
        if columns[*i].is_none() {
            columns[*i] = names.iter().position(|name| name == legacy);
        }
    }

    columns
}

fn parse_row(
    row: &[String],
    columns: &[Option<usize>; 13],
    line: u64,
) -> Result<ComplaintRecord, StoreError> {
    let cell = |i: usize| -> String {
        columns[i]
            .and_then(|idx| row.get(idx))
            .cloned()
            .unwrap_or_default()
    };

    let raw_date = cell(0);
    let date = parse_date(&raw_date).ok_or_else(|| StoreError::Malformed {
        line,
        message: format!("invalid date '{}'", raw_date),
    })?;

    let role = cell(6).parse::<Role>().map_err(|e| StoreError::Malformed {
        line,
        message: format!("{}", e),
    })?;

    Ok(ComplaintRecord {
        date,
        location: cell(1),
        content: cell(2),
        accused_name: cell(3),
        accused_doc_id: cell(4),
        accused_email: cell(5),
        role,
        victim_name: cell(7),
        victim_doc_id: cell(8),
        victim_email: cell(9),
        offense_labels: cell(10),
        article: cell(11),
        classification_dump: cell(12),
    })
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Rewrite `path` with `records` under the canonical header
fn write_records(path: &Path, records: &[ComplaintRecord]) -> Result<(), StoreError> {
    let dir = parent_dir(path);
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;

    {
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        writer.write_record(STORE_COLUMNS)?;
        for record in records {
            writer.write_record(record.to_row())?;
        }
        writer.flush().map_err(|e| StoreError::io(path, e))?;
    }

    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(path, e))?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;

    Ok(())
}
