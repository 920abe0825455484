//! Core complaint processing.
//!
//! This module contains:
//! - LegalTable loading: CSV/spreadsheet reference table and its per-path cache
//! - Classifier: alias resolution and penalty lookup
//! - Record: normalized record assembly
//! - Store: CSV-backed complaint persistence
//! - Tabular: spreadsheet reading shared by the table loader and the store
//! - Service: submit / list / clear entry points

pub mod classifier;
pub mod legal_table;
pub mod record;
pub mod service;
pub mod store;
pub mod tabular;

// Re-export commonly used types
pub use classifier::{classify, classify_with, AliasMap, Classifier};
pub use legal_table::{load_legal_table, parse_legal_table, DataLoadError, LegalTableCache};
pub use record::{build_record, build_record_on};
pub use service::{hash_content, ComplaintService, SubmitError, Submission, DEFAULT_DETECTION_TIMEOUT};
pub use store::{ComplaintStore, StoreError};
pub use tabular::{is_spreadsheet, read_spreadsheet, SheetRows, SpreadsheetError};
