//! denuncias - complaint intake with legal classification
//!
//! Records citizen complaints, matches the offenses detected in each
//! complaint against a legal penalty table and persists normalized records
//! to a CSV file.
//!
//! # Pipeline
//!
//! text → `Detector` → labels → `Classifier` → classification →
//! `build_record` → `ComplaintStore::append`
//!
//! # Modules
//!
//! - `adapters`: Offense detectors (fixed stub, HTTP)
//! - `core`: Legal table loading, classification, records, store, service
//! - `domain`: Data structures (LegalEntry, ComplaintRecord, Role)
//! - `config`: Paths and settings
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Register a complaint
//! denuncias submit --content "Me robaron el celular" --place Bogotá
//!
//! # List everything stored
//! denuncias list
//!
//! # Delete the store
//! denuncias clear --yes
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{DetectionError, Detector, FixedDetector, HttpDetector};
pub use crate::core::{
    classify, AliasMap, Classifier, ComplaintService, ComplaintStore, DataLoadError,
    LegalTableCache, StoreError, SubmitError, Submission,
};
pub use domain::{ClassificationResult, ComplaintForm, ComplaintRecord, LegalEntry, LegalTable, Role};
