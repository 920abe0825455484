//! Domain types for complaint intake.
//!
//! This module contains the core data structures:
//! - Legal: reference table entries and classification results
//! - Complaint: form input, roles and the persisted record

pub mod complaint;
pub mod legal;

// Re-export commonly used types
pub use complaint::{
    ComplaintForm, ComplaintRecord, Role, UnknownRole, ValidationError, MAX_CONTENT_CHARS,
    STORE_COLUMNS,
};
pub use legal::{ClassificationResult, LegalEntry, LegalTable, NOT_AVAILABLE, NOT_FOUND};
