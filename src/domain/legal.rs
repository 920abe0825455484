//! Legal reference data and classification output.
//!
//! A `LegalTable` is the offense → penalty lookup loaded once at startup.
//! A `ClassificationResult` is what a single detected label resolves to.

use serde::{Deserialize, Serialize};

/// Sentinel written into every field of a result whose label has no entry
pub const NOT_FOUND: &str = "No encontrado";

/// Placeholder for optional legal table cells that are absent or empty
pub const NOT_AVAILABLE: &str = "N/A";

/// A single row of the legal reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalEntry {
    /// Offense code / legal article (matched case-insensitively)
    pub offense_code: String,

    /// Prison penalty, or "N/A"
    pub prison_penalty: String,

    /// Fine, or "N/A"
    pub fine: String,
}

impl LegalEntry {
    pub fn new(
        offense_code: impl Into<String>,
        prison_penalty: impl Into<String>,
        fine: impl Into<String>,
    ) -> Self {
        Self {
            offense_code: offense_code.into(),
            prison_penalty: prison_penalty.into(),
            fine: fine.into(),
        }
    }
}

/// Immutable, ordered legal reference table
///
/// Offense codes need not be unique; lookups return the first match in
/// table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegalTable {
    entries: Vec<LegalEntry>,
}

impl LegalTable {
    pub fn new(entries: Vec<LegalEntry>) -> Self {
        Self { entries }
    }

    /// First entry whose offense code equals `code`, ignoring case
    pub fn lookup(&self, code: &str) -> Option<&LegalEntry> {
        let wanted = code.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.offense_code.to_lowercase() == wanted)
    }

    pub fn entries(&self) -> &[LegalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<LegalEntry> for LegalTable {
    fn from_iter<I: IntoIterator<Item = LegalEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Outcome of classifying one detected offense label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The label exactly as the detector produced it
    #[serde(rename = "Delito")]
    pub detected_label: String,

    #[serde(rename = "Pena Prision")]
    pub prison_penalty: String,

    #[serde(rename = "Multa")]
    pub fine: String,

    #[serde(rename = "Articulo")]
    pub article: String,
}

impl ClassificationResult {
    /// Result for a label that resolved to `entry`
    pub fn matched(label: impl Into<String>, entry: &LegalEntry) -> Self {
        Self {
            detected_label: label.into(),
            prison_penalty: entry.prison_penalty.clone(),
            fine: entry.fine.clone(),
            article: entry.offense_code.clone(),
        }
    }

    /// Result for a label with no legal entry
    pub fn not_found(label: impl Into<String>) -> Self {
        Self {
            detected_label: label.into(),
            prison_penalty: NOT_FOUND.to_string(),
            fine: NOT_FOUND.to_string(),
            article: NOT_FOUND.to_string(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.article != NOT_FOUND
    }
}
