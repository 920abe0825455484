//! Complaint form input and the normalized record persisted per submission.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of characters accepted in a complaint's content
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Fixed column order of the complaint store
pub const STORE_COLUMNS: [&str; 13] = [
    "Fecha",
    "Lugar",
    "Contenido",
    "Nombre del Indiciado",
    "Documento de Identidad",
    "Correo del Indiciado",
    "Rol",
    "Nombre de la Víctima",
    "Documento de Identidad de la Víctima",
    "Correo de la Víctima",
    "Delitos",
    "Articulo",
    "Clasificacion",
];

/// Who is filing the complaint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The filer is the victim; no separate victim data is recorded
    #[default]
    #[serde(rename = "Víctima")]
    Victim,

    /// The filer reports on behalf of a victim
    #[serde(rename = "Denunciante")]
    Complainant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Victim => "Víctima",
            Role::Complainant => "Denunciante",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "víctima" | "victima" | "victim" => Ok(Role::Victim),
            "denunciante" | "complainant" => Ok(Role::Complainant),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Raw field values as submitted by the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintForm {
    /// Date of the events (today when absent)
    pub date: Option<NaiveDate>,
    pub location: String,
    pub content: String,
    pub accused_name: String,
    pub accused_doc_id: String,
    pub accused_email: String,
    pub role: Role,
    pub victim_name: String,
    pub victim_doc_id: String,
    pub victim_email: String,
}

/// Form rejected before any detection or persistence happens
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Complaint content is empty")]
    EmptyContent,

    #[error("Complaint content too long: {actual} > {limit} characters")]
    ContentTooLong { actual: usize, limit: usize },
}

impl ComplaintForm {
    /// Check the content against emptiness and the character limit
    pub fn validate(&self, max_content_chars: usize) -> Result<(), ValidationError> {
        if self.content.trim().is_empty() {
            return Err(ValidationError::EmptyContent);
        }

        let actual = self.content.chars().count();
        if actual > max_content_chars {
            return Err(ValidationError::ContentTooLong {
                actual,
                limit: max_content_chars,
            });
        }

        Ok(())
    }
}

/// A normalized complaint, one per successful submission
///
/// Field order mirrors `STORE_COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub date: NaiveDate,
    pub location: String,
    pub content: String,
    pub accused_name: String,
    pub accused_doc_id: String,
    pub accused_email: String,
    pub role: Role,
    pub victim_name: String,
    pub victim_doc_id: String,
    pub victim_email: String,

    /// Resolved offenses, comma-joined
    pub offense_labels: String,

    /// Matched articles, comma-joined
    pub article: String,

    /// JSON dump of the classification sequence (audit only)
    pub classification_dump: String,
}

impl ComplaintRecord {
    /// Cell values in `STORE_COLUMNS` order
    pub fn to_row(&self) -> [String; 13] {
        [
            self.date.format("%Y-%m-%d").to_string(),
            self.location.clone(),
            self.content.clone(),
            self.accused_name.clone(),
            self.accused_doc_id.clone(),
            self.accused_email.clone(),
            self.role.to_string(),
            self.victim_name.clone(),
            self.victim_doc_id.clone(),
            self.victim_email.clone(),
            self.offense_labels.clone(),
            self.article.clone(),
            self.classification_dump.clone(),
        ]
    }
}
