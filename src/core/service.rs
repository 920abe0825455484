//! Complaint intake service: the entry points a presentation layer calls.
//!
//! Submission flow: validate form → detect offenses → classify → build
//! record → append. Nothing is persisted unless every earlier step
//! succeeded. When only the append fails, the finished submission is handed
//! back inside the error so it can be retried without re-entering the form.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::adapters::{detect_with_timeout, DetectionError, Detector};
use crate::core::classifier::Classifier;
use crate::core::record::build_record;
use crate::core::store::{ComplaintStore, StoreError};
use crate::domain::{
    ClassificationResult, ComplaintForm, ComplaintRecord, ValidationError, MAX_CONTENT_CHARS,
};

/// Default bound on a single detection call
pub const DEFAULT_DETECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a submission did not produce a stored record
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Detection(#[from] DetectionError),

    /// The record was built but could not be stored
    #[error("{source}")]
    Store {
        #[source]
        source: StoreError,
        submission: Box<Submission>,
    },
}

impl SubmitError {
    /// Labels, classification and record, when the failure happened at persistence
    pub fn pending_submission(&self) -> Option<&Submission> {
        match self {
            SubmitError::Store { submission, .. } => Some(&**submission),
            _ => None,
        }
    }

    /// The built record, when the failure happened at persistence
    pub fn pending_record(&self) -> Option<&ComplaintRecord> {
        self.pending_submission().map(|submission| &submission.record)
    }
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    /// Labels returned by the detector, in detection order
    pub labels: Vec<String>,

    /// One classification per label
    pub classification: Vec<ClassificationResult>,

    /// The record that was (or is pending to be) appended
    pub record: ComplaintRecord,
}

/// Complaint intake service
pub struct ComplaintService {
    detector: Arc<dyn Detector>,
    classifier: Classifier,
    store: ComplaintStore,
    detection_timeout: Duration,
    max_content_chars: usize,
}

impl ComplaintService {
    pub fn new(detector: Arc<dyn Detector>, classifier: Classifier, store: ComplaintStore) -> Self {
        Self {
            detector,
            classifier,
            store,
            detection_timeout: DEFAULT_DETECTION_TIMEOUT,
            max_content_chars: MAX_CONTENT_CHARS,
        }
    }

    pub fn with_detection_timeout(mut self, timeout: Duration) -> Self {
        self.detection_timeout = timeout;
        self
    }

    /// Tighten the content limit; values above `MAX_CONTENT_CHARS` are capped
    pub fn with_max_content_chars(mut self, limit: usize) -> Self {
        self.max_content_chars = limit.min(MAX_CONTENT_CHARS);
        self
    }

    pub fn store(&self) -> &ComplaintStore {
        &self.store
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Process one form submission end to end
    pub async fn submit(&self, form: ComplaintForm) -> Result<Submission, SubmitError> {
        form.validate(self.max_content_chars)?;

        let content_hash = hash_content(&form.content);
        tracing::info!(
            content_hash = %content_hash,
            detector = self.detector.name(),
            "Analyzing complaint"
        );

        let labels =
            detect_with_timeout(self.detector.as_ref(), &form.content, self.detection_timeout).await?;
        let classification = self.classifier.classify(&labels);
        let submission = Submission {
            record: build_record(&form, &classification),
            labels,
            classification,
        };

        if let Err(source) = self.store.append(&submission.record).await {
            tracing::warn!(content_hash = %content_hash, error = %source, "Failed to store complaint");
            return Err(SubmitError::Store {
                source,
                submission: Box::new(submission),
            });
        }

        tracing::info!(
            content_hash = %content_hash,
            labels = submission.labels.len(),
            matched = submission.classification.iter().filter(|r| r.is_found()).count(),
            "Complaint registered"
        );

        Ok(submission)
    }

    /// Store a record whose earlier append failed
    pub async fn retry_append(&self, record: &ComplaintRecord) -> Result<(), StoreError> {
        self.store.append(record).await
    }

    /// Every stored complaint
    pub async fn list_all(&self) -> Result<Vec<ComplaintRecord>, StoreError> {
        self.store.list_all().await
    }

    /// Delete every stored complaint
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.clear().await
    }
}

/// Hash complaint content for logging (first 16 hex chars of SHA256)
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}
