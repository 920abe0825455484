//! Fixed-output detector.
//!
//! Returns the same labels for any input. The default label set is the one
//! the intake form has always produced while no real detection backend is
//! wired in.

use async_trait::async_trait;

use super::{DetectionError, Detector};

/// Labels returned by `FixedDetector::default()`
pub const DEFAULT_LABELS: [&str; 2] = ["Robo", "Amenazas"];

/// Detector that ignores its input
#[derive(Debug, Clone)]
pub struct FixedDetector {
    labels: Vec<String>,
}

impl Default for FixedDetector {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS)
    }
}

impl FixedDetector {
    pub fn new(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[async_trait]
impl Detector for FixedDetector {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn detect(&self, _text: &str) -> Result<Vec<String>, DetectionError> {
        Ok(self.labels.clone())
    }
}
