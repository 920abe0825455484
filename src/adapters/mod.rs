//! Offense detection capability.
//!
//! A detector turns complaint text into an ordered list of offense labels.
//! The classifier never depends on a concrete provider: the fixed stub is
//! used by default and in tests, the HTTP detector delegates to a remote
//! service.

pub mod fixed;
pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::timeout;

pub use fixed::FixedDetector;
pub use http::HttpDetector;

/// Detection could not produce labels; nothing should be persisted
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetectionError {
    #[error("Offense detection unavailable: {0}")]
    Unavailable(String),

    #[error("Offense detection timed out after {0:?}")]
    Timeout(Duration),
}

/// Trait for offense detectors
#[async_trait]
pub trait Detector: Send + Sync {
    /// Human-readable detector name
    fn name(&self) -> &str;

    /// Detect offense labels in `text`, in detector-defined order
    async fn detect(&self, text: &str) -> Result<Vec<String>, DetectionError>;
}

/// Run `detector` bounded by `limit`; expiry is reported as unavailability
pub async fn detect_with_timeout(
    detector: &dyn Detector,
    text: &str,
    limit: Duration,
) -> Result<Vec<String>, DetectionError> {
    match timeout(limit, detector.detect(text)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(detector = detector.name(), ?limit, "Offense detection timed out");
            Err(DetectionError::Timeout(limit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowDetector;

    #[async_trait]
    impl Detector for SlowDetector {
        fn name(&self) -> &str {
            "slow"
        }

        async fn detect(&self, _text: &str) -> Result<Vec<String>, DetectionError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec!["Robo".to_string()])
        }
    }

    #[tokio::test]
    async fn test_timeout_maps_to_detection_error() {
        let result = detect_with_timeout(&SlowDetector, "texto", Duration::from_millis(20)).await;
        assert_eq!(result, Err(DetectionError::Timeout(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn test_fast_detector_passes_through() {
        let detector = FixedDetector::default();
        let labels = detect_with_timeout(&detector, "texto", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(labels, vec!["Robo", "Amenazas"]);
    }
}
