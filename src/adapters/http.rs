//! Remote offense detection over HTTP.
//!
//! Endpoint: POST <endpoint> with `{"text": "..."}`
//! Response: `{"labels": ["...", ...]}`
//! Auth: optional Bearer token

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{DetectionError, Detector};

/// Request body sent to the detection service
#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    text: &'a str,
}

/// Response from the detection service
#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    labels: Vec<String>,
}

/// Detector backed by a remote service
pub struct HttpDetector {
    endpoint: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpDetector {
    /// Create a detector; `request_timeout` bounds each HTTP call
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, DetectionError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| DetectionError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            token,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Detector for HttpDetector {
    fn name(&self) -> &str {
        "http"
    }

    async fn detect(&self, text: &str) -> Result<Vec<String>, DetectionError> {
        let mut request = self.client.post(&self.endpoint).json(&DetectRequest { text });
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            DetectionError::Unavailable(format!("Request to {} failed: {}", self.endpoint, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DetectionError::Unavailable(format!(
                "Detection service returned {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: DetectResponse = response.json().await.map_err(|e| {
            DetectionError::Unavailable(format!("Invalid detection response: {}", e))
        })?;

        tracing::debug!(count = parsed.labels.len(), "Remote detector returned labels");
        Ok(parsed.labels)
    }
}
