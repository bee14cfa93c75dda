//! HTTP client for the external cloud-probability model.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use compositing::{CloudClassifier, CompositingError, CompositingResult};

/// Default inference endpoint, overridable with `CLOUD_MODEL_URL`.
pub const DEFAULT_MODEL_URL: &str = "http://localhost:8501";

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    bands: &'a [Vec<f32>],
    width: usize,
    height: usize,
}

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    probabilities: Vec<f32>,
}

/// Cloud-probability model served over HTTP.
///
/// Takes scale-normalized reflectance bands and returns one probability per
/// pixel, row-major.
pub struct InferenceClient {
    http: Client,
    model_url: String,
}

impl InferenceClient {
    pub fn new(model_url: impl Into<String>) -> CompositingResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CompositingError::Classifier(e.to_string()))?;
        Ok(Self {
            http,
            model_url: model_url.into(),
        })
    }
}

#[async_trait]
impl CloudClassifier for InferenceClient {
    async fn cloud_probability(
        &self,
        normalized_bands: &[Vec<f32>],
        width: usize,
        height: usize,
    ) -> CompositingResult<Vec<f32>> {
        let body = InferenceRequest {
            bands: normalized_bands,
            width,
            height,
        };

        let response = self
            .http
            .post(format!("{}/predict", self.model_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| CompositingError::Classifier(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CompositingError::Classifier(format!(
                "model returned {status}: {text}"
            )));
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| CompositingError::Classifier(e.to_string()))?;

        debug!(
            pixels = parsed.probabilities.len(),
            "cloud probabilities received"
        );
        Ok(parsed.probabilities)
    }
}
