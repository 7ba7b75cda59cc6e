use super::{http_client, read_body, with_transport_retry, GatewayError, ImageLabeler};
use crate::models::classify_types::DetectionResult;
use crate::services::config::{ApiConfig, RetryPolicy};
use futures::future::{BoxFuture, FutureExt};
use log::{debug, info, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

const FALLBACK_MIME: &str = "image/jpeg";

/// Hugging Face image-classification model behind the Inference API.
pub struct HfImageLabeler {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
}

impl HfImageLabeler {
    pub fn from_config(config: &ApiConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: http_client(config)?,
            endpoint: config.image_model_url(),
            api_key: config.hf_api_key.clone(),
            retry: config.retry,
        })
    }

    async fn detect_once(&self, image: &[u8], mime_type: &str) -> Result<DetectionResult, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, mime_type)
            .body(image.to_vec())
            .send()
            .await?;

        debug!("Image labeling API status: {}", response.status());
        let body = read_body(response).await?;
        top_prediction(&parse_lenient(&body))
    }
}

impl ImageLabeler for HfImageLabeler {
    fn detect<'a>(
        &'a self,
        image: &'a [u8],
        mime_type: &'a str,
    ) -> BoxFuture<'a, Result<DetectionResult, GatewayError>> {
        async move {
            if image.is_empty() {
                return Err(GatewayError::invalid_input("image payload is empty"));
            }
            let mime_type = effective_mime(mime_type);
            info!(
                "Sending {} bytes ({}) to {}",
                image.len(),
                mime_type,
                self.endpoint
            );
            with_transport_retry(&self.retry, "Image labeling request", || {
                self.detect_once(image, mime_type)
            })
            .await
        }
        .boxed()
    }
}

fn effective_mime(mime_type: &str) -> &str {
    let trimmed = mime_type.trim();
    if trimmed.starts_with("image/") {
        trimmed
    } else {
        FALLBACK_MIME
    }
}

/// A 2xx body that is empty or not JSON reads as no predictions.
fn parse_lenient(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| {
        warn!("Image labeling response is not JSON ({}), treating as no detection", e);
        Value::Null
    })
}

/// First element of a `[{label, score}, ...]` ranking. Anything else counts as no detection.
fn top_prediction(body: &Value) -> Result<DetectionResult, GatewayError> {
    let first = body
        .as_array()
        .and_then(|predictions| predictions.first())
        .ok_or(GatewayError::EmptyResult)?;

    let label = first["label"]
        .as_str()
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .ok_or(GatewayError::EmptyResult)?;
    let score = first["score"].as_f64().ok_or(GatewayError::EmptyResult)?;

    Ok(DetectionResult {
        label: label.to_string(),
        confidence: score.clamp(0.0, 1.0) as f32,
    })
}
