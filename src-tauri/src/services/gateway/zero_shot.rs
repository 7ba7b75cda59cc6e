use super::{http_client, read_json, with_transport_retry, GatewayError, ZeroShotClassifier};
use crate::models::classify_types::ClassificationCandidate;
use crate::services::config::{ApiConfig, RetryPolicy};
use futures::future::{BoxFuture, FutureExt};
use log::{debug, info};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

#[derive(Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

/// Hugging Face zero-shot-classification model (an NLI model such as BART-MNLI).
pub struct HfZeroShotClassifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
}

impl HfZeroShotClassifier {
    pub fn from_config(config: &ApiConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: http_client(config)?,
            endpoint: config.zero_shot_model_url(),
            api_key: config.hf_api_key.clone(),
            retry: config.retry,
        })
    }

    async fn classify_once(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<Vec<ClassificationCandidate>, GatewayError> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters { candidate_labels },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        debug!("Zero-shot API status: {}", response.status());
        let body = read_json(response).await?;
        parse_scores(body)
    }
}

impl ZeroShotClassifier for HfZeroShotClassifier {
    fn classify<'a>(
        &'a self,
        text: &'a str,
        candidate_labels: &'a [&'a str],
    ) -> BoxFuture<'a, Result<Vec<ClassificationCandidate>, GatewayError>> {
        async move {
            let text = text.trim();
            if text.is_empty() {
                return Err(GatewayError::invalid_input("text to classify is empty"));
            }
            if candidate_labels.is_empty() {
                return Err(GatewayError::invalid_input("candidate label set is empty"));
            }
            info!("Zero-shot classifying {:?} against {:?}", text, candidate_labels);
            with_transport_retry(&self.retry, "Zero-shot request", || {
                self.classify_once(text, candidate_labels)
            })
            .await
        }
        .boxed()
    }
}

/// Zips the parallel `labels`/`scores` arrays in upstream order.
fn parse_scores(body: Value) -> Result<Vec<ClassificationCandidate>, GatewayError> {
    let response: ZeroShotResponse = serde_json::from_value(body).map_err(|e| {
        GatewayError::malformed(format!("expected labels and scores arrays: {}", e))
    })?;

    if response.labels.len() != response.scores.len() {
        return Err(GatewayError::malformed(format!(
            "{} labels but {} scores",
            response.labels.len(),
            response.scores.len()
        )));
    }

    response
        .labels
        .into_iter()
        .zip(response.scores)
        .map(|(label, score)| {
            if !(0.0..=1.0).contains(&score) {
                return Err(GatewayError::malformed(format!(
                    "score {} for {:?} is not a probability",
                    score, label
                )));
            }
            Ok(ClassificationCandidate::new(label, score as f32))
        })
        .collect()
}
