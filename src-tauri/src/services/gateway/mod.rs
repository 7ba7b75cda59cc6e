pub mod image_labeling;
pub mod video_search;
pub mod zero_shot;

use crate::models::classify_types::{ClassificationCandidate, DetectionResult};
use crate::models::video_types::VideoResult;
use crate::services::config::{ApiConfig, RetryPolicy};
use futures::future::BoxFuture;
use log::warn;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatewayError {
    #[error("Network request failed: {message}")]
    Transport { message: String },
    #[error("Upstream returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("Malformed upstream response: {message}")]
    MalformedResponse { message: String },
    #[error("Upstream returned no result")]
    EmptyResult,
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl GatewayError {
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Transport { .. })
    }

    fn malformed(message: impl Into<String>) -> Self {
        GatewayError::MalformedResponse {
            message: message.into(),
        }
    }

    fn invalid_input(message: impl Into<String>) -> Self {
        GatewayError::InvalidInput {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport {
            message: err.to_string(),
        }
    }
}

/// Hosted image-labeling model.
pub trait ImageLabeler: Send + Sync {
    /// Returns the top-ranked label, or `EmptyResult` when nothing was recognised.
    fn detect<'a>(
        &'a self,
        image: &'a [u8],
        mime_type: &'a str,
    ) -> BoxFuture<'a, Result<DetectionResult, GatewayError>>;
}

/// Hosted zero-shot text classifier.
pub trait ZeroShotClassifier: Send + Sync {
    /// Scores returned in upstream order. Callers rank them.
    fn classify<'a>(
        &'a self,
        text: &'a str,
        candidate_labels: &'a [&'a str],
    ) -> BoxFuture<'a, Result<Vec<ClassificationCandidate>, GatewayError>>;
}

/// Hosted video search. Failures degrade to an empty list.
pub trait VideoSearch: Send + Sync {
    fn search<'a>(&'a self, query: &'a str, max_results: usize) -> BoxFuture<'a, Vec<VideoResult>>;
}

pub(crate) fn http_client(config: &ApiConfig) -> Result<reqwest::Client, GatewayError> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(GatewayError::from)
}

/// Runs `op`, retrying transport failures with backoff. Any other outcome is returned as is.
pub(crate) async fn with_transport_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(err) if err.is_transport() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "{} failed (attempt {}): {}. Retrying in {:?}",
                    what,
                    attempt + 1,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Reads a response body, turning non-2xx statuses into `Upstream` errors.
pub(crate) async fn read_body(response: reqwest::Response) -> Result<String, GatewayError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(GatewayError::Upstream {
            status: status.as_u16(),
            message: upstream_message(status, &body),
        });
    }
    Ok(body)
}

/// Like `read_body`, but a 2xx body that is not JSON is `MalformedResponse`.
pub(crate) async fn read_json(response: reqwest::Response) -> Result<Value, GatewayError> {
    let body = read_body(response).await?;
    serde_json::from_str(&body)
        .map_err(|e| GatewayError::malformed(format!("response is not JSON: {}", e)))
}

/// Prefers the provider's own `error` text, then the raw body, then the status reason.
pub(crate) fn upstream_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        match &value["error"] {
            Value::String(message) => return message.clone(),
            Value::Array(items) => {
                let messages: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            Value::Object(details) => {
                if let Some(message) = details.get("message").and_then(Value::as_str) {
                    return message.to_string();
                }
            }
            _ => {}
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn transport() -> GatewayError {
        GatewayError::Transport {
            message: "connection refused".to_string(),
        }
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_transport_errors_are_retried_until_limit() {
        let calls = AtomicU32::new(0);
        let result: Result<(), GatewayError> = with_transport_retry(&fast_policy(2), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(transport()) }
        })
        .await;
        assert_eq!(result, Err(transport()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_transport_retry_recovers() {
        let calls = AtomicU32::new(0);
        let result = with_transport_retry(&fast_policy(2), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(transport())
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(1));
    }

    #[tokio::test]
    async fn test_upstream_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), GatewayError> = with_transport_retry(&fast_policy(5), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(GatewayError::Upstream {
                    status: 500,
                    message: "boom".to_string(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(GatewayError::Upstream { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_upstream_message_prefers_error_field() {
        let body = r#"{"error":"Model microsoft/resnet-50 is currently loading","estimated_time":20.0}"#;
        assert_eq!(
            upstream_message(StatusCode::SERVICE_UNAVAILABLE, body),
            "Model microsoft/resnet-50 is currently loading"
        );
    }

    #[test]
    fn test_upstream_message_reads_nested_error() {
        let body = r#"{"error":{"code":403,"message":"API key not valid"}}"#;
        assert_eq!(
            upstream_message(StatusCode::FORBIDDEN, body),
            "API key not valid"
        );
    }

    #[test]
    fn test_upstream_message_joins_error_list() {
        let body = r#"{"error":["bad input","too large"]}"#;
        assert_eq!(
            upstream_message(StatusCode::BAD_REQUEST, body),
            "bad input; too large"
        );
    }

    #[test]
    fn test_upstream_message_falls_back_to_body_then_reason() {
        assert_eq!(
            upstream_message(StatusCode::BAD_GATEWAY, "  upstream down \n"),
            "upstream down"
        );
        assert_eq!(
            upstream_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_errors_serialize_with_kind() {
        let err = GatewayError::Upstream {
            status: 401,
            message: "Invalid credentials".to_string(),
        };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["kind"], "upstream");
        assert_eq!(value["status"], 401);
        assert_eq!(
            serde_json::to_value(GatewayError::EmptyResult).unwrap()["kind"],
            "empty_result"
        );
    }
}
