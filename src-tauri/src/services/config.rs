use log::warn;
use std::fmt;
use std::time::Duration;

const DEFAULT_HF_BASE_URL: &str = "https://api-inference.huggingface.co";
const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_IMAGE_MODEL: &str = "microsoft/resnet-50";
const DEFAULT_ZERO_SHOT_MODEL: &str = "facebook/bart-large-mnli";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TRANSPORT_RETRIES: u32 = 2;
const DEFAULT_RETRY_DELAY_MS: u64 = 250;

pub const HF_API_KEY: &str = "HF_API_KEY";
pub const YOUTUBE_API_KEY: &str = "YOUTUBE_API_KEY";
const HF_INFERENCE_URL: &str = "HF_INFERENCE_URL";
const YOUTUBE_API_URL: &str = "YOUTUBE_API_URL";
const HF_IMAGE_MODEL: &str = "HF_IMAGE_MODEL";
const HF_ZERO_SHOT_MODEL: &str = "HF_ZERO_SHOT_MODEL";
const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
const TRANSPORT_RETRIES: &str = "TRANSPORT_RETRIES";

/// Retries apply to transport failures only. Upstream answers are never retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Exponential backoff: base, 2x base, 4x base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_TRANSPORT_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct ApiConfig {
    pub hf_api_key: String,
    pub youtube_api_key: String,
    pub hf_base_url: String,
    pub youtube_base_url: String,
    pub image_model: String,
    pub zero_shot_model: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

// Keys stay out of the logs.
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("hf_api_key", &redact(&self.hf_api_key))
            .field("youtube_api_key", &redact(&self.youtube_api_key))
            .field("hf_base_url", &self.hf_base_url)
            .field("youtube_base_url", &self.youtube_base_url)
            .field("image_model", &self.image_model)
            .field("zero_shot_model", &self.zero_shot_model)
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

fn redact(key: &str) -> &'static str {
    if key.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            hf_api_key: String::new(),
            youtube_api_key: String::new(),
            hf_base_url: DEFAULT_HF_BASE_URL.to_string(),
            youtube_base_url: DEFAULT_YOUTUBE_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            zero_shot_model: DEFAULT_ZERO_SHOT_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

impl ApiConfig {
    /// Reads the process environment, falling back to values baked in at build time.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| build_time_value(key))
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, fallback: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };

        let request_timeout = parse_number(&lookup, REQUEST_TIMEOUT_SECS)
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let max_retries = parse_number(&lookup, TRANSPORT_RETRIES)
            .map(|n| n.min(u32::MAX as u64) as u32)
            .unwrap_or(defaults.retry.max_retries);

        Self {
            hf_api_key: text(HF_API_KEY, defaults.hf_api_key),
            youtube_api_key: text(YOUTUBE_API_KEY, defaults.youtube_api_key),
            hf_base_url: text(HF_INFERENCE_URL, defaults.hf_base_url),
            youtube_base_url: text(YOUTUBE_API_URL, defaults.youtube_base_url),
            image_model: text(HF_IMAGE_MODEL, defaults.image_model),
            zero_shot_model: text(HF_ZERO_SHOT_MODEL, defaults.zero_shot_model),
            request_timeout,
            retry: RetryPolicy {
                max_retries,
                ..defaults.retry
            },
        }
    }

    /// Names of API keys that are empty. These are only reported, never enforced.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.hf_api_key.is_empty() {
            missing.push(HF_API_KEY);
        }
        if self.youtube_api_key.is_empty() {
            missing.push(YOUTUBE_API_KEY);
        }
        missing
    }

    pub fn image_model_url(&self) -> String {
        model_url(&self.hf_base_url, &self.image_model)
    }

    pub fn zero_shot_model_url(&self) -> String {
        model_url(&self.hf_base_url, &self.zero_shot_model)
    }

    pub fn video_search_url(&self) -> String {
        format!("{}/search", self.youtube_base_url.trim_end_matches('/'))
    }
}

fn model_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/models/{}",
        base_url.trim_end_matches('/'),
        model.trim_matches('/')
    )
}

fn parse_number<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a whole number", key, raw);
            None
        }
    }
}

fn build_time_value(key: &str) -> Option<String> {
    let value = match key {
        HF_API_KEY => option_env!("HF_API_KEY"),
        YOUTUBE_API_KEY => option_env!("YOUTUBE_API_KEY"),
        HF_INFERENCE_URL => option_env!("HF_INFERENCE_URL"),
        YOUTUBE_API_URL => option_env!("YOUTUBE_API_URL"),
        HF_IMAGE_MODEL => option_env!("HF_IMAGE_MODEL"),
        HF_ZERO_SHOT_MODEL => option_env!("HF_ZERO_SHOT_MODEL"),
        REQUEST_TIMEOUT_SECS => option_env!("REQUEST_TIMEOUT_SECS"),
        TRANSPORT_RETRIES => option_env!("TRANSPORT_RETRIES"),
        _ => None,
    };
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
