//! Configuration for the QA agent.
//!
//! Configuration is read from environment variables exactly once, in `main`,
//! and handed to the clients at construction. Variables:
//! - `YANDEX_FOLDER_ID` - Required. Yandex Cloud folder for search and LLM calls.
//! - `YANDEX_API_KEY` - Required. API key for the Yandex search API.
//! - `YC_IAM_TOKEN` - Required. IAM token for YandexGPT completions.
//! - `SEARCH_ENDPOINT` - Optional. Defaults to `https://yandex.ru/search/xml`.
//! - `COMPLETION_ENDPOINT` - Optional. Defaults to the foundation-models completion URL.
//! - `COMPLETION_MODEL` - Optional. Defaults to `yandexgpt-lite`.
//! - `SEARCH_TIMEOUT_SECS` - Optional. Defaults to `30`.
//! - `COMPLETION_TIMEOUT_SECS` - Optional. Defaults to `60`.
//! - `FETCH_TIMEOUT_SECS` - Optional. Defaults to `10`.

use std::time::Duration;
use thiserror::Error;

const DEFAULT_SEARCH_ENDPOINT: &str = "https://yandex.ru/search/xml";
const DEFAULT_COMPLETION_ENDPOINT: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";
const DEFAULT_MODEL: &str = "yandexgpt-lite";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Yandex Cloud folder id, shared by search and completion calls
    pub folder_id: String,

    /// API key for the search API
    pub search_api_key: String,

    /// IAM token for YandexGPT completions
    pub iam_token: String,

    /// Search API endpoint
    pub search_endpoint: String,

    /// Completion API endpoint
    pub completion_endpoint: String,

    /// Completion model name (expanded to `gpt://<folder>/<model>`)
    pub model: String,

    /// Request timeout for search calls; expiry is a transport error
    pub search_timeout: Duration,

    /// Request timeout for completion calls; expiry is a transport error
    pub completion_timeout: Duration,

    /// Request timeout for page fetches; expiry degrades to a skipped source
    pub fetch_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if any of the required
    /// credentials is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let folder_id = require_env("YANDEX_FOLDER_ID")?;
        let search_api_key = require_env("YANDEX_API_KEY")?;
        let iam_token = require_env("YC_IAM_TOKEN")?;

        let search_endpoint = std::env::var("SEARCH_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_SEARCH_ENDPOINT.to_string());

        let completion_endpoint = std::env::var("COMPLETION_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_COMPLETION_ENDPOINT.to_string());

        let model =
            std::env::var("COMPLETION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            folder_id,
            search_api_key,
            iam_token,
            search_endpoint,
            completion_endpoint,
            model,
            search_timeout: timeout_env("SEARCH_TIMEOUT_SECS", 30)?,
            completion_timeout: timeout_env("COMPLETION_TIMEOUT_SECS", 60)?,
            fetch_timeout: timeout_env("FETCH_TIMEOUT_SECS", 10)?,
        })
    }

    /// Create a config with explicit credentials and default endpoints
    /// (useful for testing).
    pub fn new(folder_id: String, search_api_key: String, iam_token: String) -> Self {
        Self {
            folder_id,
            search_api_key,
            iam_token,
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            completion_endpoint: DEFAULT_COMPLETION_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            search_timeout: Duration::from_secs(30),
            completion_timeout: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn timeout_env(name: &str, default_secs: u64) -> Result<Duration, ConfigError> {
    let secs = match std::env::var(name) {
        Ok(value) => value
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e)))?,
        Err(_) => default_secs,
    };
    Ok(Duration::from_secs(secs))
}
