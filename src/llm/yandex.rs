//! YandexGPT completion client (foundation-models API).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionClient, CompletionError};
use crate::config::Config;

const TEMPERATURE: f64 = 0.3;
const MAX_TOKENS: &str = "2000";

/// Client for the YandexGPT text completion endpoint.
pub struct YandexGptClient {
    http: reqwest::Client,
    endpoint: String,
    folder_id: String,
    iam_token: String,
    model_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest<'a> {
    model_uri: &'a str,
    completion_options: CompletionOptions,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    temperature: f64,
    max_tokens: &'static str,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    result: CompletionResult,
}

#[derive(Debug, Deserialize)]
struct CompletionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    message: AlternativeMessage,
}

#[derive(Debug, Deserialize)]
struct AlternativeMessage {
    text: String,
}

impl YandexGptClient {
    /// Build a client from the agent configuration.
    pub fn new(config: &Config) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(config.completion_timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.completion_endpoint.clone(),
            folder_id: config.folder_id.clone(),
            iam_token: config.iam_token.clone(),
            model_uri: format!("gpt://{}/{}", config.folder_id, config.model),
        })
    }
}

#[async_trait]
impl CompletionClient for YandexGptClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            model_uri: &self.model_uri,
            completion_options: CompletionOptions {
                stream: false,
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            },
            messages: vec![Message {
                role: "user",
                text: prompt,
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.iam_token)
            .header("x-folder-id", &self.folder_id)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let parsed: CompletionResponse = response.json().await?;

        parsed
            .result
            .alternatives
            .into_iter()
            .next()
            .map(|alternative| alternative.message.text)
            .ok_or(CompletionError::Empty)
    }
}
